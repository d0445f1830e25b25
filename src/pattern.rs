//! SQL `LIKE` matching over raw game text.
//!
//! `%` matches any run of characters, `_` matches exactly one character and
//! `\` makes the following character literal. A trailing lone `\` matches
//! itself.

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Atom {
    AnyRun,
    AnyOne,
    Literal(char),
}

fn compile(pattern: &str) -> Vec<Atom> {
    let mut atoms = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        atoms.push(match ch {
            '%' => {
                if atoms.last() == Some(&Atom::AnyRun) {
                    continue;
                }
                Atom::AnyRun
            }
            '_' => Atom::AnyOne,
            '\\' => Atom::Literal(chars.next().unwrap_or('\\')),
            ch => Atom::Literal(ch),
        });
    }
    atoms
}

/// Whether `text` matches the `LIKE` pattern.
///
/// # Examples
///
/// ```
/// use chessdb::pattern::like;
///
/// assert!(like("1. e4 e5 2. Nf3", "1. e4%"));
/// assert!(like("1. e4 e5 2. Nf3", "%e_ 2.%"));
/// assert!(!like("1. d4 d5", "1. e4%"));
/// ```
pub fn like(text: &str, pattern: &str) -> bool {
    let atoms = compile(pattern);
    let text: Vec<char> = text.chars().collect();

    let mut t = 0;
    let mut p = 0;
    // Position after the most recent `%` and the text index it resumes at.
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match atoms.get(p) {
            Some(Atom::AnyRun) => {
                p += 1;
                backtrack = Some((p, t));
            }
            Some(Atom::AnyOne) => {
                p += 1;
                t += 1;
            }
            Some(&Atom::Literal(ch)) if ch == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((resume_p, resume_t)) => {
                    p = resume_p;
                    t = resume_t + 1;
                    backtrack = Some((resume_p, resume_t + 1));
                }
                None => return false,
            },
        }
    }

    atoms[p..].iter().all(|&atom| atom == Atom::AnyRun)
}
