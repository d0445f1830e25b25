use std::time::Duration;

/// Settings for a [`Supervised`](crate::resolve::Supervised) resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Config {
    /// How long a caller waits for a single resolution. `None` waits
    /// forever.
    ///
    /// Defaults to 10 seconds.
    pub timeout: Option<Duration>,
    /// Name of the worker thread.
    ///
    /// Defaults to `chessdb-resolver`.
    pub thread_name: String,
}

impl Config {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: Some(Config::DEFAULT_TIMEOUT),
            thread_name: "chessdb-resolver".to_owned(),
        }
    }
}
