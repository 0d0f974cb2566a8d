/// Core error type for the bot.
///
/// Adapter crates map their specific errors into this type so the core can
/// handle failures consistently: fetch errors are retried with the same
/// cursor, store errors become a chat-visible generic failure, and a missing
/// row is a logged no-op rather than a crash.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// Transient failure talking to the update source. Always retryable.
    #[error("fetch error: {0}")]
    Fetch(String),

    #[error("send error: {0}")]
    Send(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
