use thiserror::Error;

/// Why a remote fetch produced no data.
///
/// `Clone` so every waiter on a shared in-flight fetch receives the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Unreachable host, timeout, or any other transport failure.
    #[error("request failed: {0}")]
    Transport(String),
    /// The server answered with a non-success status.
    #[error("network response was not ok: HTTP {0}")]
    Status(u16),
    /// The body was not the JSON the caller expected.
    #[error("malformed response body: {0}")]
    Decode(String),
}

/// The URL is dropped from the message: request URLs can carry API keys.
impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => FetchError::Status(status.as_u16()),
            None => FetchError::Transport(e.without_url().to_string()),
        }
    }
}
