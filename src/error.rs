use thiserror::Error;

// None of these escape a command handler; each becomes status text or a chat reply
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VendorError {
    #[error("Geolocation is not supported on this platform")]
    GeolocationUnsupported,

    #[error("Location access denied: {0}")]
    GeolocationDenied(String),

    #[error("Location request timed out after {0} ms")]
    GeolocationTimedOut(u64),

    #[error("Reply fetch failed: {0}")]
    ReplyFetchFailed(String),

    /// Empty or whitespace-only chat input
    #[error("Message is empty")]
    MalformedInput,

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type VendorResult<T> = std::result::Result<T, VendorError>;
