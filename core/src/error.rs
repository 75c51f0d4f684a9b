//! Errors surfaced to the caller of a session operation.

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Cannot invoke poll in a active session")]
    SessionAlreadyActive,

    #[error("Command format error")]
    CommandFormat,

    #[error("Response must contain at least the two status bytes")]
    ResponseFormat,

    #[error("No tag polled")]
    NoTagPolled,

    #[error("Transceive not supported on this type of card")]
    TransceiveNotSupported,

    #[error("Communication error: {0}")]
    Communication(String),

    #[error("More than 1 tag detected!")]
    MultipleTagsDetected,

    #[error("Failed to connect to tag: {0}")]
    ConnectFailed(String),

    #[error(
        "Invalidate session with error: {}",
        .0.as_deref().unwrap_or("unknown reason")
    )]
    SessionInvalidated(Option<String>),

    #[error("Session not active")]
    SessionNotActive,

    #[error("Malformed hex string: {0}")]
    MalformedHex(#[from] hex::FromHexError),
}

impl Error {
    /// Returns the status code reported alongside the error at the caller boundary.
    /// 4xx codes are rejected arguments or states, 500x codes come from the reader.
    pub fn code(&self) -> &'static str {
        use Error::*;

        match self {
            CommandFormat | MalformedHex(_) => "400",
            TransceiveNotSupported => "405",
            SessionAlreadyActive | NoTagPolled | SessionNotActive => "406",
            MultipleTagsDetected => "5001",
            ConnectFailed(_) => "5002",
            SessionInvalidated(_) => "5003",
            Communication(_) | ResponseFormat => "5004",
        }
    }

    /// Returns the human-readable detail reported by the reader, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Error::Communication(detail) | Error::ConnectFailed(detail) => Some(detail.as_str()),
            Error::SessionInvalidated(detail) => detail.as_deref(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code() {
        assert_eq!("406", Error::NoTagPolled.code());
        assert_eq!("400", Error::MalformedHex(hex::FromHexError::OddLength).code());
        assert_eq!("5001", Error::MultipleTagsDetected.code());
        assert_eq!("5003", Error::SessionInvalidated(None).code());
    }

    #[test]
    fn test_detail() {
        assert_eq!(
            Some("tag lost"),
            Error::Communication("tag lost".to_owned()).detail()
        );
        assert_eq!(None, Error::SessionInvalidated(None).detail());
        assert_eq!(None, Error::CommandFormat.detail());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            "Cannot invoke poll in a active session",
            Error::SessionAlreadyActive.to_string()
        );
        assert_eq!(
            "More than 1 tag detected!",
            Error::MultipleTagsDetected.to_string()
        );
    }

    #[test]
    fn test_display_invalidated() {
        assert_eq!(
            "Invalidate session with error: Session timeout",
            Error::SessionInvalidated(Some("Session timeout".to_owned())).to_string()
        );
        assert_eq!(
            "Invalidate session with error: unknown reason",
            Error::SessionInvalidated(None).to_string()
        );
    }
}
