//! Error types for this crate.

use std::fmt::Display;

/// A convenience type alias for a `Result` with an `Error` type.
pub type Result<T> = std::result::Result<T, Error>;

/// An error reported across the radio boundary.
#[derive(Debug, Clone)]
pub struct Error {
    data: ErrorData,
}

/// The kind of error that occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    /// A Bluetooth GATT server error.
    Att(AttError),
    /// An unknown or other error.
    Other,
}

#[derive(Debug, Clone)]
enum ErrorData {
    /// An opaque failure reported by the radio backend, passed through unchanged.
    Radio { kind: ErrorKind, message: String },
    Simple(ErrorKind),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.data {
            ErrorData::Radio { message, .. } => f.write_str(message),
            ErrorData::Simple(kind) => kind.fmt(f),
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error {
            data: ErrorData::Simple(kind),
        }
    }
}

impl From<AttError> for Error {
    fn from(att: AttError) -> Self {
        ErrorKind::Att(att).into()
    }
}

impl Error {
    /// Creates an error carrying a backend-reported message.
    pub fn from_radio(kind: ErrorKind, message: impl Into<String>) -> Self {
        Error {
            data: ErrorData::Radio {
                kind,
                message: message.into(),
            },
        }
    }

    /// Creates an opaque backend-reported error of kind [`ErrorKind::Other`].
    pub fn other(message: impl Into<String>) -> Self {
        Self::from_radio(ErrorKind::Other, message)
    }

    /// If this error carries a backend-reported message, returns it.
    pub fn message(&self) -> Option<&str> {
        match &self.data {
            ErrorData::Radio { message, .. } => Some(message),
            ErrorData::Simple(_) => None,
        }
    }

    /// Returns the kind of error.
    pub fn kind(&self) -> ErrorKind {
        match &self.data {
            ErrorData::Radio { kind, .. } => *kind,
            ErrorData::Simple(kind) => *kind,
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Att(att_error) => att_error.fmt(f),
            ErrorKind::Other => f.write_str("other error"),
        }
    }
}

/// A Bluetooth ATT result code, as defined by the Bluetooth Core Specification
/// Vol 3, Part F §3.4.1.1.
///
/// These are the codes a GATT server answers requests with. This crate routes
/// them unchanged; it does not define codes of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum AttError {
    Success = 0x00,
    InvalidHandle = 0x01,
    ReadNotPermitted = 0x02,
    WriteNotPermitted = 0x03,
    InvalidPdu = 0x04,
    InsufficientAuthentication = 0x05,
    RequestNotSupported = 0x06,
    InvalidOffset = 0x07,
    InsufficientAuthorization = 0x08,
    PrepareQueueFull = 0x09,
    AttributeNotFound = 0x0a,
    AttributeNotLong = 0x0b,
    InsufficientEncryptionKeySize = 0x0c,
    InvalidAttributeValueLength = 0x0d,
    UnlikelyError = 0x0e,
    InsufficientEncryption = 0x0f,
    UnsupportedGroupType = 0x10,
    InsufficientResources = 0x11,
}

impl AttError {
    /// Whether this code reports success.
    pub fn is_success(self) -> bool {
        self == AttError::Success
    }
}

impl Display for AttError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttError::Success => f.write_str("success"),
            AttError::InvalidHandle => f.write_str("invalid handle"),
            AttError::ReadNotPermitted => f.write_str("read not permitted"),
            AttError::WriteNotPermitted => f.write_str("write not permitted"),
            AttError::InvalidPdu => f.write_str("invalid PDU"),
            AttError::InsufficientAuthentication => f.write_str("insufficient authentication"),
            AttError::RequestNotSupported => f.write_str("request not supported"),
            AttError::InvalidOffset => f.write_str("invalid offset"),
            AttError::InsufficientAuthorization => f.write_str("insufficient authorization"),
            AttError::PrepareQueueFull => f.write_str("prepare queue full"),
            AttError::AttributeNotFound => f.write_str("attribute not found"),
            AttError::AttributeNotLong => f.write_str("attribute not long"),
            AttError::InsufficientEncryptionKeySize => {
                f.write_str("insufficient encryption key size")
            }
            AttError::InvalidAttributeValueLength => {
                f.write_str("invalid attribute value length")
            }
            AttError::UnlikelyError => f.write_str("unlikely error"),
            AttError::InsufficientEncryption => f.write_str("insufficient encryption"),
            AttError::UnsupportedGroupType => f.write_str("unsupported group type"),
            AttError::InsufficientResources => f.write_str("insufficient resources"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn att_errors_carry_their_kind() {
        let error = Error::from(AttError::InvalidOffset);
        assert_eq!(error.kind(), ErrorKind::Att(AttError::InvalidOffset));
        assert_eq!(error.to_string(), "invalid offset");
        assert_eq!(error.message(), None);
    }

    #[test]
    fn radio_errors_keep_the_backend_message() {
        let error = Error::other("hci transport closed");
        assert_eq!(error.kind(), ErrorKind::Other);
        assert_eq!(error.message(), Some("hci transport closed"));
        assert_eq!(error.to_string(), "hci transport closed");
    }

    #[test]
    fn success_is_the_only_successful_code() {
        assert!(AttError::Success.is_success());
        assert!(!AttError::UnlikelyError.is_success());
    }
}
