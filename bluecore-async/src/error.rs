//! Error types for this crate.

use std::fmt::Display;

use bluecore::AttError;
use futures_channel::oneshot;

/// A convenience type alias for a `Result` with an `Error` type.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur in this crate.
#[derive(Debug, Clone)]
pub struct Error {
    data: ErrorData,
}

/// The kind of error that occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    /// A Bluetooth GATT server error.
    Att(AttError),
    /// The peripheral is not connected.
    Disconnected,
    /// A discovery pass is already running on this peripheral.
    DiscoveryInProgress,
    /// The operation requires advertising to be stopped first.
    IsAdvertising,
    /// The operation requires advertising to be running.
    IsNotAdvertising,
    /// The operation was canceled.
    Canceled,
    /// A broadcast channel lagged.
    Lagged,
    /// An unknown or other error.
    Other,
}

#[derive(Debug, Clone)]
enum ErrorData {
    Radio(bluecore::Error),
    Simple(ErrorKind),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.data {
            ErrorData::Radio(error) => error.fmt(f),
            ErrorData::Simple(kind) => kind.fmt(f),
        }
    }
}

impl std::error::Error for Error {}

impl From<bluecore::Error> for Error {
    fn from(error: bluecore::Error) -> Self {
        Error {
            data: ErrorData::Radio(error),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error {
            data: ErrorData::Simple(kind),
        }
    }
}

impl From<bluecore::error::ErrorKind> for Error {
    fn from(kind: bluecore::error::ErrorKind) -> Self {
        Error {
            data: ErrorData::Simple(kind.into()),
        }
    }
}

impl From<oneshot::Canceled> for Error {
    fn from(_value: oneshot::Canceled) -> Self {
        ErrorKind::Canceled.into()
    }
}

impl From<async_broadcast::RecvError> for Error {
    fn from(_value: async_broadcast::RecvError) -> Self {
        ErrorKind::Lagged.into()
    }
}

impl Error {
    /// If this is an `ErrorData::Radio` error, returns a reference to the underlying `bluecore::Error`.
    pub fn get_ref(&self) -> Option<&bluecore::Error> {
        match &self.data {
            ErrorData::Radio(error) => Some(error),
            ErrorData::Simple(_) => None,
        }
    }

    /// If this is an `ErrorData::Radio` error, returns the underlying `bluecore::Error`.
    pub fn into_inner(self) -> Option<bluecore::Error> {
        match self.data {
            ErrorData::Radio(error) => Some(error),
            ErrorData::Simple(_) => None,
        }
    }

    /// Returns the kind of error.
    pub fn kind(&self) -> ErrorKind {
        match &self.data {
            ErrorData::Radio(error) => error.kind().into(),
            ErrorData::Simple(kind) => *kind,
        }
    }
}

impl From<bluecore::error::ErrorKind> for ErrorKind {
    fn from(kind: bluecore::error::ErrorKind) -> Self {
        match kind {
            bluecore::error::ErrorKind::Att(att) => ErrorKind::Att(att),
            bluecore::error::ErrorKind::Other => ErrorKind::Other,
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Att(att) => att.fmt(f),
            ErrorKind::Disconnected => f.write_str("peripheral is not connected"),
            ErrorKind::DiscoveryInProgress => f.write_str("discovery already in progress"),
            ErrorKind::IsAdvertising => f.write_str("advertising is active"),
            ErrorKind::IsNotAdvertising => f.write_str("advertising is not active"),
            ErrorKind::Canceled => f.write_str("canceled"),
            ErrorKind::Lagged => f.write_str("lagged"),
            ErrorKind::Other => f.write_str("other error"),
        }
    }
}
