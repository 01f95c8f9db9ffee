//! Transport-level error classification for calls against the Runtime API.

use std::{error::Error as StdError, fmt, io};

/// A boxed, type-erased error. Used for errors that originate outside
/// this crate (e.g. from `hyper`) and don't need their own variant.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// The small, closed set of ways a Transport Client call can fail.
///
/// No retries happen at this layer; callers (the Runtime Client, and
/// above it the Lifecycle) decide what to do with each kind.
#[derive(Debug)]
pub enum TransportError {
    /// The call did not complete within the configured request timeout.
    Timeout,
    /// The peer closed the connection mid-exchange.
    ConnectionReset,
    /// Any other I/O or protocol failure.
    Io(BoxError),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Timeout => write!(f, "request timed out"),
            TransportError::ConnectionReset => write!(f, "connection reset by peer"),
            TransportError::Io(err) => write!(f, "{err}"),
        }
    }
}

impl StdError for TransportError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            TransportError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl TransportError {
    /// Classify a `hyper_util` client error, walking its `source()` chain
    /// to detect a peer reset that hyper itself only surfaces as an
    /// opaque I/O error.
    pub fn from_hyper(err: BoxError) -> Self {
        let mut source: Option<&(dyn StdError + 'static)> = Some(err.as_ref());
        while let Some(err) = source {
            if let Some(io_err) = err.downcast_ref::<io::Error>() {
                if io_err.kind() == io::ErrorKind::ConnectionReset {
                    return TransportError::ConnectionReset;
                }
            }
            source = err.source();
        }
        TransportError::Io(err)
    }
}
