//! Protocol error types.

use thiserror::Error;

use crate::constants::command_name;

/// Errors that can occur when exchanging commands with the device.
///
/// Every variant is fatal to the operation that produced it. Nothing is
/// retried, and since the only side effect of an exchange is the send/receive
/// pair itself there is no partial state to undo.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The reply carried a different command byte than the request.
    #[error("invalid answer command received: '{}' (expected '{}')", char::from(*.received), char::from(*.expected))]
    UnexpectedCommand {
        /// Command that was sent.
        expected: u8,
        /// Command found in the reply.
        received: u8,
    },

    /// The reply payload had the wrong length.
    #[error("invalid length received: {received} (expected {expected} for {})", command_name(*.command))]
    UnexpectedLength {
        /// Command the reply belongs to.
        command: u8,
        /// Expected payload length.
        expected: usize,
        /// Actual payload length received.
        received: usize,
    },

    /// The device echoed a different flash page number than was sent.
    #[error("bad page number received: {received} (expected {expected} for {})", command_name(*.command))]
    PageMismatch {
        /// Command the reply belongs to.
        command: u8,
        /// Page number that was sent.
        expected: u16,
        /// Page number echoed by the device.
        received: u16,
    },

    /// The link layer failed.
    #[error("link error: {0}")]
    Link(#[from] LinkError),
}

/// Coarse classification of a [`ProtocolError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Reply command, length or echoed field did not match the request.
    ProtocolMismatch,
    /// Failure raised by the link layer.
    Link,
}

impl ProtocolError {
    /// Get the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProtocolError::UnexpectedCommand { .. }
            | ProtocolError::UnexpectedLength { .. }
            | ProtocolError::PageMismatch { .. } => ErrorKind::ProtocolMismatch,
            ProtocolError::Link(_) => ErrorKind::Link,
        }
    }

    /// Check if this is a protocol mismatch.
    pub fn is_protocol_mismatch(&self) -> bool {
        self.kind() == ErrorKind::ProtocolMismatch
    }

    /// Get the unexpected value carried by a protocol mismatch.
    ///
    /// This is the received command byte, payload length, or echoed page
    /// number depending on the variant. Link errors carry no value.
    pub fn received_value(&self) -> Option<u32> {
        match self {
            ProtocolError::UnexpectedCommand { received, .. } => Some(u32::from(*received)),
            ProtocolError::UnexpectedLength { received, .. } => Some(*received as u32),
            ProtocolError::PageMismatch { received, .. } => Some(u32::from(*received)),
            ProtocolError::Link(_) => None,
        }
    }
}

/// Errors raised by a [`Link`](crate::Link) implementation.
#[derive(Error, Debug)]
pub enum LinkError {
    /// No connection to the device has been established.
    #[error("not connected")]
    NotConnected,

    /// Timed out waiting for the device.
    #[error("timeout waiting for device")]
    Timeout,

    /// The device went away during an exchange.
    #[error("device disconnected")]
    Disconnected,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other link failure.
    #[error("{0}")]
    Other(String),
}

impl LinkError {
    /// Create a link error from a message.
    pub fn other(message: impl Into<String>) -> Self {
        LinkError::Other(message.into())
    }
}

/// Errors that can occur while loading a [`DriverConfig`](crate::DriverConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid YAML or has unknown fields.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A field has an invalid value.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type alias for device operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Report a fatal error and terminate the process.
///
/// This is the single top-level handler for errors returned by the driver.
pub fn exit_with_error(err: &dyn std::error::Error) -> ! {
    log::error!("{}", err);
    eprintln!("Error: {}", err);
    std::process::exit(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProtocolError::UnexpectedCommand {
            expected: b'v',
            received: b'x',
        };
        assert_eq!(err.to_string(), "invalid answer command received: 'x' (expected 'v')");

        let err = ProtocolError::UnexpectedLength {
            command: b'b',
            expected: 1,
            received: 3,
        };
        assert!(err.to_string().contains("invalid length received: 3"));
        assert!(err.to_string().contains("get intensity"));

        let err = ProtocolError::PageMismatch {
            command: b'E',
            expected: 5,
            received: 7,
        };
        assert!(err.to_string().starts_with("bad page number received: 7"));
    }

    #[test]
    fn test_error_kind_and_value() {
        let err = ProtocolError::PageMismatch {
            command: b'f',
            expected: 1,
            received: 2,
        };
        assert_eq!(err.kind(), ErrorKind::ProtocolMismatch);
        assert_eq!(err.received_value(), Some(2));

        let err = ProtocolError::from(LinkError::Timeout);
        assert_eq!(err.kind(), ErrorKind::Link);
        assert!(!err.is_protocol_mismatch());
        assert_eq!(err.received_value(), None);
        assert_eq!(err.to_string(), "link error: timeout waiting for device");
    }
}
