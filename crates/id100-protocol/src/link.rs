//! Link abstraction and the command transceiver.
//!
//! The [`Link`] trait is the boundary to whatever carries bytes to the device
//! (USB HID, serial port, ...). It moves one logical command byte plus payload
//! in each direction and owns the physical framing. [`Transceiver`] builds the
//! request/reply exchange on top of it and enforces the protocol-level checks
//! every command shares.

use crate::constants::command_name;
use crate::error::{LinkError, ProtocolError, Result};

/// A connection to the device that carries command/buffer pairs.
///
/// Implementations block until the requested operation is complete. A link
/// is used by one exchange at a time; the protocol has no request IDs and
/// cannot tell interleaved replies apart.
pub trait Link {
    /// Open the connection. `context` names the device (port, path, ...).
    fn connect(&mut self, context: &str) -> std::result::Result<(), LinkError>;

    /// Close the connection.
    fn disconnect(&mut self) -> std::result::Result<(), LinkError>;

    /// Send a command byte and its (possibly empty) payload.
    fn send_command_and_buffer(
        &mut self,
        command: u8,
        buffer: &[u8],
    ) -> std::result::Result<(), LinkError>;

    /// Block until a full reply is received.
    ///
    /// Returns the reply command byte and its payload. The payload holds at
    /// most `max_len` bytes; its actual length is whatever the device sent.
    fn receive_command_and_buffer(
        &mut self,
        max_len: usize,
    ) -> std::result::Result<(u8, Vec<u8>), LinkError>;
}

impl<L: Link + ?Sized> Link for &mut L {
    fn connect(&mut self, context: &str) -> std::result::Result<(), LinkError> {
        (**self).connect(context)
    }

    fn disconnect(&mut self) -> std::result::Result<(), LinkError> {
        (**self).disconnect()
    }

    fn send_command_and_buffer(
        &mut self,
        command: u8,
        buffer: &[u8],
    ) -> std::result::Result<(), LinkError> {
        (**self).send_command_and_buffer(command, buffer)
    }

    fn receive_command_and_buffer(
        &mut self,
        max_len: usize,
    ) -> std::result::Result<(u8, Vec<u8>), LinkError> {
        (**self).receive_command_and_buffer(max_len)
    }
}

impl<L: Link + ?Sized> Link for Box<L> {
    fn connect(&mut self, context: &str) -> std::result::Result<(), LinkError> {
        (**self).connect(context)
    }

    fn disconnect(&mut self) -> std::result::Result<(), LinkError> {
        (**self).disconnect()
    }

    fn send_command_and_buffer(
        &mut self,
        command: u8,
        buffer: &[u8],
    ) -> std::result::Result<(), LinkError> {
        (**self).send_command_and_buffer(command, buffer)
    }

    fn receive_command_and_buffer(
        &mut self,
        max_len: usize,
    ) -> std::result::Result<(u8, Vec<u8>), LinkError> {
        (**self).receive_command_and_buffer(max_len)
    }
}

/// Performs synchronous command/reply exchanges over a [`Link`].
///
/// The transceiver is command-agnostic: it checks that the reply echoes the
/// command byte and has the expected length, and leaves content checks to
/// the caller.
#[derive(Debug)]
pub struct Transceiver<L> {
    link: L,
    log_payloads: bool,
}

impl<L: Link> Transceiver<L> {
    /// Create a transceiver over a link.
    pub fn new(link: L) -> Self {
        Transceiver {
            link,
            log_payloads: false,
        }
    }

    /// Enable or disable hex dumps of payloads at trace level.
    pub fn set_log_payloads(&mut self, enabled: bool) {
        self.log_payloads = enabled;
    }

    /// Get a reference to the underlying link.
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Get a mutable reference to the underlying link.
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Consume the transceiver and return the link.
    pub fn into_link(self) -> L {
        self.link
    }

    /// Send `request` with `command` and receive a reply of exactly
    /// `expected_len` bytes.
    ///
    /// Fails with a protocol mismatch if the reply command differs from
    /// `command` (checked first) or the reply length differs from
    /// `expected_len`. Link errors propagate unchanged.
    pub fn transceive(&mut self, command: u8, request: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        log::debug!(
            "-> '{}' ({}), {} byte(s)",
            char::from(command),
            command_name(command),
            request.len()
        );
        if self.log_payloads && !request.is_empty() {
            log::trace!("-> payload: {}", hex::encode(request));
        }

        self.link.send_command_and_buffer(command, request)?;
        let (reply_command, reply) = self.link.receive_command_and_buffer(expected_len)?;

        if reply_command != command {
            log::warn!(
                "reply command '{}' does not match '{}'",
                char::from(reply_command),
                char::from(command)
            );
            return Err(ProtocolError::UnexpectedCommand {
                expected: command,
                received: reply_command,
            });
        }

        if reply.len() != expected_len {
            log::warn!(
                "reply to '{}' has {} byte(s), expected {}",
                char::from(command),
                reply.len(),
                expected_len
            );
            return Err(ProtocolError::UnexpectedLength {
                command,
                expected: expected_len,
                received: reply.len(),
            });
        }

        log::debug!("<- '{}', {} byte(s)", char::from(reply_command), reply.len());
        if self.log_payloads && !reply.is_empty() {
            log::trace!("<- payload: {}", hex::encode(&reply));
        }

        Ok(reply)
    }

    /// Like [`transceive`](Self::transceive), then run `validate` on the reply.
    ///
    /// `validate` sees a reply that already passed the command and length
    /// checks and turns it into the operation's result.
    pub fn transceive_with<T, F>(
        &mut self,
        command: u8,
        request: &[u8],
        expected_len: usize,
        validate: F,
    ) -> Result<T>
    where
        F: FnOnce(Vec<u8>) -> Result<T>,
    {
        let reply = self.transceive(command, request, expected_len)?;
        validate(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Minimal link that replays canned replies.
    #[derive(Default)]
    struct ReplayLink {
        sent: Vec<(u8, Vec<u8>)>,
        replies: VecDeque<(u8, Vec<u8>)>,
        max_lens: Vec<usize>,
    }

    impl Link for ReplayLink {
        fn connect(&mut self, _context: &str) -> std::result::Result<(), LinkError> {
            Ok(())
        }

        fn disconnect(&mut self) -> std::result::Result<(), LinkError> {
            Ok(())
        }

        fn send_command_and_buffer(
            &mut self,
            command: u8,
            buffer: &[u8],
        ) -> std::result::Result<(), LinkError> {
            self.sent.push((command, buffer.to_vec()));
            Ok(())
        }

        fn receive_command_and_buffer(
            &mut self,
            max_len: usize,
        ) -> std::result::Result<(u8, Vec<u8>), LinkError> {
            self.max_lens.push(max_len);
            self.replies.pop_front().ok_or(LinkError::Timeout)
        }
    }

    fn transceiver_with(replies: Vec<(u8, Vec<u8>)>) -> Transceiver<ReplayLink> {
        Transceiver::new(ReplayLink {
            replies: replies.into(),
            ..Default::default()
        })
    }

    #[test]
    fn test_transceive_returns_reply() {
        let mut trx = transceiver_with(vec![(b'b', vec![7])]);
        let reply = trx.transceive(b'b', &[], 1).unwrap();
        assert_eq!(reply, vec![7]);
        assert_eq!(trx.link().sent, vec![(b'b', vec![])]);
        assert_eq!(trx.link().max_lens, vec![1]);
    }

    #[test]
    fn test_command_checked_before_length() {
        let mut trx = transceiver_with(vec![(b'x', vec![1, 2, 3])]);
        let err = trx.transceive(b'b', &[], 1).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::UnexpectedCommand {
                expected: b'b',
                received: b'x'
            }
        ));
    }

    #[test]
    fn test_wrong_length() {
        let mut trx = transceiver_with(vec![(b'T', vec![0])]);
        let err = trx.transceive(b'T', &[1, 2, 3], 0).unwrap_err();
        assert!(err.is_protocol_mismatch());
        assert_eq!(err.received_value(), Some(1));
    }

    #[test]
    fn test_link_error_propagates() {
        let mut trx = transceiver_with(vec![]);
        let err = trx.transceive(b'v', &[], 6).unwrap_err();
        assert!(matches!(err, ProtocolError::Link(LinkError::Timeout)));
    }

    #[test]
    fn test_validator_runs_after_checks() {
        let mut trx = transceiver_with(vec![(b'E', vec![0, 3]), (b'x', vec![0, 3])]);
        let page = trx
            .transceive_with(b'E', &[0, 3], 2, |reply| Ok(u16::from_be_bytes([reply[0], reply[1]])))
            .unwrap();
        assert_eq!(page, 3);

        let mut called = false;
        let result = trx.transceive_with(b'E', &[0, 3], 2, |_| {
            called = true;
            Ok(())
        });
        assert!(result.is_err());
        assert!(!called);
    }
}
