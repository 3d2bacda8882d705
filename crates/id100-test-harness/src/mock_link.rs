//! Mock link for deterministic testing of device operations.
//!
//! [`MockLink`] implements the [`Link`] trait with pre-loaded replies. This
//! lets you test request encoding, reply validation and record decoding
//! without real hardware.
//!
//! # Example
//!
//! ```
//! use id100_protocol::Device;
//! use id100_test_harness::MockLink;
//!
//! let mut link = MockLink::new();
//! link.reply(b'b', &[42]);
//!
//! let mut device = Device::new(link);
//! assert_eq!(device.get_intensity().unwrap().0, 42);
//! assert_eq!(device.link().sent()[0].command, b'b');
//! ```

use std::collections::VecDeque;

use id100_protocol::{Link, LinkError};

/// One `(command, buffer)` pair handed to [`MockLink::send_command_and_buffer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentCommand {
    /// Command byte.
    pub command: u8,
    /// Payload bytes.
    pub buffer: Vec<u8>,
}

/// A mock [`Link`] for testing without hardware.
///
/// Replies are consumed in order, one per receive. Every send is recorded.
/// Replies are returned exactly as queued, even when longer than the
/// receive limit, so length validation can be exercised.
#[derive(Debug)]
pub struct MockLink {
    /// Ordered queue of replies.
    replies: VecDeque<(u8, Vec<u8>)>,
    /// Log of all sends.
    sent: Vec<SentCommand>,
    /// `max_len` of every receive call.
    receive_limits: Vec<usize>,
    /// Whether the link is "connected".
    connected: bool,
    /// Context passed to the last successful connect.
    context: Option<String>,
    /// Error to return from the next connect.
    connect_error: Option<LinkError>,
}

impl MockLink {
    /// Create a new mock link in the connected state.
    pub fn new() -> Self {
        MockLink {
            replies: VecDeque::new(),
            sent: Vec::new(),
            receive_limits: Vec::new(),
            connected: true,
            context: None,
            connect_error: None,
        }
    }

    /// Create a new mock link in the disconnected state.
    pub fn disconnected() -> Self {
        MockLink {
            connected: false,
            ..Self::new()
        }
    }

    /// Queue a reply for the next receive.
    pub fn reply(&mut self, command: u8, buffer: &[u8]) -> &mut Self {
        self.replies.push_back((command, buffer.to_vec()));
        self
    }

    /// Queue an empty reply echoing `command`.
    pub fn acknowledge(&mut self, command: u8) -> &mut Self {
        self.reply(command, &[])
    }

    /// Make the next connect fail with `error`.
    pub fn fail_next_connect(&mut self, error: LinkError) {
        self.connect_error = Some(error);
    }

    /// Set the connected state.
    ///
    /// When `false`, sends and receives fail with [`LinkError::NotConnected`].
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Check whether the link is connected.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Context passed to the last successful connect.
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// All sends so far, oldest first.
    pub fn sent(&self) -> &[SentCommand] {
        &self.sent
    }

    /// The most recent send.
    pub fn last_sent(&self) -> Option<&SentCommand> {
        self.sent.last()
    }

    /// `max_len` passed to every receive so far.
    pub fn receive_limits(&self) -> &[usize] {
        &self.receive_limits
    }

    /// Number of queued replies not yet consumed.
    pub fn remaining_replies(&self) -> usize {
        self.replies.len()
    }
}

impl Default for MockLink {
    fn default() -> Self {
        Self::new()
    }
}

impl Link for MockLink {
    fn connect(&mut self, context: &str) -> Result<(), LinkError> {
        if let Some(error) = self.connect_error.take() {
            return Err(error);
        }
        self.connected = true;
        self.context = Some(context.to_string());
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), LinkError> {
        if !self.connected {
            return Err(LinkError::NotConnected);
        }
        self.connected = false;
        Ok(())
    }

    fn send_command_and_buffer(&mut self, command: u8, buffer: &[u8]) -> Result<(), LinkError> {
        if !self.connected {
            return Err(LinkError::NotConnected);
        }
        self.sent.push(SentCommand {
            command,
            buffer: buffer.to_vec(),
        });
        Ok(())
    }

    fn receive_command_and_buffer(&mut self, max_len: usize) -> Result<(u8, Vec<u8>), LinkError> {
        if !self.connected {
            return Err(LinkError::NotConnected);
        }
        self.receive_limits.push(max_len);
        self.replies.pop_front().ok_or(LinkError::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replies_in_order() {
        let mut link = MockLink::new();
        link.reply(b'a', &[1]).reply(b'b', &[2, 3]);

        link.send_command_and_buffer(b'a', &[9]).unwrap();
        assert_eq!(link.receive_command_and_buffer(1).unwrap(), (b'a', vec![1]));
        assert_eq!(link.receive_command_and_buffer(4).unwrap(), (b'b', vec![2, 3]));
        assert!(matches!(
            link.receive_command_and_buffer(1),
            Err(LinkError::Timeout)
        ));

        assert_eq!(
            link.sent(),
            &[SentCommand {
                command: b'a',
                buffer: vec![9]
            }]
        );
        assert_eq!(link.receive_limits(), &[1, 4, 1]);
    }

    #[test]
    fn test_connection_state() {
        let mut link = MockLink::disconnected();
        assert!(matches!(
            link.send_command_and_buffer(b'v', &[]),
            Err(LinkError::NotConnected)
        ));

        link.connect("/dev/hidraw0").unwrap();
        assert!(link.is_connected());
        assert_eq!(link.context(), Some("/dev/hidraw0"));

        link.disconnect().unwrap();
        assert!(!link.is_connected());
        assert!(matches!(link.disconnect(), Err(LinkError::NotConnected)));
    }

    #[test]
    fn test_fail_next_connect() {
        let mut link = MockLink::disconnected();
        link.fail_next_connect(LinkError::other("no such device"));
        assert!(link.connect("x").is_err());
        assert!(!link.is_connected());
        assert!(link.connect("x").is_ok());
    }
}
