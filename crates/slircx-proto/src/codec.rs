//! Tokio codec turning a byte stream into [`Message`] values.
//!
//! Frames are newline-terminated lines. Outbound messages always end in
//! CRLF; inbound bare LF is tolerated. Outbound text is sanitized by
//! truncating at the first embedded line ending so a crafted parameter
//! cannot smuggle extra commands onto the wire.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::ProtocolError;
use crate::message::Message;

/// Default maximum line length in bytes, terminator included (RFC 1459).
pub const MAX_LINE_LEN: usize = 512;

/// Codec for newline-delimited IRC messages.
pub struct IrcCodec {
    /// Index of the next byte to scan for a newline.
    next_index: usize,
    /// Hard cap on line length, terminator included.
    max_line: usize,
}

impl IrcCodec {
    /// Create a codec with the default 512-byte line limit.
    pub fn new() -> Self {
        Self::with_max_line(MAX_LINE_LEN)
    }

    /// Create a codec with a custom line limit.
    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            next_index: 0,
            max_line,
        }
    }

    /// Cut `line` at the first embedded line ending, if any.
    fn sanitize(line: &str) -> &str {
        match line.find(&['\r', '\n'][..]) {
            Some(pos) => &line[..pos],
            None => line,
        }
    }
}

impl Default for IrcCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for IrcCodec {
    type Item = Message;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>, ProtocolError> {
        loop {
            let newline = src[self.next_index..].iter().position(|b| *b == b'\n');
            let Some(offset) = newline else {
                // No complete line buffered; remember the scan position.
                self.next_index = src.len();
                if src.len() > self.max_line {
                    return Err(ProtocolError::LineTooLong {
                        actual: src.len(),
                        limit: self.max_line,
                    });
                }
                return Ok(None);
            };

            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_line {
                return Err(ProtocolError::LineTooLong {
                    actual: line.len(),
                    limit: self.max_line,
                });
            }

            let text = std::str::from_utf8(&line).map_err(|e| ProtocolError::InvalidUtf8 {
                valid_up_to: e.valid_up_to(),
            })?;
            let text = text.trim_end_matches(&['\r', '\n'][..]);
            if text.is_empty() {
                // Blank keepalive line between messages.
                continue;
            }
            return text.parse::<Message>().map(Some);
        }
    }
}

impl Encoder<&Message> for IrcCodec {
    type Error = ProtocolError;

    fn encode(&mut self, message: &Message, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        let line = message.to_string();
        let line = Self::sanitize(&line);
        if line.len() + 2 > self.max_line {
            return Err(ProtocolError::LineTooLong {
                actual: line.len() + 2,
                limit: self.max_line,
            });
        }
        dst.reserve(line.len() + 2);
        dst.put_slice(line.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

impl Encoder<Message> for IrcCodec {
    type Error = ProtocolError;

    fn encode(&mut self, message: Message, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        self.encode(&message, dst)
    }
}
