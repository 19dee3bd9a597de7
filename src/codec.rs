//! Tokio codec for IRC lines.
//!
//! [`MessageCodec`] frames a byte stream on `\n` and yields one
//! [`MessageRecord`] per line. The record's command is bounded before it is
//! yielded; a malformed line still comes through, carrying its parse error,
//! so one bad line never ends the stream.

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Decoder, Encoder, Framed};
use tracing::{debug, trace};

use crate::encode::WireEncode;
use crate::error::{ProtocolError, Result};
use crate::message::MessageRecord;

/// Line codec producing [`MessageRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct MessageCodec {
    /// Bytes of the buffer already searched for a newline.
    next_index: usize,
}

impl MessageCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap `io` in a [`Framed`] using this codec.
    pub fn framed<T: AsyncRead + AsyncWrite>(self, io: T) -> Framed<T, Self> {
        Framed::new(io, self)
    }

    fn record(line: &[u8]) -> MessageRecord {
        let record = MessageRecord::from_line(line);
        match record.peek_command() {
            Ok(()) => trace!(len = line.len(), "decoded frame"),
            Err(e) => debug!("malformed frame: {}", e),
        }
        record
    }
}

impl Decoder for MessageCodec {
    type Item = MessageRecord;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<MessageRecord>> {
        let Some(offset) = src[self.next_index..].iter().position(|&b| b == b'\n') else {
            self.next_index = src.len();
            return Ok(None);
        };

        let end = self.next_index + offset + 1;
        self.next_index = 0;
        let line = src.split_to(end);
        Ok(Some(Self::record(&line)))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<MessageRecord>> {
        if let Some(record) = self.decode(src)? {
            return Ok(Some(record));
        }
        if src.is_empty() {
            return Ok(None);
        }

        self.next_index = 0;
        let line = src.split();
        Ok(Some(Self::record(&line)))
    }
}

impl<'a, M: WireEncode + ?Sized> Encoder<&'a M> for MessageCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: &'a M, dst: &mut BytesMut) -> Result<()> {
        let mut writer = dst.writer();
        WireEncode::encode(msg, &mut writer)?;
        Ok(())
    }
}

impl Encoder<MessageRecord> for MessageCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: MessageRecord, dst: &mut BytesMut) -> Result<()> {
        Encoder::<&MessageRecord>::encode(self, &msg, dst)
    }
}
