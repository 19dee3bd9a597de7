//! Blocking message writer.

use std::io::{self, Write};

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::encode::WireEncode;
use crate::error::EncodeError;
use crate::DEFAULT_BUFFER_SIZE;

struct EncoderState<W> {
    writer: W,
    buf: Vec<u8>,
}

/// Serializes messages and writes each one to a sink in a single call.
///
/// An encoder may be shared between threads; concurrent [`encode`] calls
/// are serialized so lines never interleave.
///
/// [`encode`]: Encoder::encode
pub struct Encoder<W> {
    state: Mutex<EncoderState<W>>,
}

impl<W: Write> Encoder<W> {
    pub fn new(writer: W) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, writer)
    }

    /// Create an encoder whose line buffer starts with `capacity` bytes.
    pub fn with_capacity(capacity: usize, writer: W) -> Self {
        Encoder {
            state: Mutex::new(EncoderState {
                writer,
                buf: Vec::with_capacity(capacity),
            }),
        }
    }

    /// Encode `msg` and write the whole line to the sink.
    ///
    /// Returns the number of bytes written. A message with no command is
    /// rejected before anything reaches the sink.
    pub fn encode<M: WireEncode + ?Sized>(&self, msg: &M) -> Result<usize, EncodeError> {
        let mut state = self.state.lock();
        let EncoderState { writer, buf } = &mut *state;

        buf.clear();
        if let Err(e) = msg.encode(buf) {
            debug!("rejected outgoing message: {}", e);
            return Err(e);
        }

        if let Err(e) = writer.write_all(buf) {
            warn!("failed to write message: {}", e);
            return Err(e.into());
        }

        trace!(len = buf.len(), "encoded message");
        Ok(buf.len())
    }

    pub fn flush(&self) -> io::Result<()> {
        self.state.lock().writer.flush()
    }

    /// Get a reference to the underlying sink.
    ///
    /// The lock is held for as long as `f` runs.
    pub fn with_writer<T>(&self, f: impl FnOnce(&W) -> T) -> T {
        f(&self.state.lock().writer)
    }

    pub fn into_inner(self) -> W {
        self.state.into_inner().writer
    }
}
