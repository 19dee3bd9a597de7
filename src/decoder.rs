//! Blocking line reader feeding [`MessageRecord`]s.

use std::io::{BufRead, BufReader, Read};

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::error::DecodeError;
use crate::message::MessageRecord;
use crate::DEFAULT_BUFFER_SIZE;

/// Reads newline-terminated lines from a source into caller-owned records.
///
/// The caller keeps one [`MessageRecord`] and passes it to every
/// [`decode`](Decoder::decode) call; each line is read straight into the
/// record's buffer, so a steady read loop does not allocate.
///
/// ```
/// use slirc_wire::{DecodeError, Decoder, MessageRecord};
///
/// let decoder = Decoder::new(&b"PING :a\r\n: bad\r\nPONG :b\r\n"[..]);
/// let mut record = MessageRecord::new();
/// let mut commands = Vec::new();
///
/// loop {
///     match decoder.decode(&mut record) {
///         Ok(()) => commands.push(record.command().unwrap_or_default().to_vec()),
///         Err(e) if e.is_recoverable() => continue,
///         Err(DecodeError::EndOfStream) => break,
///         Err(e) => return Err(e.into()),
///     }
/// }
/// assert_eq!(commands, [b"PING".to_vec(), b"PONG".to_vec()]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Decoder<R> {
    reader: Mutex<BufReader<R>>,
}

impl<R: Read> Decoder<R> {
    pub fn new(reader: R) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, reader)
    }

    /// Create a decoder whose read buffer holds `capacity` bytes.
    pub fn with_capacity(capacity: usize, reader: R) -> Self {
        Decoder {
            reader: Mutex::new(BufReader::with_capacity(capacity, reader)),
        }
    }

    /// Read the next line into `record` and bound its command.
    ///
    /// Blocks until a full line is available. `record` is reset first,
    /// so after an error it holds either nothing or the rejected line.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::Parse`] if the line is malformed. The decoder can be
    ///   used again for the next line.
    /// - [`DecodeError::EndOfStream`] once the source is exhausted.
    /// - [`DecodeError::Io`] if the source fails.
    pub fn decode(&self, record: &mut MessageRecord) -> Result<(), DecodeError> {
        let read = {
            let mut reader = self.reader.lock();
            record.fill_line(|buf| reader.read_until(b'\n', buf))
        };

        match read {
            Ok(0) => {
                trace!("line source exhausted");
                return Err(DecodeError::EndOfStream);
            }
            Ok(n) => trace!(len = n, "read line"),
            Err(e) => {
                warn!("failed to read from line source: {}", e);
                return Err(DecodeError::Io(e));
            }
        }

        record.peek_command().map_err(|e| {
            debug!("discarding malformed line: {}", e);
            DecodeError::Parse(e)
        })
    }

    /// Get a reference to the underlying source.
    ///
    /// The lock is held for as long as `f` runs.
    pub fn with_reader<T>(&self, f: impl FnOnce(&R) -> T) -> T {
        f(self.reader.lock().get_ref())
    }

    /// Unwrap the source. Bytes already buffered but not decoded are lost.
    pub fn into_inner(self) -> R {
        self.reader.into_inner().into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MessageParseError;
    use std::io::{self, Cursor};
    use std::sync::Arc;
    use std::thread;

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        }
    }

    #[test]
    fn test_decode_lines_in_order() {
        let decoder = Decoder::new(Cursor::new("PING :a\r\nPRIVMSG #x :hi\nQUIT"));
        let mut record = MessageRecord::new();

        decoder.decode(&mut record).unwrap();
        assert_eq!(record.raw(), b"PING :a");
        assert_eq!(record.command(), Some(&b"PING"[..]));

        decoder.decode(&mut record).unwrap();
        assert_eq!(record.raw(), b"PRIVMSG #x :hi");

        decoder.decode(&mut record).unwrap();
        assert_eq!(record.raw(), b"QUIT");

        assert!(decoder.decode(&mut record).unwrap_err().is_end_of_stream());
        assert!(record.raw().is_empty());
    }

    #[test]
    fn test_no_residue_between_lines() {
        let decoder = Decoder::new(Cursor::new(":n!u@h PRIVMSG #chan a b c :long trailing\r\nPING\r\n"));
        let mut record = MessageRecord::new();

        decoder.decode(&mut record).unwrap();
        record.parse_all().unwrap();
        assert_eq!(record.params().unwrap().len(), 4);

        decoder.decode(&mut record).unwrap();
        assert_eq!(record.prefix(), None);
        assert_eq!(record.name(), None);
        assert!(record.params().unwrap().is_empty());
        assert_eq!(record.trailing().unwrap(), None);
    }

    #[test]
    fn test_malformed_line_is_recoverable() {
        let decoder = Decoder::new(Cursor::new(": PRIVMSG x\r\n\r\nPING\r\n"));
        let mut record = MessageRecord::new();

        let err = decoder.decode(&mut record).unwrap_err();
        assert!(matches!(err, DecodeError::Parse(MessageParseError::EmptyPrefix)));
        assert!(err.is_recoverable());
        assert_eq!(record.raw(), b": PRIVMSG x");

        let err = decoder.decode(&mut record).unwrap_err();
        assert!(matches!(err, DecodeError::Parse(MessageParseError::MissingCommand)));

        decoder.decode(&mut record).unwrap();
        assert_eq!(record.command(), Some(&b"PING"[..]));
    }

    #[test]
    fn test_source_failure() {
        let decoder = Decoder::new(FailingReader);
        let mut record = MessageRecord::from_line("OLD");
        match decoder.decode(&mut record) {
            Err(DecodeError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
            other => panic!("Expected Io error, got {other:?}"),
        }
        assert!(record.raw().is_empty());
    }

    #[test]
    fn test_reader_access_and_unwrap() {
        let input = "PING :a\r\nPING :b\r\n";
        let decoder = Decoder::new(Cursor::new(input));
        let mut record = MessageRecord::new();
        assert_eq!(decoder.with_reader(|cursor| cursor.position()), 0);

        decoder.decode(&mut record).unwrap();
        assert_eq!(record.trailing().unwrap(), Some(&b"a"[..]));
        // The whole input fits in one buffered read.
        assert_eq!(decoder.with_reader(|cursor| cursor.position()), input.len() as u64);

        let cursor = decoder.into_inner();
        assert_eq!(cursor.into_inner(), input);
    }

    #[test]
    fn test_small_buffer_reads_long_lines() {
        let line = format!("PRIVMSG #chan :{}\r\n", "x".repeat(300));
        let decoder = Decoder::with_capacity(8, Cursor::new(line.clone()));
        let mut record = MessageRecord::new();
        decoder.decode(&mut record).unwrap();
        assert_eq!(record.raw(), line.trim_end().as_bytes());
    }

    #[test]
    fn test_concurrent_decoders_get_whole_lines() {
        let input: String = (0..200).map(|i| format!("PRIVMSG #c :line {i}\r\n")).collect();
        let decoder = Arc::new(Decoder::with_capacity(64, Cursor::new(input)));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let decoder = Arc::clone(&decoder);
                thread::spawn(move || {
                    let mut record = MessageRecord::new();
                    let mut seen = Vec::new();
                    while decoder.decode(&mut record).is_ok() {
                        let trailing = record.trailing().unwrap().unwrap_or_default();
                        seen.push(String::from_utf8(trailing.to_vec()).unwrap());
                    }
                    seen
                })
            })
            .collect();

        let mut all: Vec<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort();
        let mut expected: Vec<String> = (0..200).map(|i| format!("line {i}")).collect();
        expected.sort();
        assert_eq!(all, expected);
    }
}
