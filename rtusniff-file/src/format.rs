//! Format Specification
//!
//! A session file is a series of consecutive self-contained msgpack
//! messages, `N` being the total number of messages, one or more.
//!
//! | message | type  | description           |
//! |---------|-------|-----------------------|
//! | 1       | int   | version number        |
//! | 2..N    | batch | one captured batch    |
//!
//! Batches are appended in the order they were received. Each one is
//! written in full or not at all, so a reader never sees part of a batch;
//! a file cut short by a crash simply ends at the last whole batch.

use crate::error::{Error, ErrorKind, Result};
use crate::Version;

use rtusniff::token::{self, Timestamp, Token, SEPARATOR};

use std::io::{Read, Write};
use tracing::debug;

/// Bytes read from the bus in one go, stamped with the time they arrived.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct Batch {
    pub timestamp: Timestamp,
    pub data: Vec<u8>,
}

impl Batch {
    /// Fails on an empty batch or a timestamp that is not a number.
    pub fn new(timestamp: Timestamp, data: Vec<u8>) -> Result<Self> {
        if timestamp.is_nan() {
            return Err(Error::new(ErrorKind::InvalidTimestamp));
        }
        if data.is_empty() {
            return Err(Error::new(ErrorKind::EmptyBatch));
        }
        Ok(Batch { timestamp, data })
    }

    /// Parses the formatted text of a batch, e.g. `"11 03 00 6B"`.
    pub fn parse(formatted: &str, timestamp: Timestamp) -> Result<Self> {
        let tokens = token::tokenize(formatted, timestamp)?;
        Batch::new(timestamp, token::bytes(&tokens))
    }

    /// Upper-case hex pairs separated by a single space.
    pub fn formatted(&self) -> String {
        self.data
            .iter()
            .map(|byte| format!("{:02X}", byte))
            .collect::<Vec<_>>()
            .join(&SEPARATOR.to_string())
    }

    /// One token per byte, each carrying the batch timestamp.
    pub fn tokens(&self) -> Vec<Token> {
        token::from_bytes(&self.data, self.timestamp)
    }
}

/// Reads the expected format from a source.
pub struct Reader<R: Read> {
    inner: R,
}

impl<R: Read> Reader<R> {
    /// Creates a new reader.
    ///
    /// This will fail if the version in the format doesn't match the current
    /// version of this module.
    pub fn new(inner: R) -> Result<Self> {
        let mut reader = Reader { inner };
        let expected_version = crate::version();
        let actual_version: Version = rmp_serde::from_read(&mut reader.inner)?;
        if expected_version != actual_version {
            return Err(Error::new(ErrorKind::VersionMismatch((
                expected_version,
                actual_version,
            ))));
        }
        Ok(reader)
    }
}

impl<R: Read> std::iter::Iterator for Reader<R> {
    type Item = Batch;

    fn next(&mut self) -> Option<Self::Item> {
        match rmp_serde::from_read(&mut self.inner) {
            Ok(batch) => Some(batch),
            Err(err) => {
                debug!(%err, "end of session");
                None
            }
        }
    }
}

/// Writes captured batches to a sink.
pub struct Writer<W: Write> {
    inner: W,
}

impl<W: Write> Writer<W> {
    /// Creates a writer.
    pub fn new(inner: W) -> Result<Self> {
        let mut writer = Writer { inner };
        writer.version()?;
        Ok(writer)
    }

    /// Writes the format version number.
    fn version(&mut self) -> Result<()> {
        let bytes = rmp_serde::to_vec(&crate::version())?;
        self.inner.write_all(&bytes)?;
        Ok(())
    }

    /// Appends one batch.
    pub fn insert(&mut self, batch: &Batch) -> Result<()> {
        let bytes = rmp_serde::to_vec(batch)?;
        self.inner.write_all(&bytes)?;
        Ok(())
    }

    /// Appends the bytes received at `timestamp`.
    pub fn record(&mut self, timestamp: Timestamp, data: &[u8]) -> Result<()> {
        self.insert(&Batch::new(timestamp, data.to_vec())?)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_read_write() {
        let mut buffer = Vec::new();
        let mut writer = Writer::new(&mut buffer).expect("failed to create writer");
        writer.record(1.5, &[0x11, 0x03, 0x00]).unwrap();
        writer.record(1.75, &[0x6b, 0x00, 0x03, 0x76, 0x87]).unwrap();

        let buffer = std::io::Cursor::new(buffer);
        let reader = Reader::new(buffer).expect("failed to create reader");
        let result: Vec<Batch> = reader.collect();
        let expected = vec![
            Batch {
                timestamp: 1.5,
                data: vec![0x11, 0x03, 0x00],
            },
            Batch {
                timestamp: 1.75,
                data: vec![0x6b, 0x00, 0x03, 0x76, 0x87],
            },
        ];
        assert_eq!(expected, result);
    }

    #[should_panic(expected = "VersionMismatch")]
    #[test]
    fn test_version_mismatch() {
        // Test a version number that is off by one
        let wrong_version = crate::version() + 1;
        let bytes = rmp_serde::to_vec(&wrong_version).unwrap();
        let buffer = std::io::Cursor::new(bytes);
        let _ = Reader::new(buffer).unwrap();
    }

    #[test]
    fn test_corrupt_bytes() {
        let mut buffer = Vec::new();
        let mut writer = Writer::new(&mut buffer).expect("failed to create writer");
        writer.record(1.0, &[0x01, 0x02]).unwrap();
        writer.record(2.0, &[0x03, 0x04]).unwrap();

        // Process everything but the last byte.
        let buffer = std::io::Cursor::new(&buffer[..buffer.len() - 1]);
        let reader = Reader::new(buffer).expect("failed to create reader");

        // Errors are ignored and the iterator will end prematurely
        assert_eq!(reader.count(), 1);
    }

    #[test]
    fn test_empty_batch_rejected() {
        let mut buffer = Vec::new();
        let mut writer = Writer::new(&mut buffer).expect("failed to create writer");
        assert!(matches!(
            writer.record(1.0, &[]).unwrap_err().kind(),
            ErrorKind::EmptyBatch
        ));
        assert!(matches!(
            Batch::new(f64::NAN, vec![1]).unwrap_err().kind(),
            ErrorKind::InvalidTimestamp
        ));
    }

    #[rstest(
        formatted,
        expected,
        case::request("11 03 00 6B 00 03 76 87", vec![0x11, 0x03, 0x00, 0x6b, 0x00, 0x03, 0x76, 0x87]),
        case::lower("ae 41", vec![0xae, 0x41]),
        case::double_space("01  02", vec![0x01, 0x02])
    )]
    fn test_parse(formatted: &str, expected: Vec<u8>) {
        let batch = Batch::parse(formatted, 4.0).unwrap();
        assert_eq!(batch.data, expected);
        assert_eq!(batch.timestamp, 4.0);
    }

    #[test]
    fn test_parse_rejects_bad_text() {
        assert!(matches!(
            Batch::parse("11 0X", 0.0).unwrap_err().kind(),
            ErrorKind::Token(_)
        ));
        assert!(matches!(
            Batch::parse("", 0.0).unwrap_err().kind(),
            ErrorKind::EmptyBatch
        ));
    }

    #[test]
    fn test_formatted_tokens() {
        let batch = Batch::new(9.0, vec![0x11, 0x03, 0xae]).unwrap();
        assert_eq!(batch.formatted(), "11 03 AE");

        let tokens = batch.tokens();
        assert_eq!(token::concat(&tokens), "1103AE");
        assert!(tokens.iter().all(|token| token.timestamp() == 9.0));
        assert_eq!(token::tokenize(&batch.formatted(), 9.0).unwrap(), tokens);
    }
}
