use crate::error::{Error, ErrorKind, Result};
use crate::format::{Batch, Reader, Writer};

use rtusniff::token::{Timestamp, Token};

use std::io::{Read, Write};
use tracing::debug;

/// Captured batches held in timestamp order.
///
/// Batches with equal timestamps keep the order they were inserted in.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Session {
    batches: Vec<Batch>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a batch behind every batch with a timestamp not after its own.
    pub fn insert(&mut self, batch: Batch) -> Result<()> {
        if batch.timestamp.is_nan() {
            return Err(Error::new(ErrorKind::InvalidTimestamp));
        }
        if batch.data.is_empty() {
            return Err(Error::new(ErrorKind::EmptyBatch));
        }
        let index = self
            .batches
            .partition_point(|other| other.timestamp <= batch.timestamp);
        self.batches.insert(index, batch);
        Ok(())
    }

    /// Adds the bytes received at `timestamp`.
    pub fn record(&mut self, timestamp: Timestamp, data: &[u8]) -> Result<()> {
        self.insert(Batch::new(timestamp, data.to_vec())?)
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Batches with `start <= timestamp <= end`. A missing bound is open.
    pub fn between(&self, start: Option<Timestamp>, end: Option<Timestamp>) -> &[Batch] {
        let lower = match start {
            Some(start) => self
                .batches
                .partition_point(|batch| batch.timestamp < start),
            None => 0,
        };
        let upper = match end {
            Some(end) => self.batches.partition_point(|batch| batch.timestamp <= end),
            None => self.batches.len(),
        };
        if lower >= upper {
            return &[];
        }
        &self.batches[lower..upper]
    }

    /// Tokens of every batch in order, ready for a decoder.
    pub fn tokens(&self) -> Vec<Token> {
        tokens(&self.batches)
    }

    /// Reads every whole batch from a session file.
    pub fn load<R: Read>(inner: R) -> Result<Self> {
        let mut session = Session::new();
        for batch in Reader::new(inner)? {
            session.insert(batch)?;
        }
        debug!(batches = session.len(), "loaded session");
        Ok(session)
    }

    /// Writes the session as a session file.
    pub fn save<W: Write>(&self, inner: W) -> Result<()> {
        let mut writer = Writer::new(inner)?;
        for batch in &self.batches {
            writer.insert(batch)?;
        }
        writer.flush()?;
        debug!(batches = self.len(), "saved session");
        Ok(())
    }
}

/// Flattens `batches` into one token stream.
pub fn tokens(batches: &[Batch]) -> Vec<Token> {
    batches.iter().flat_map(Batch::tokens).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rtusniff::token;

    fn session() -> Session {
        let mut session = Session::new();
        session.record(3.0, &[0x03]).unwrap();
        session.record(1.0, &[0x01]).unwrap();
        session.record(2.0, &[0x02, 0x20]).unwrap();
        session.record(2.0, &[0x22]).unwrap();
        session
    }

    #[test]
    fn test_insert_order() {
        let session = session();
        assert_eq!(
            session
                .batches()
                .iter()
                .map(|batch| batch.data.clone())
                .collect::<Vec<_>>(),
            vec![vec![0x01], vec![0x02, 0x20], vec![0x22], vec![0x03]]
        );
    }

    #[test]
    fn test_insert_rejects() {
        let mut session = Session::new();
        let empty = Batch {
            timestamp: 1.0,
            data: vec![],
        };
        assert!(matches!(
            session.insert(empty).unwrap_err().kind(),
            ErrorKind::EmptyBatch
        ));
        let nan = Batch {
            timestamp: f64::NAN,
            data: vec![1],
        };
        assert!(matches!(
            session.insert(nan).unwrap_err().kind(),
            ErrorKind::InvalidTimestamp
        ));
        assert!(session.is_empty());
    }

    #[rstest(
        start,
        end,
        expected,
        case::open(None, None, 4),
        case::from(Some(2.0), None, 3),
        case::until(None, Some(2.0), 3),
        case::exact(Some(2.0), Some(2.0), 2),
        case::inside(Some(1.5), Some(2.5), 2),
        case::after(Some(4.0), None, 0),
        case::inverted(Some(3.0), Some(1.0), 0)
    )]
    fn test_between(start: Option<Timestamp>, end: Option<Timestamp>, expected: usize) {
        let session = session();
        let batches = session.between(start, end);
        assert_eq!(batches.len(), expected);
        for batch in batches {
            assert!(start.map_or(true, |start| batch.timestamp >= start));
            assert!(end.map_or(true, |end| batch.timestamp <= end));
        }
    }

    #[test]
    fn test_tokens() {
        let session = session();
        let tokens = session.tokens();
        assert_eq!(token::concat(&tokens), "0102202203");
        assert_eq!(
            tokens.iter().map(Token::timestamp).collect::<Vec<_>>(),
            vec![1.0, 2.0, 2.0, 2.0, 3.0]
        );
        assert_eq!(
            token::concat(&super::tokens(session.between(Some(2.0), Some(2.0)))),
            "022022"
        );
    }

    #[test]
    fn test_save_load() {
        let session = session();
        let mut buffer = Vec::new();
        session.save(&mut buffer).unwrap();

        let loaded = Session::load(std::io::Cursor::new(buffer)).unwrap();
        assert_eq!(loaded, session);
    }

    #[test]
    fn test_load_empty_session() {
        let mut buffer = Vec::new();
        Session::new().save(&mut buffer).unwrap();
        let loaded = Session::load(std::io::Cursor::new(buffer)).unwrap();
        assert!(loaded.is_empty());
    }
}
