use crate::Version;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum ErrorKind {
    IOError(std::io::Error),
    Serialization(String),
    // Version did not match during deserialization (expected, actual).
    VersionMismatch((Version, Version)),
    // A batch must hold at least one byte.
    EmptyBatch,
    // Timestamps must be comparable.
    InvalidTimestamp,
    // Batch text did not split into valid hex pairs.
    Token(rtusniff::error::Error),
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::result::Result<(), std::fmt::Error> {
        match &self.kind {
            ErrorKind::IOError(err) => write!(fmt, "io error: {}", err),
            ErrorKind::Serialization(err) => write!(fmt, "serialization error: {}", err),
            ErrorKind::VersionMismatch((expected, actual)) => {
                write!(fmt, "expected version {} got {}", expected, actual)
            }
            ErrorKind::EmptyBatch => write!(fmt, "empty batch"),
            ErrorKind::InvalidTimestamp => write!(fmt, "timestamp is not a number"),
            ErrorKind::Token(err) => write!(fmt, "bad batch text: {}", err),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(other: std::io::Error) -> Self {
        Self::new(ErrorKind::IOError(other))
    }
}

impl From<rtusniff::error::Error> for Error {
    fn from(other: rtusniff::error::Error) -> Self {
        Self::new(ErrorKind::Token(other))
    }
}

impl std::convert::From<rmps::encode::Error> for Error {
    fn from(other: rmps::encode::Error) -> Self {
        Error::new(ErrorKind::Serialization(other.to_string()))
    }
}

impl std::convert::From<rmps::decode::Error> for Error {
    fn from(other: rmps::decode::Error) -> Self {
        Error::new(ErrorKind::Serialization(other.to_string()))
    }
}
