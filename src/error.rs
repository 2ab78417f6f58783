use nom::error::ErrorKind as NomErrorKind;

pub type Result<T> = std::result::Result<T, Error>;

pub type NomError<I> = nom::error::Error<I>;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Error {
    pub kind: ErrorKind,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    /// Helper for the common "window too short" case.
    pub fn too_short(needed: usize, available: usize) -> Self {
        Self::new(ErrorKind::TooShort { needed, available })
    }

    /// Whether the decode attempt can be retried at another position.
    ///
    /// Everything except a malformed checksum field and bad token text is a
    /// normal outcome of scanning noisy input.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self.kind,
            ErrorKind::MalformedChecksumField | ErrorKind::InvalidToken(_)
        )
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// Fewer tokens remain than the attempted frame shape needs.
    TooShort { needed: usize, available: usize },
    /// The opcode is not one the attempted frame shape accepts.
    IllegalFunctionCode(u8),
    /// Structurally valid frame whose trailing checksum does not match.
    ChecksumMismatch { computed: u16, asserted: u16 },
    /// A frame does not end with the tokens of its own checksum field.
    MalformedChecksumField,
    /// Token text is not exactly two hexadecimal digits.
    InvalidToken(String),
    /// Field extraction failed.
    InvalidData(NomErrorKind),
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::result::Result<(), std::fmt::Error> {
        match &self.kind {
            ErrorKind::TooShort { needed, available } => write!(
                fmt,
                "too short: needed {} tokens, {} available",
                needed, available
            ),
            ErrorKind::IllegalFunctionCode(code) => {
                write!(fmt, "illegal function code {}", code)
            }
            ErrorKind::ChecksumMismatch { computed, asserted } => write!(
                fmt,
                "checksum mismatch: computed {:04X} asserted {:04X}",
                computed, asserted
            ),
            ErrorKind::MalformedChecksumField => {
                write!(fmt, "frame does not end with its checksum field")
            }
            ErrorKind::InvalidToken(text) => write!(fmt, "invalid hex token {:?}", text),
            ErrorKind::InvalidData(kind) => {
                write!(fmt, "invalid data: {}", kind.description())
            }
        }
    }
}

impl std::error::Error for Error {}

impl<I> From<nom::Err<NomError<I>>> for Error {
    fn from(other: nom::Err<NomError<I>>) -> Self {
        match other {
            nom::Err::Incomplete(nom::Needed::Size(needed)) => {
                Error::too_short(needed.get(), 0)
            }
            nom::Err::Incomplete(nom::Needed::Unknown) => Error::too_short(1, 0),
            nom::Err::Error(err) | nom::Err::Failure(err) => {
                Error::new(ErrorKind::InvalidData(err.code))
            }
        }
    }
}
