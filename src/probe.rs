use crate::error::{Error, ErrorKind};
use crate::parser::Decode;
use crate::token::Token;

/// Result of probing the underlying tokens.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Status {
    /// Tokens match this frame shape
    Recognized,
    /// Tokens do not match this frame shape
    Unrecognized,
    /// More tokens are needed to make a decision
    Incomplete,
}

impl<T> From<&crate::error::Result<T>> for Status {
    fn from(result: &crate::error::Result<T>) -> Self {
        match result {
            Ok(_) => Status::Recognized,
            Err(Error {
                kind: ErrorKind::TooShort { .. },
            }) => Status::Incomplete,
            Err(_) => Status::Unrecognized,
        }
    }
}

pub trait Probe: Decode {
    /// Probes the window to recognize if the tokens at its start likely match
    /// this frame shape.
    ///
    /// Returns a probe status. Probe again once more tokens are available when
    /// the status is `Status::Incomplete`.
    fn probe(window: &[Token]) -> Status {
        Status::from(&Self::try_decode(window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use rstest::rstest;

    /// Two tokens, the first of which must be zero.
    struct Pair;

    impl Decode for Pair {
        const MIN_LENGTH: usize = 2;

        fn try_decode(window: &[Token]) -> Result<Self> {
            if window.len() < Self::MIN_LENGTH {
                return Err(Error::too_short(Self::MIN_LENGTH, window.len()));
            }
            if window[0].byte() != 0 {
                return Err(Error::new(ErrorKind::IllegalFunctionCode(window[0].byte())));
            }
            Ok(Pair)
        }
    }

    impl Probe for Pair {}

    #[rstest(
        input,
        expected,
        case::empty(&[], Status::Incomplete),
        case::short(&[0x00], Status::Incomplete),
        case::bad(&[0x01, 0x02], Status::Unrecognized),
        case::good(&[0x00, 0x02, 0x03], Status::Recognized)
    )]
    fn test_probe(input: &[u8], expected: Status) {
        let window = crate::token::from_bytes(input, 0.0);
        assert_eq!(Pair::probe(&window), expected);
    }
}
