use crate::error::Result;
use crate::token::Token;

pub trait Decode: Sized {
    /// Fewest tokens a window must hold before decoding is attempted.
    const MIN_LENGTH: usize;

    /// Decode one frame from the start of `window`.
    ///
    /// Tokens after the frame are ignored. The caller learns how many tokens
    /// were consumed from the decoded frame itself.
    fn try_decode(window: &[Token]) -> Result<Self>;
}
