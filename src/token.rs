//! A token is one captured byte, kept as the two hex digits it was stored
//! as, together with the timestamp of the batch it arrived in.
//!
//! Tokens are the only input the decoders accept. Text validation happens
//! here, once, so decoders can assume every token holds a valid byte.

use crate::error::{Error, ErrorKind, Result};

use nom::bytes::complete::take_while_m_n;
use nom::character::is_hex_digit;
use nom::combinator::all_consuming;

/// Capture time in seconds since the Unix epoch.
pub type Timestamp = f64;

/// Separator between hex pairs in a formatted capture batch.
pub const SEPARATOR: char = ' ';

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    text: String,
    byte: u8,
    timestamp: Timestamp,
}

impl Token {
    /// Builds a token from its hex text.
    ///
    /// Fails with `InvalidToken` unless `text` is exactly two hex digits.
    pub fn new(text: &str, timestamp: Timestamp) -> Result<Self> {
        let invalid = || Error::new(ErrorKind::InvalidToken(text.to_string()));
        let (_, digits) = all_consuming(take_while_m_n::<_, _, nom::error::Error<&[u8]>>(
            2,
            2,
            is_hex_digit,
        ))(text.as_bytes())
        .map_err(|_| invalid())?;
        let digits = std::str::from_utf8(digits).map_err(|_| invalid())?;
        let byte = u8::from_str_radix(digits, 16).map_err(|_| invalid())?;
        Ok(Token {
            text: text.to_string(),
            byte,
            timestamp,
        })
    }

    /// Builds a token from a raw byte, rendered as upper-case hex.
    pub fn from_byte(byte: u8, timestamp: Timestamp) -> Self {
        Token {
            text: format!("{:02X}", byte),
            byte,
            timestamp,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn byte(&self) -> u8 {
        self.byte
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        fmt.write_str(&self.text)
    }
}

/// Splits one formatted batch (`"11 03 00 6B"`) into tokens that all carry
/// the batch timestamp.
pub fn tokenize(formatted: &str, timestamp: Timestamp) -> Result<Vec<Token>> {
    formatted
        .split(SEPARATOR)
        .filter(|pair| !pair.is_empty())
        .map(|pair| Token::new(pair, timestamp))
        .collect()
}

/// Tokens for a run of raw bytes captured at one instant.
pub fn from_bytes(bytes: &[u8], timestamp: Timestamp) -> Vec<Token> {
    bytes
        .iter()
        .map(|byte| Token::from_byte(*byte, timestamp))
        .collect()
}

/// Concatenated text of a token run, e.g. `"1103006B"`.
pub fn concat(tokens: &[Token]) -> String {
    tokens.iter().map(Token::text).collect()
}

/// Byte values of a token run.
pub fn bytes(tokens: &[Token]) -> Vec<u8> {
    tokens.iter().map(Token::byte).collect()
}
