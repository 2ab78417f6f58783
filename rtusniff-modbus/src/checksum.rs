//! CRC-16/MODBUS over a frame's bytes.
//!
//! The register starts at `0xFFFF` and is shifted right through the
//! reflected polynomial `0xA001`. On the wire the result is sent low byte
//! first, so the two trailing tokens of a frame read `lo, hi`.

use rtusniff::error::{Error, ErrorKind, Result};
use rtusniff::token::Token;

use tracing::trace;

const INITIAL: u16 = 0xFFFF;
const POLYNOMIAL: u16 = 0xA001;

/// Number of trailing tokens holding the checksum.
pub const CHECKSUM_LEN: usize = 2;

/// Anything that ends with its own checksum field.
pub trait Checksummed {
    /// All tokens of the frame, checksum included.
    fn tokens(&self) -> &[Token];

    /// The checksum field as stored: the text of the last two tokens.
    fn checksum(&self) -> &str;
}

pub fn compute(bytes: &[u8]) -> u16 {
    bytes.iter().fold(INITIAL, |crc, byte| {
        (0..8).fold(crc ^ u16::from(*byte), |crc, _| {
            if crc & 1 != 0 {
                (crc >> 1) ^ POLYNOMIAL
            } else {
                crc >> 1
            }
        })
    })
}

/// Appends the checksum of `bytes` in wire order.
pub fn append(bytes: &mut Vec<u8>) {
    let crc = compute(bytes);
    bytes.extend_from_slice(&crc.to_le_bytes());
}

/// Returns the computed and the asserted checksum of `frame`.
///
/// Fails with `MalformedChecksumField` if the frame's last two tokens are
/// not the tokens its checksum field was taken from.
fn split<F: Checksummed + ?Sized>(frame: &F) -> Result<(u16, u16)> {
    let tokens = frame.tokens();
    let checksum = frame.checksum();
    if tokens.len() < CHECKSUM_LEN || checksum.len() != 2 * CHECKSUM_LEN {
        return Err(Error::new(ErrorKind::MalformedChecksumField));
    }
    let (body, trailer) = tokens.split_at(tokens.len() - CHECKSUM_LEN);
    let (lo, hi) = (&trailer[0], &trailer[1]);
    if checksum.get(..2) != Some(lo.text()) || checksum.get(2..) != Some(hi.text()) {
        return Err(Error::new(ErrorKind::MalformedChecksumField));
    }

    let body: Vec<u8> = body.iter().map(Token::byte).collect();
    let computed = compute(&body);
    let asserted = u16::from_le_bytes([lo.byte(), hi.byte()]);
    Ok((computed, asserted))
}

/// Whether the frame's trailing checksum matches its contents.
pub fn validate<F: Checksummed + ?Sized>(frame: &F) -> Result<bool> {
    let (computed, asserted) = split(frame)?;
    Ok(computed == asserted)
}

/// Like [`validate`], but reports a mismatch as `ChecksumMismatch`.
pub fn verify<F: Checksummed + ?Sized>(frame: &F) -> Result<()> {
    let (computed, asserted) = split(frame)?;
    if computed == asserted {
        Ok(())
    } else {
        trace!(computed, asserted, "checksum mismatch");
        Err(Error::new(ErrorKind::ChecksumMismatch { computed, asserted }))
    }
}
