/*!
# rtusniff: offline Modbus RTU traffic analysis

This library turns captured serial bus traffic back into protocol
transactions. Capture produces timestamped batches of raw bytes; analysis
splits those batches into [`token::Token`]s and hands them to a decoder.

The base library contains all of the common types and traits
used by the decoders.

## Crates

- [Modbus](/rtusniff-modbus) Frame decoder and stream resynchronization
- [File](/rtusniff-file) Capture session storage
*/

#![allow(clippy::unneeded_field_pattern)]

/// Return common errors
pub mod error;

/// Decode Frames
pub mod parser;

/// Probe Tokens
pub mod probe;

/// Describe a Protocol
pub mod protocol;

/// Timestamped Bytes
pub mod token;
