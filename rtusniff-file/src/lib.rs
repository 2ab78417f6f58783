//! Capture Session Storage
//!
//! Capture appends timestamped byte batches as they arrive from the bus.
//! Analysis later loads a session, narrows it to a time range and turns the
//! batches into tokens for a decoder.

extern crate serde;

#[macro_use]
extern crate serde_derive;
extern crate rmp_serde as rmps;

pub mod error;
pub mod format;
pub mod session;

pub use format::{Batch, Reader, Writer};
pub use session::Session;

pub type Version = usize;

/// Get the version number of the format
pub fn version() -> Version {
    // This should never fail because the compiler sets the environment variable.
    // There doesn't seem to be a "const fn" version of the parse function.
    env!("CARGO_PKG_VERSION_MAJOR")
        .parse()
        .expect("failed to parse version number")
}
