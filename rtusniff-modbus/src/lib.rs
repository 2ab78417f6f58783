//! A Modbus RTU decoder for captured serial traffic. Given the tokens of a
//! capture, it will resynchronize on frame boundaries and return the
//! request/response transactions it finds, reporting every run of bytes it
//! could not decode as an [`UnrecognizedSpan`] instead of dropping it.
//!
//! Only two request shapes are decoded: read holding/input registers (03, 04)
//! and write single register (06), each with its matching response.
//!
//! The following protocol references were used to create this module:
//!
//! [Modbus Application Protocol Specification V1.1b3](https://modbus.org/docs/Modbus_Application_Protocol_V1_1b3.pdf)
//! [Modbus over Serial Line V1.02](https://modbus.org/docs/Modbus_over_serial_line_V1_02.pdf)
//!
//! # Example
//! ```
//! use rtusniff::token;
//! use rtusniff_modbus::{Frame, Modbus};
//!
//! let tokens = token::tokenize("FF 11 03 00 6B 00 03 76 87", 1700000000.0).unwrap();
//! let modbus = Modbus::default();
//! for frame in modbus.scan(&tokens) {
//!     match frame {
//!         // Bytes that did not belong to any decodable frame
//!         Frame::Unrecognized(span) => println!("{} unrecognized", span.total_length()),
//!         // A checksum-valid request or response
//!         frame => println!("{} from {:?}", frame.kind(), frame.slave_id()),
//!     }
//! }
//! ```

#![allow(clippy::unneeded_field_pattern)]

#[macro_use]
extern crate serde_derive;

pub mod checksum;
pub mod frame;
pub mod record;
pub mod scanner;

pub use frame::{
    Frame, FunctionCode, Kind, ReadRequest, ReadResponse, Request, Response, ResponseClass,
    Transaction, UnrecognizedSpan, WriteSingleRequest, WriteSingleResponse,
};
pub use record::Record;
pub use scanner::Scanner;

use rtusniff::probe::{Probe, Status};
use rtusniff::protocol::Protocol;
use rtusniff::token::Token;

#[derive(Debug, Default, Clone)]
pub struct Modbus {
    /// Only report a window as recognized when its checksum validates too.
    pub probe_strict: bool,
}

impl Protocol for Modbus {
    type Message = Frame;

    fn name() -> &'static str {
        "modbus"
    }
}

impl Modbus {
    /// Lazily decodes the token stream in scan order.
    pub fn scan<'a>(&self, tokens: &'a [Token]) -> Scanner<'a> {
        Scanner::new(tokens)
    }

    /// Decodes the whole token stream.
    pub fn decode(&self, tokens: &[Token]) -> Vec<Frame> {
        self.scan(tokens).collect()
    }

    /// Whether `window` starts with a request.
    pub fn probe(&self, window: &[Token]) -> Status {
        if self.probe_strict {
            return Request::probe(window);
        }
        match (ReadRequest::probe(window), WriteSingleRequest::probe(window)) {
            (Status::Recognized, _) | (_, Status::Recognized) => Status::Recognized,
            (Status::Incomplete, _) | (_, Status::Incomplete) => Status::Incomplete,
            _ => Status::Unrecognized,
        }
    }
}
