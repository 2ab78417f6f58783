//! Frame shapes this decoder understands.
//!
//! Every RTU frame starts with the station address and the function code
//! and ends with a two byte checksum:
//!
//! ```text
//! read request          | slave | 03/04 | address hi lo | count hi lo | crc lo hi |
//! read response         | slave | fc    | byte count    | payload ... | crc lo hi |
//! write single req/resp | slave | 06    | address hi lo | value hi lo | crc lo hi |
//! ```
//!
//! Decoding a variant only checks its structure. Whether the checksum holds
//! is decided separately by [`crate::checksum`].

use crate::checksum::{self, Checksummed, CHECKSUM_LEN};

use rtusniff::error::{Error, ErrorKind, Result};
use rtusniff::parser::Decode;
use rtusniff::probe::Probe;
use rtusniff::token::{self, Timestamp, Token};

use nom::number::complete::{be_u16, be_u8};
use nom::sequence::tuple;
use nom::IResult;
use num_enum::TryFromPrimitive;
use std::convert::TryFrom;

/// Length of every fixed size frame, checksum included.
pub const FIXED_LENGTH: usize = 8;
/// Slave id, function code, byte count and the checksum.
pub const READ_RESPONSE_OVERHEAD: usize = 5;

/// Function codes with a decodable request shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum FunctionCode {
    ReadHoldingRegisters = 3,
    ReadInputRegisters = 4,
    WriteSingleRegister = 6,
}

const READ_CODES: &[FunctionCode] = &[
    FunctionCode::ReadHoldingRegisters,
    FunctionCode::ReadInputRegisters,
];
const WRITE_SINGLE_CODES: &[FunctionCode] = &[FunctionCode::WriteSingleRegister];

fn header(input: &[u8]) -> IResult<&[u8], (u8, u8)> {
    tuple((be_u8, be_u8))(input)
}

fn address_pair(input: &[u8]) -> IResult<&[u8], (u16, u16)> {
    tuple((be_u16, be_u16))(input)
}

/// The first `length` tokens of the window.
fn take_window(window: &[Token], length: usize) -> Result<&[Token]> {
    window
        .get(..length)
        .ok_or_else(|| Error::too_short(length, window.len()))
}

fn accept(function_code: u8, accepted: &[FunctionCode]) -> Result<()> {
    match FunctionCode::try_from(function_code) {
        Ok(code) if accepted.contains(&code) => Ok(()),
        _ => Err(Error::new(ErrorKind::IllegalFunctionCode(function_code))),
    }
}

/// Text of the trailing checksum tokens, in storage order.
fn checksum_text(tokens: &[Token]) -> String {
    token::concat(&tokens[tokens.len().saturating_sub(CHECKSUM_LEN)..])
}

/// Accessors shared by every decoded frame.
pub trait Transaction: Checksummed {
    fn slave_id(&self) -> u8;

    fn function_code(&self) -> u8;

    /// Concatenated text of every token of the frame.
    fn raw(&self) -> String {
        token::concat(self.tokens())
    }

    /// Number of tokens the frame consumed, checksum included.
    fn total_length(&self) -> usize {
        self.tokens().len()
    }

    /// Capture time of the frame's first token.
    fn timestamp(&self) -> Option<Timestamp> {
        self.tokens().first().map(Token::timestamp)
    }
}

macro_rules! impl_transaction {
    ($($frame:ty),+) => {$(
        impl Checksummed for $frame {
            fn tokens(&self) -> &[Token] {
                &self.tokens
            }

            fn checksum(&self) -> &str {
                &self.checksum
            }
        }

        impl Transaction for $frame {
            fn slave_id(&self) -> u8 {
                self.slave_id
            }

            fn function_code(&self) -> u8 {
                self.function_code
            }
        }

        impl Probe for $frame {}
    )+};
}

impl_transaction!(
    ReadRequest,
    ReadResponse,
    WriteSingleRequest,
    WriteSingleResponse
);

/// Read holding (03) or input (04) registers.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadRequest {
    pub slave_id: u8,
    pub function_code: u8,
    pub address: u16,
    pub count: u16,
    pub checksum: String,
    pub tokens: Vec<Token>,
}

impl ReadRequest {
    pub fn response_class(&self) -> ResponseClass {
        ResponseClass::Read
    }

    /// Wire bytes of a read request, checksum included.
    pub fn encode(slave_id: u8, function_code: u8, address: u16, count: u16) -> Vec<u8> {
        let mut bytes = vec![slave_id, function_code];
        bytes.extend_from_slice(&address.to_be_bytes());
        bytes.extend_from_slice(&count.to_be_bytes());
        checksum::append(&mut bytes);
        bytes
    }
}

impl Decode for ReadRequest {
    const MIN_LENGTH: usize = FIXED_LENGTH;

    fn try_decode(window: &[Token]) -> Result<Self> {
        let tokens = take_window(window, FIXED_LENGTH)?;
        let bytes = token::bytes(tokens);
        let (input, (slave_id, function_code)) = header(&bytes)?;
        accept(function_code, READ_CODES)?;
        let (_, (address, count)) = address_pair(input)?;

        Ok(ReadRequest {
            slave_id,
            function_code,
            address,
            count,
            checksum: checksum_text(tokens),
            tokens: tokens.to_vec(),
        })
    }
}

/// Registers returned for a read request. The payload length is given by
/// the byte count, so the frame is `byte_count + 5` tokens long.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadResponse {
    pub slave_id: u8,
    pub function_code: u8,
    pub byte_count: u8,
    pub payload: Vec<u8>,
    pub checksum: String,
    pub tokens: Vec<Token>,
}

impl ReadResponse {
    /// Payload as captured hex text, one entry per byte.
    pub fn payload_text(&self) -> Vec<&str> {
        let end = 3 + self.payload.len();
        self.tokens
            .get(3..end)
            .unwrap_or_default()
            .iter()
            .map(Token::text)
            .collect()
    }
}

impl Decode for ReadResponse {
    const MIN_LENGTH: usize = READ_RESPONSE_OVERHEAD;

    fn try_decode(window: &[Token]) -> Result<Self> {
        take_window(window, Self::MIN_LENGTH)?;
        let byte_count = window[2].byte();
        let total_length = usize::from(byte_count) + READ_RESPONSE_OVERHEAD;
        let tokens = take_window(window, total_length)?;

        let bytes = token::bytes(tokens);
        let (input, (slave_id, function_code)) = header(&bytes)?;
        let payload = &input[1..1 + usize::from(byte_count)];

        Ok(ReadResponse {
            slave_id,
            function_code,
            byte_count,
            payload: payload.to_vec(),
            checksum: checksum_text(tokens),
            tokens: tokens.to_vec(),
        })
    }
}

/// Fields of a write single register frame. Requests and responses share
/// the layout, the response echoes the request.
struct WriteSingle<'a> {
    slave_id: u8,
    function_code: u8,
    address: u16,
    value: u8,
    tokens: &'a [Token],
}

impl<'a> WriteSingle<'a> {
    fn decode(window: &'a [Token]) -> Result<Self> {
        let tokens = take_window(window, FIXED_LENGTH)?;
        let bytes = token::bytes(tokens);
        let (input, (slave_id, function_code)) = header(&bytes)?;
        accept(function_code, WRITE_SINGLE_CODES)?;
        let (_, (address, value)) = address_pair(input)?;
        let [_, low] = value.to_be_bytes();

        Ok(WriteSingle {
            slave_id,
            function_code,
            address,
            value: low,
            tokens,
        })
    }
}

/// Write one register (06).
///
/// `value` is the low byte of the written value as captured.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteSingleRequest {
    pub slave_id: u8,
    pub function_code: u8,
    pub address: u16,
    pub value: u8,
    pub checksum: String,
    pub tokens: Vec<Token>,
}

impl WriteSingleRequest {
    pub fn response_class(&self) -> ResponseClass {
        ResponseClass::WriteSingle
    }

    /// Wire bytes of a write single request, checksum included.
    pub fn encode(slave_id: u8, address: u16, value: u16) -> Vec<u8> {
        let mut bytes = vec![slave_id, FunctionCode::WriteSingleRegister as u8];
        bytes.extend_from_slice(&address.to_be_bytes());
        bytes.extend_from_slice(&value.to_be_bytes());
        checksum::append(&mut bytes);
        bytes
    }
}

impl Decode for WriteSingleRequest {
    const MIN_LENGTH: usize = FIXED_LENGTH;

    fn try_decode(window: &[Token]) -> Result<Self> {
        let fields = WriteSingle::decode(window)?;
        Ok(WriteSingleRequest {
            slave_id: fields.slave_id,
            function_code: fields.function_code,
            address: fields.address,
            value: fields.value,
            checksum: checksum_text(fields.tokens),
            tokens: fields.tokens.to_vec(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WriteSingleResponse {
    pub slave_id: u8,
    pub function_code: u8,
    pub address: u16,
    pub value: u8,
    pub checksum: String,
    pub tokens: Vec<Token>,
}

impl Decode for WriteSingleResponse {
    const MIN_LENGTH: usize = FIXED_LENGTH;

    fn try_decode(window: &[Token]) -> Result<Self> {
        let fields = WriteSingle::decode(window)?;
        Ok(WriteSingleResponse {
            slave_id: fields.slave_id,
            function_code: fields.function_code,
            address: fields.address,
            value: fields.value,
            checksum: checksum_text(fields.tokens),
            tokens: fields.tokens.to_vec(),
        })
    }
}

/// A request whose checksum has been validated.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Read(ReadRequest),
    WriteSingle(WriteSingleRequest),
}

impl Request {
    /// The response shape expected to follow this request.
    pub fn response_class(&self) -> ResponseClass {
        match self {
            Request::Read(request) => request.response_class(),
            Request::WriteSingle(request) => request.response_class(),
        }
    }

    fn transaction(&self) -> &dyn Transaction {
        match self {
            Request::Read(request) => request,
            Request::WriteSingle(request) => request,
        }
    }

    pub fn slave_id(&self) -> u8 {
        self.transaction().slave_id()
    }

    pub fn total_length(&self) -> usize {
        self.transaction().total_length()
    }
}

impl Decode for Request {
    const MIN_LENGTH: usize = FIXED_LENGTH;

    /// Tries each request shape in priority order and keeps the first one
    /// that is structurally valid and carries a valid checksum.
    fn try_decode(window: &[Token]) -> Result<Self> {
        match ReadRequest::try_decode(window) {
            Ok(request) => {
                checksum::verify(&request)?;
                Ok(Request::Read(request))
            }
            Err(err) if err.is_recoverable() => {
                let request = WriteSingleRequest::try_decode(window)?;
                checksum::verify(&request)?;
                Ok(Request::WriteSingle(request))
            }
            Err(err) => Err(err),
        }
    }
}

impl Probe for Request {}

/// Which response shape follows a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    Read,
    WriteSingle,
}

impl ResponseClass {
    /// Decodes this response shape at the start of `window` and checks its
    /// checksum.
    pub fn try_decode(self, window: &[Token]) -> Result<Response> {
        match self {
            ResponseClass::Read => {
                let response = ReadResponse::try_decode(window)?;
                checksum::verify(&response)?;
                Ok(Response::Read(response))
            }
            ResponseClass::WriteSingle => {
                let response = WriteSingleResponse::try_decode(window)?;
                checksum::verify(&response)?;
                Ok(Response::WriteSingle(response))
            }
        }
    }
}

/// A response whose checksum has been validated.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Read(ReadResponse),
    WriteSingle(WriteSingleResponse),
}

impl Response {
    fn transaction(&self) -> &dyn Transaction {
        match self {
            Response::Read(response) => response,
            Response::WriteSingle(response) => response,
        }
    }

    pub fn slave_id(&self) -> u8 {
        self.transaction().slave_id()
    }

    pub fn total_length(&self) -> usize {
        self.transaction().total_length()
    }
}

/// A maximal run of tokens that no frame shape could be decoded from.
#[derive(Debug, Clone, PartialEq)]
pub struct UnrecognizedSpan {
    pub tokens: Vec<Token>,
}

impl UnrecognizedSpan {
    pub fn raw(&self) -> String {
        token::concat(&self.tokens)
    }

    pub fn total_length(&self) -> usize {
        self.tokens.len()
    }

    pub fn timestamp(&self) -> Option<Timestamp> {
        self.tokens.first().map(Token::timestamp)
    }
}

/// Kind tag of an output frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    ReadRequest,
    ReadResponse,
    WriteSingleRequest,
    WriteSingleResponse,
    Unrecognized,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::ReadRequest => "ReadRequest",
            Kind::ReadResponse => "ReadResponse",
            Kind::WriteSingleRequest => "WriteSingleRequest",
            Kind::WriteSingleResponse => "WriteSingleResponse",
            Kind::Unrecognized => "UnrecognizedSpan",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        fmt.write_str(self.as_str())
    }
}

/// One entry of the decoded stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    ReadRequest(ReadRequest),
    ReadResponse(ReadResponse),
    WriteSingleRequest(WriteSingleRequest),
    WriteSingleResponse(WriteSingleResponse),
    Unrecognized(UnrecognizedSpan),
}

impl From<Request> for Frame {
    fn from(request: Request) -> Self {
        match request {
            Request::Read(request) => Frame::ReadRequest(request),
            Request::WriteSingle(request) => Frame::WriteSingleRequest(request),
        }
    }
}

impl From<Response> for Frame {
    fn from(response: Response) -> Self {
        match response {
            Response::Read(response) => Frame::ReadResponse(response),
            Response::WriteSingle(response) => Frame::WriteSingleResponse(response),
        }
    }
}

impl From<UnrecognizedSpan> for Frame {
    fn from(span: UnrecognizedSpan) -> Self {
        Frame::Unrecognized(span)
    }
}

impl Frame {
    pub fn kind(&self) -> Kind {
        match self {
            Frame::ReadRequest(_) => Kind::ReadRequest,
            Frame::ReadResponse(_) => Kind::ReadResponse,
            Frame::WriteSingleRequest(_) => Kind::WriteSingleRequest,
            Frame::WriteSingleResponse(_) => Kind::WriteSingleResponse,
            Frame::Unrecognized(_) => Kind::Unrecognized,
        }
    }

    /// The decoded transaction, `None` for an unrecognized span.
    pub fn transaction(&self) -> Option<&dyn Transaction> {
        match self {
            Frame::ReadRequest(frame) => Some(frame),
            Frame::ReadResponse(frame) => Some(frame),
            Frame::WriteSingleRequest(frame) => Some(frame),
            Frame::WriteSingleResponse(frame) => Some(frame),
            Frame::Unrecognized(_) => None,
        }
    }

    pub fn is_unrecognized(&self) -> bool {
        matches!(self, Frame::Unrecognized(_))
    }

    pub fn slave_id(&self) -> Option<u8> {
        self.transaction().map(Transaction::slave_id)
    }

    pub fn function_code(&self) -> Option<u8> {
        self.transaction().map(Transaction::function_code)
    }

    pub fn checksum(&self) -> Option<&str> {
        self.transaction().map(Checksummed::checksum)
    }

    pub fn tokens(&self) -> &[Token] {
        match self {
            Frame::ReadRequest(frame) => &frame.tokens,
            Frame::ReadResponse(frame) => &frame.tokens,
            Frame::WriteSingleRequest(frame) => &frame.tokens,
            Frame::WriteSingleResponse(frame) => &frame.tokens,
            Frame::Unrecognized(span) => &span.tokens,
        }
    }

    pub fn raw(&self) -> String {
        token::concat(self.tokens())
    }

    pub fn total_length(&self) -> usize {
        self.tokens().len()
    }

    /// Capture time of the first token, the join key for downstream tables.
    pub fn timestamp(&self) -> Option<Timestamp> {
        self.tokens().first().map(Token::timestamp)
    }
}
