//! Linear scan over a captured token stream.
//!
//! RTU frames carry no delimiter or length prefix, so the only way to find
//! a frame boundary is to try decoding at every position. At each position
//! the scanner looks for a checksum-valid request, then for the matching
//! response right behind it. When nothing decodes it steps over one token
//! and counts it as unrecognized. Runs of such tokens are reported as a
//! single [`UnrecognizedSpan`] once the next frame is found or the input
//! ends.
//!
//! The scanner is an iterator. Output order is scan order, and the frames
//! it yields partition the input: their token counts sum to the input
//! length (inputs shorter than one frame yield nothing).

use crate::frame::{Frame, Request, Response, UnrecognizedSpan, FIXED_LENGTH};

use rtusniff::parser::Decode;
use rtusniff::token::Token;

use std::collections::VecDeque;
use tracing::{debug, error, trace};

/// Fewest tokens that can hold a request.
pub const MIN_FRAME_LENGTH: usize = FIXED_LENGTH;

#[derive(Debug)]
pub struct Scanner<'a> {
    tokens: &'a [Token],
    /// Index of the next token to examine. Never decreases.
    position: usize,
    /// Tokens stepped over since the last decoded frame. They always end
    /// right before `position`.
    pending_bad_run: usize,
    ready: VecDeque<Frame>,
    finished: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Scanner {
            tokens,
            position: 0,
            pending_bad_run: 0,
            ready: VecDeque::new(),
            finished: false,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    fn remaining(&self) -> &'a [Token] {
        &self.tokens[self.position..]
    }

    /// Looks for a checksum-valid request at the current position.
    fn find_request(&self) -> Option<Request> {
        match Request::try_decode(self.remaining()) {
            Ok(request) => Some(request),
            Err(err) if err.is_recoverable() => {
                trace!(position = self.position, %err, "no request");
                None
            }
            Err(err) => {
                error!(position = self.position, %err, "request decoder fault");
                None
            }
        }
    }

    /// Looks for the response to `request` right behind it.
    ///
    /// A valid response from another station is not a match. Its tokens are
    /// left for the next step to examine.
    fn find_response(&self, request: &Request) -> Option<Response> {
        let start = self.position + request.total_length();
        let window = &self.tokens[start..];
        match request.response_class().try_decode(window) {
            Ok(response) if response.slave_id() == request.slave_id() => Some(response),
            Ok(response) => {
                debug!(
                    position = start,
                    request = request.slave_id(),
                    response = response.slave_id(),
                    "response from another station"
                );
                None
            }
            Err(err) => {
                trace!(position = start, %err, "no response");
                None
            }
        }
    }

    /// Queues the pending unrecognized run, if any.
    fn flush(&mut self) {
        if self.pending_bad_run == 0 {
            return;
        }
        let start = self.position - self.pending_bad_run;
        debug!(
            position = start,
            length = self.pending_bad_run,
            "unrecognized span"
        );
        self.ready.push_back(Frame::from(UnrecognizedSpan {
            tokens: self.tokens[start..self.position].to_vec(),
        }));
        self.pending_bad_run = 0;
    }

    fn step(&mut self) {
        let request = match self.find_request() {
            Some(request) => request,
            None => {
                self.pending_bad_run += 1;
                self.position += 1;
                return;
            }
        };
        let response = self.find_response(&request);

        self.flush();
        self.position += request.total_length();
        self.ready.push_back(Frame::from(request));
        if let Some(response) = response {
            self.position += response.total_length();
            self.ready.push_back(Frame::from(response));
        }
    }

    /// Folds the tokens behind the last examined window into the pending run
    /// and flushes it.
    fn finish(&mut self) {
        self.finished = true;
        if self.tokens.len() >= MIN_FRAME_LENGTH {
            self.pending_bad_run += self.tokens.len() - self.position;
            self.position = self.tokens.len();
        }
        self.flush();
    }
}

impl Iterator for Scanner<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(frame) = self.ready.pop_front() {
                return Some(frame);
            }
            if self.finished {
                return None;
            }
            if self.remaining().len() >= MIN_FRAME_LENGTH {
                self.step();
            } else {
                self.finish();
            }
        }
    }
}

/// Decodes the whole token stream.
pub fn scan(tokens: &[Token]) -> Vec<Frame> {
    Scanner::new(tokens).collect()
}
