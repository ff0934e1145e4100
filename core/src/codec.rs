//! WorkerCodec
//!
//! Tokio codec for talking to the assembler worker over its stdio, one JSON message per line.

use std::io;

use crate::notifier::NotifierTx;
use crate::protocol::{WorkerRequest, WorkerResponse};
use crate::util;

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};

/// Decodes responses from and encodes requests to the assembler worker
///
/// Framing is left to `LinesCodec`. A line that isn't a message we understand is logged and
/// skipped, it never ends the stream.
#[derive(Debug)]
pub struct WorkerCodec {
    lines: LinesCodec,
    notifier_tx: NotifierTx,
}

impl WorkerCodec {
    pub fn new(notifier_tx: NotifierTx) -> Self {
        WorkerCodec {
            lines: LinesCodec::new(),
            notifier_tx,
        }
    }

    fn parse_line(&self, line: &str) -> Option<WorkerResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        match serde_json::from_str(line) {
            Ok(resp) => Some(resp),
            Err(e) => {
                util::send_error_and_debug(
                    &self.notifier_tx,
                    "Can't understand assembler worker message",
                    &format!("Can't read '{}': {}", line, e),
                );
                None
            }
        }
    }
}

fn to_io_error(err: LinesCodecError) -> io::Error {
    match err {
        LinesCodecError::Io(e) => e,
        e => io::Error::new(io::ErrorKind::InvalidData, e.to_string()),
    }
}

impl Decoder for WorkerCodec {
    type Item = WorkerResponse;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        while let Some(line) = self.lines.decode(src).map_err(to_io_error)? {
            if let Some(resp) = self.parse_line(&line) {
                return Ok(Some(resp));
            }
        }

        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        while let Some(line) = self.lines.decode_eof(src).map_err(to_io_error)? {
            if let Some(resp) = self.parse_line(&line) {
                return Ok(Some(resp));
            }
        }

        Ok(None)
    }
}

impl Encoder<WorkerRequest> for WorkerCodec {
    type Error = io::Error;

    fn encode(&mut self, req: WorkerRequest, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let json = serde_json::to_string(&req)?;
        self.lines.encode(json, dst).map_err(to_io_error)
    }
}
