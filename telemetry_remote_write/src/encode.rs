//! # Request Encoder
//!
//! Serializes series into a `WriteRequest` and compresses it with the snappy block format,
//! which is what remote write receivers expect for `Content-Encoding: snappy`.

use prost::Message;

use crate::error::{DecodeError, EncodeError};
use crate::proto::{TimeSeries, WriteRequest};

/// A compressed, serialized `WriteRequest` ready to be sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedPayload(Vec<u8>);

impl EncodedPayload {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<EncodedPayload> for Vec<u8> {
    fn from(payload: EncodedPayload) -> Vec<u8> {
        payload.0
    }
}

impl AsRef<[u8]> for EncodedPayload {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Wrap `timeseries` in a write request and encode it
pub fn encode(timeseries: Vec<TimeSeries>) -> Result<EncodedPayload, EncodeError> {
    encode_request(&WriteRequest { timeseries })
}

pub fn encode_request(request: &WriteRequest) -> Result<EncodedPayload, EncodeError> {
    // Serialize request
    let mut bytes: Vec<u8> = Vec::with_capacity(request.encoded_len());
    request.encode(&mut bytes)?;

    // Compress request body
    let mut encoder = snap::raw::Encoder::new();
    let compressed = encoder
        .compress_vec(&bytes)
        .map_err(EncodeError::Compress)?;

    Ok(EncodedPayload(compressed))
}

/// Reverse `encode`, as a remote write receiver would
pub fn decode(payload: &[u8]) -> Result<WriteRequest, DecodeError> {
    let mut decoder = snap::raw::Decoder::new();
    let bytes = decoder
        .decompress_vec(payload)
        .map_err(DecodeError::Decompress)?;
    Ok(WriteRequest::decode(bytes.as_slice())?)
}
