//! # Telemetry Remote Write
//!
//! Encodes series into Prometheus remote write requests
//! and pushes them to a remote write endpoint.
//!

pub mod client;
pub mod config;
pub mod encode;
pub mod error;
pub mod proto;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use client::WriteClient;
pub use config::ClientConfig;
pub use encode::{decode, encode, encode_request, EncodedPayload};
pub use error::{ConfigError, DecodeError, EncodeError, TransportError, WriteError};
pub use proto::{Label, Sample, TimeSeries, WriteRequest};
