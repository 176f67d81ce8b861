//! Client side of the HTTP API.

pub mod gate;
pub mod http_codec;

pub use gate::{InFlightGate, InFlightGuard};
pub use http_codec::HttpCodec;
