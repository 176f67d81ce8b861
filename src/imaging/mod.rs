//! Pixel work: decoding, resampling, edge tracing and encoding.
//!
//! Everything here is synchronous and CPU bound; async callers go through
//! `spawn_blocking`.

pub mod encode;
pub mod inspect;
pub mod outline;
pub mod resample;

pub use encode::{encode, ppi_to_ppm, sniff, EncodeOptions};
pub use inspect::{decode, describe, Decoded};
pub use outline::{kernel_for, trace};
pub use resample::resample;
