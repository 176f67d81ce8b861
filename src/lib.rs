//! Inkline - image enhancer and outline extractor
//!
//! Resamples images to a target size and stamps their print resolution,
//! traces line-art outlines, and serves both behind a two-step browser wizard.
//! This library exposes modules for integration testing.

pub mod api;
pub mod assets;
pub mod client;
pub mod dimensions;
pub mod error;
pub mod imaging;
pub mod models;
pub mod requests;
pub mod server;
pub mod services;
pub mod session;
