//! Embedded assets: the browser wizard and the default config.
//!
//! An external config file is used when it exists; otherwise the embedded
//! `config.yaml` is read.

use rust_embed::RustEmbed;
use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::Path;

/// Embedded wizard pages, stylesheet and script
#[derive(RustEmbed)]
#[folder = "web/"]
#[include = "*.html"]
#[include = "*.css"]
#[include = "*.js"]
#[include = "*.svg"]
struct EmbeddedWeb;

/// Embedded default config
#[derive(RustEmbed)]
#[folder = "."]
#[include = "config.yaml"]
struct EmbeddedConfig;

/// Read the config file, falling back to the embedded default.
pub fn read_config(config_file: Option<&Path>) -> io::Result<Cow<'static, [u8]>> {
    if let Some(path) = config_file {
        if path.exists() {
            tracing::trace!(path = %path.display(), "Loading config from filesystem");
            return Ok(Cow::Owned(fs::read(path)?));
        }
        tracing::debug!(path = %path.display(), "Config file missing, using embedded default");
    }

    EmbeddedConfig::get("config.yaml")
        .map(|f| {
            tracing::trace!("Loading config from embedded assets");
            f.data
        })
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Embedded config.yaml not found"))
}

pub fn read_config_string(config_file: Option<&Path>) -> io::Result<String> {
    let bytes = read_config(config_file)?;
    String::from_utf8(bytes.into_owned()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// An embedded wizard file and its content type.
pub struct WebAsset {
    pub data: Cow<'static, [u8]>,
    pub content_type: &'static str,
}

pub fn web_asset(path: &str) -> Option<WebAsset> {
    let path = path.trim_start_matches('/');
    EmbeddedWeb::get(path).map(|f| WebAsset {
        data: f.data,
        content_type: content_type_for(path),
    })
}

/// Names of all embedded wizard files.
pub fn list_web_assets() -> Vec<String> {
    let mut names: Vec<String> = EmbeddedWeb::iter().map(|s| s.to_string()).collect();
    names.sort();
    names
}

fn content_type_for(path: &str) -> &'static str {
    match path.rsplit_once('.').map(|(_, ext)| ext) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
