use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::assets;
use crate::models::DEFAULT_PPI;

/// Upload limit applied when the config does not set one (50 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Application configuration loaded from config.yaml
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Directory holding the uploads/, enhanced/ and outlined/ areas
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    /// Largest accepted upload in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Resolution used when a request omits one
    #[serde(default = "default_ppi")]
    pub default_ppi: u32,

    /// Quality for lossy JPEG output (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// Edge detection tuning
    #[serde(default)]
    pub outline: OutlineConfig,
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

fn default_ppi() -> u32 {
    DEFAULT_PPI
}

fn default_jpeg_quality() -> u8 {
    95
}

/// Tuning for the outline trace
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct OutlineConfig {
    /// Lower hysteresis threshold for Canny
    #[serde(default = "default_canny_low")]
    pub canny_low: f32,

    /// Upper hysteresis threshold for Canny
    #[serde(default = "default_canny_high")]
    pub canny_high: f32,

    /// Gaussian blur applied before edge detection
    #[serde(default = "default_blur_sigma")]
    pub blur_sigma: f32,
}

fn default_canny_low() -> f32 {
    50.0
}

fn default_canny_high() -> f32 {
    150.0
}

fn default_blur_sigma() -> f32 {
    1.4
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            canny_low: default_canny_low(),
            canny_high: default_canny_high(),
            blur_sigma: default_blur_sigma(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an external file, falling back to the embedded config.yaml
    pub fn load(config_file: Option<&Path>) -> Self {
        match assets::read_config_string(config_file) {
            Ok(content) => match Self::from_yaml(&content) {
                Ok(config) => {
                    tracing::info!(
                        storage_dir = %config.storage_dir.display(),
                        max_upload_bytes = config.max_upload_bytes,
                        default_ppi = config.default_ppi,
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        let mut config: Self = serde_yaml::from_str(content)?;
        config.sanitize();
        Ok(config)
    }

    /// Apply environment overrides (currently `STORAGE_DIR`).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var("STORAGE_DIR") {
            self.storage_dir = PathBuf::from(dir);
        }
        self
    }

    /// Pull out-of-range values back to something usable
    fn sanitize(&mut self) {
        if crate::models::check_ppi(self.default_ppi).is_err() {
            tracing::warn!(
                default_ppi = self.default_ppi,
                "default_ppi out of range, using {DEFAULT_PPI}"
            );
            self.default_ppi = DEFAULT_PPI;
        }
        self.jpeg_quality = self.jpeg_quality.clamp(1, 100);
        if self.outline.canny_low > self.outline.canny_high {
            std::mem::swap(&mut self.outline.canny_low, &mut self.outline.canny_high);
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            default_ppi: DEFAULT_PPI,
            jpeg_quality: default_jpeg_quality(),
            outline: OutlineConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.storage_dir, PathBuf::from("./data"));
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
        assert_eq!(config.default_ppi, 72);
        assert_eq!(config.jpeg_quality, 95);
        assert_eq!(config.outline.canny_low, 50.0);
        assert_eq!(config.outline.canny_high, 150.0);
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = AppConfig::from_yaml("{}").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
storage_dir: /var/lib/inkline
outline:
  canny_high: 120
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.storage_dir, PathBuf::from("/var/lib/inkline"));
        assert_eq!(config.outline.canny_high, 120.0);
        assert_eq!(config.outline.canny_low, 50.0);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn test_out_of_range_values_are_sanitized() {
        let yaml = r#"
default_ppi: 5000
jpeg_quality: 0
outline:
  canny_low: 200
  canny_high: 100
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.default_ppi, DEFAULT_PPI);
        assert_eq!(config.jpeg_quality, 1);
        assert_eq!(config.outline.canny_low, 100.0);
        assert_eq!(config.outline.canny_high, 200.0);
    }

    #[test]
    fn test_embedded_config_parses() {
        let content = assets::read_config_string(None).unwrap();
        let config = AppConfig::from_yaml(&content).unwrap();
        assert_eq!(config.default_ppi, 72);
    }

    #[test]
    fn test_load_missing_file_falls_back_to_embedded() {
        let config = AppConfig::load(Some(Path::new("/nonexistent/inkline.yaml")));
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }
}
