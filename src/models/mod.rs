pub mod config;
pub mod dimension;
pub mod format;
pub mod spec;

pub use config::{AppConfig, OutlineConfig, DEFAULT_MAX_UPLOAD_BYTES};
pub use dimension::{
    check_ppi, ppi_from_number, Axis, Dimension, PixelSize, Resolution, Unit, DEFAULT_PPI, MAX_PPI, MIN_PPI,
};
pub use format::OutputFormat;
pub use spec::{
    BlobKind, EnhancementSpec, ImageInfo, OutlineSpec, ProcessingResult, SourceRef,
    ThicknessLevel, MAX_THICKNESS, MIN_THICKNESS,
};
