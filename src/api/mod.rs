pub mod files;
pub mod helpers;
pub mod pages;
pub mod process;
pub mod upload;

pub use files::{__path_handle_download, __path_handle_file};
pub use files::{download_url, file_url, handle_download, handle_file};
pub use helpers::{__path_handle_calculate_dimensions, __path_handle_convert_units};
pub use helpers::{
    handle_calculate_dimensions, handle_convert_units, CalculateDimensionsRequest,
    CalculateDimensionsResponse, ConvertUnitsRequest, ConvertUnitsResponse,
};
pub use process::{__path_handle_enhance, __path_handle_extract_outline};
pub use process::{
    handle_enhance, handle_extract_outline, EnhanceRequest, OutlineRequest, ProcessResponse,
};
pub use upload::{__path_handle_upload, handle_upload, UploadForm, UploadResponse};
