//! Request builders: validate user input into specs before any codec call.

pub mod enhance;
pub mod outline;
pub mod upload;

pub use enhance::{EnhanceInput, MAX_TARGET_DIMENSION};
pub use outline::OutlineInput;

use crate::error::ValidationError;
use crate::models::{EnhancementSpec, OutlineSpec};

pub fn build_enhancement(input: &EnhanceInput) -> Result<EnhancementSpec, ValidationError> {
    enhance::build(input)
}

pub fn build_outline(input: &OutlineInput) -> Result<OutlineSpec, ValidationError> {
    outline::build(input)
}
