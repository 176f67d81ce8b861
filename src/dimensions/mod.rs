//! Dimension arithmetic shared by the enhancer: unit conversion and the
//! aspect-ratio lock.

pub mod aspect_lock;
pub mod units;

pub use aspect_lock::{apply_edit, fit_to_source, recompute, LockedPair, NoReferenceAvailable};
pub use units::{convert, round_for_unit, round_physical, to_physical, to_pixels};
