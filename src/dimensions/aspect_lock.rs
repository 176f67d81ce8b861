//! Aspect-ratio lock.
//!
//! When the lock is engaged, editing one side of a width/height pair
//! recomputes only the other side from a reference size. The edited value is
//! returned to the caller untouched, so wiring both inputs to the same handler
//! cannot ping-pong.

use thiserror::Error;

use super::units::round_for_unit;
use crate::models::{Axis, PixelSize, Unit};

/// Pixels either side may drift from the exact ratio after rounding.
const ROUNDING_SLACK_PX: f64 = 1.0;

/// The lock has no usable reference size; recomputation is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("No reference dimensions available")]
pub struct NoReferenceAvailable;

/// Compute the paired dimension for `new_value` on the `edited` axis.
///
/// Rounding follows `unit`: whole pixels, or two decimals for physical lengths.
pub fn recompute(
    edited: Axis,
    new_value: f64,
    reference_width: f64,
    reference_height: f64,
    unit: Unit,
) -> Result<f64, NoReferenceAvailable> {
    if !is_usable(reference_width) || !is_usable(reference_height) {
        return Err(NoReferenceAvailable);
    }

    let paired = match edited {
        Axis::Width => new_value * (reference_height / reference_width),
        Axis::Height => new_value * (reference_width / reference_height),
    };
    Ok(round_for_unit(paired, unit))
}

fn is_usable(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// A width/height pair after one side was edited.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LockedPair {
    pub width: f64,
    pub height: f64,
}

/// Apply an edit to a pair, recomputing the other side when `locked`.
///
/// Without a reference the lock degrades to a plain edit.
pub fn apply_edit(
    current: LockedPair,
    edited: Axis,
    new_value: f64,
    locked: bool,
    reference: Option<(f64, f64)>,
    unit: Unit,
) -> LockedPair {
    let mut next = current;
    match edited {
        Axis::Width => next.width = new_value,
        Axis::Height => next.height = new_value,
    }

    if !locked {
        return next;
    }

    let Some((ref_w, ref_h)) = reference else {
        tracing::debug!("Aspect lock engaged without reference, skipping");
        return next;
    };

    match recompute(edited, new_value, ref_w, ref_h, unit) {
        Ok(paired) => match edited.paired() {
            Axis::Width => next.width = paired,
            Axis::Height => next.height = paired,
        },
        Err(NoReferenceAvailable) => {
            tracing::debug!(ref_w, ref_h, "Aspect lock reference unusable, skipping");
        }
    }
    next
}

/// Shrink `target` so it keeps the ratio of `source`.
///
/// Used when a locked request carries both sides. A target whose sides are
/// within a pixel of the source ratio (checked from either side) is returned
/// unchanged; otherwise the side that scales less is kept and the other
/// derived from it.
pub fn fit_to_source(source: PixelSize, target: PixelSize) -> PixelSize {
    if source.is_empty() || target.is_empty() {
        return target;
    }

    let source_ratio = source.width as f64 / source.height as f64;
    let derived_height = (target.width as f64 / source_ratio).round();
    let derived_width = (target.height as f64 * source_ratio).round();
    if (target.height as f64 - derived_height).abs() <= ROUNDING_SLACK_PX
        || (target.width as f64 - derived_width).abs() <= ROUNDING_SLACK_PX
    {
        return target;
    }

    let scale_w = target.width as f64 / source.width as f64;
    let scale_h = target.height as f64 / source.height as f64;

    if scale_w > scale_h {
        let width = (target.height as f64 * source_ratio).round().max(1.0) as u32;
        PixelSize::new(width, target.height)
    } else {
        let height = (target.width as f64 / source_ratio).round().max(1.0) as u32;
        PixelSize::new(target.width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_edit_recomputes_height() {
        let height = recompute(Axis::Width, 400.0, 1000.0, 500.0, Unit::Pixels).unwrap();
        assert_eq!(height, 200.0);
    }

    #[test]
    fn test_height_edit_recomputes_width() {
        let width = recompute(Axis::Height, 300.0, 1000.0, 500.0, Unit::Pixels).unwrap();
        assert_eq!(width, 600.0);
    }

    #[test]
    fn test_physical_rounding_keeps_two_decimals() {
        let height = recompute(Axis::Width, 1.0, 3.0, 2.0, Unit::Physical).unwrap();
        assert_eq!(height, 0.67);
    }

    #[test]
    fn test_missing_reference_is_noop() {
        assert_eq!(
            recompute(Axis::Width, 400.0, 0.0, 500.0, Unit::Pixels),
            Err(NoReferenceAvailable)
        );
        assert_eq!(
            recompute(Axis::Height, 400.0, 1000.0, -1.0, Unit::Pixels),
            Err(NoReferenceAvailable)
        );
        assert_eq!(
            recompute(Axis::Height, 400.0, f64::NAN, 10.0, Unit::Pixels),
            Err(NoReferenceAvailable)
        );
    }

    #[test]
    fn test_width_then_height_returns_close_to_start() {
        let references = [(1000.0, 500.0), (640.0, 480.0), (1920.0, 1080.0), (333.0, 777.0)];
        for (w, h) in references {
            for new_value in [50.0, 400.0, 1234.0] {
                let height = recompute(Axis::Width, new_value, w, h, Unit::Pixels).unwrap();
                let width = recompute(Axis::Height, height, w, h, Unit::Pixels).unwrap();
                // One pixel of rounding on each leg, scaled by the ratio.
                let tolerance = 1.0 + (w / h).max(1.0);
                assert!(
                    (width - new_value).abs() <= tolerance,
                    "ref {w}x{h}: {new_value} -> {height} -> {width}"
                );
            }
        }
    }

    #[test]
    fn test_apply_edit_only_touches_paired_field() {
        let start = LockedPair {
            width: 1000.0,
            height: 500.0,
        };
        let next = apply_edit(
            start,
            Axis::Width,
            400.0,
            true,
            Some((1000.0, 500.0)),
            Unit::Pixels,
        );
        assert_eq!(next.width, 400.0);
        assert_eq!(next.height, 200.0);

        // Editing the recomputed field does not bounce back into width edits.
        let again = apply_edit(next, Axis::Height, 250.0, true, Some((1000.0, 500.0)), Unit::Pixels);
        assert_eq!(again.height, 250.0);
        assert_eq!(again.width, 500.0);
    }

    #[test]
    fn test_apply_edit_unlocked_or_without_reference() {
        let start = LockedPair {
            width: 10.0,
            height: 20.0,
        };
        let unlocked = apply_edit(start, Axis::Width, 30.0, false, Some((1.0, 1.0)), Unit::Pixels);
        assert_eq!(unlocked, LockedPair { width: 30.0, height: 20.0 });

        let no_ref = apply_edit(start, Axis::Height, 5.0, true, None, Unit::Pixels);
        assert_eq!(no_ref, LockedPair { width: 10.0, height: 5.0 });
    }

    #[test]
    fn test_fit_to_source_keeps_matching_ratio() {
        let fitted = fit_to_source(PixelSize::new(1000, 500), PixelSize::new(400, 200));
        assert_eq!(fitted, PixelSize::new(400, 200));
    }

    #[test]
    fn test_fit_to_source_limits_by_smaller_scale() {
        // Height scales less (0.5 vs 0.8) so it wins and width is derived.
        let fitted = fit_to_source(PixelSize::new(1000, 500), PixelSize::new(800, 250));
        assert_eq!(fitted, PixelSize::new(500, 250));

        // Width scales less so height is derived.
        let fitted = fit_to_source(PixelSize::new(1000, 500), PixelSize::new(300, 400));
        assert_eq!(fitted, PixelSize::new(300, 150));
    }

    #[test]
    fn test_fit_to_source_accepts_rounded_extreme_ratios() {
        // 1010 / 40 = 25.25, so the ratio drifts well past 1% after rounding.
        let wide = fit_to_source(PixelSize::new(4000, 100), PixelSize::new(1010, 25));
        assert_eq!(wide, PixelSize::new(1010, 25));

        let tall = fit_to_source(PixelSize::new(100, 4000), PixelSize::new(25, 1010));
        assert_eq!(tall, PixelSize::new(25, 1010));

        let derived_from_height = fit_to_source(PixelSize::new(4000, 100), PixelSize::new(1000, 26));
        assert_eq!(derived_from_height, PixelSize::new(1000, 26));
    }
}
