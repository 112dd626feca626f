use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::core::ProportionSlice;

/// Angular extent assigned to one slice, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliceSpan {
    pub index: usize,
    pub start_angle: f64,
    /// Stored rather than derived so neighbours share the exact boundary.
    pub end_angle: f64,
    pub span: f64,
}

impl SliceSpan {
    #[must_use]
    pub fn mid_angle(self) -> f64 {
        self.start_angle + self.span * 0.5
    }

    #[must_use]
    pub fn is_full_circle(self) -> bool {
        (self.span - TAU).abs() <= 1e-12
    }
}

/// Assigns contiguous spans to slices in input order, starting at angle 0.
///
/// Spans are derived from cumulative counts so the last slice ends exactly at
/// `2π` and consecutive spans share their boundary bit-for-bit. A zero total
/// yields no spans.
#[must_use]
pub fn compute_slice_spans(slices: &[ProportionSlice]) -> Vec<SliceSpan> {
    let total: u128 = slices.iter().map(|slice| u128::from(slice.count)).sum();
    if total == 0 {
        return Vec::new();
    }

    let mut spans = Vec::with_capacity(slices.len());
    let mut cumulative = 0_u128;
    let mut start_angle = 0.0;
    for (index, slice) in slices.iter().enumerate() {
        cumulative += u128::from(slice.count);
        let end_angle = if cumulative >= total {
            TAU
        } else {
            cumulative as f64 / total as f64 * TAU
        };
        spans.push(SliceSpan {
            index,
            start_angle,
            end_angle,
            span: end_angle - start_angle,
        });
        start_angle = end_angle;
    }
    spans
}

/// Whether a slice percentage label is drawn; the threshold itself is shown.
#[must_use]
pub fn is_label_visible(percentage: f64, threshold_percent: f64) -> bool {
    percentage >= threshold_percent
}
