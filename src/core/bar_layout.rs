use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::CategorySeries;

/// Highest value of every category across all buckets, in category order.
///
/// Each category is scaled against its own ceiling rather than a shared one.
#[must_use]
pub fn category_maxima(series: &CategorySeries) -> Vec<f64> {
    (0..series.categories.len())
        .map(|category| {
            (0..series.buckets.len())
                .map(|bucket| OrderedFloat(series.value(bucket, category)))
                .max()
                .map_or(0.0, |max| max.0)
        })
        .collect()
}

/// Rendered bar height; a zero ceiling or zero visual height yields zero.
///
/// `progress` is clamped to `[0, 1]` so the result never exceeds
/// `max_visual_height`.
#[must_use]
pub fn bar_height(value: f64, category_max: f64, max_visual_height: f64, progress: f64) -> f64 {
    if category_max <= 0.0 || max_visual_height <= 0.0 || !category_max.is_finite() {
        return 0.0;
    }
    let ratio = (value / category_max).clamp(0.0, 1.0);
    ratio * max_visual_height * progress.clamp(0.0, 1.0)
}

/// Spacing used to place bars on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarGridSpacing {
    /// Distance between neighbouring time buckets along X.
    pub bucket_spacing: f64,
    /// Distance between neighbouring categories along Z inside a bucket.
    pub category_spacing: f64,
}

/// Ground-plane center of one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarSlot {
    pub bucket: usize,
    pub category: usize,
    pub x: f64,
    pub z: f64,
}

/// Lays buckets out along X and categories along Z, centred on the origin.
#[must_use]
pub fn layout_bar_slots(
    bucket_count: usize,
    category_count: usize,
    spacing: BarGridSpacing,
) -> Vec<BarSlot> {
    let bucket_origin = centred_offset(bucket_count, spacing.bucket_spacing);
    let category_origin = centred_offset(category_count, spacing.category_spacing);

    let mut slots = Vec::with_capacity(bucket_count * category_count);
    for bucket in 0..bucket_count {
        for category in 0..category_count {
            slots.push(BarSlot {
                bucket,
                category,
                x: bucket_origin + bucket as f64 * spacing.bucket_spacing,
                z: category_origin + category as f64 * spacing.category_spacing,
            });
        }
    }
    slots
}

/// X coordinate of a bucket group center.
#[must_use]
pub fn bucket_center_x(bucket: usize, bucket_count: usize, spacing: BarGridSpacing) -> f64 {
    centred_offset(bucket_count, spacing.bucket_spacing) + bucket as f64 * spacing.bucket_spacing
}

fn centred_offset(count: usize, step: f64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    -((count - 1) as f64) * step * 0.5
}
