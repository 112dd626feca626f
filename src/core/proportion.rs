use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::core::Color;
use crate::error::{ChartError, ChartResult};

/// Secondary figure shown in a slice tooltip (e.g. sessions attended).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceMetric {
    pub label: String,
    pub value: f64,
}

impl SliceMetric {
    #[must_use]
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// One category share of a donut chart.
///
/// `percentage` is supplied by the caller and is not re-derived from
/// `count`; the angular span always is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProportionSlice {
    pub label: String,
    pub count: u64,
    pub color: Color,
    pub percentage: f64,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub metrics: Vec<SliceMetric>,
}

impl ProportionSlice {
    #[must_use]
    pub fn new(label: impl Into<String>, count: u64, color: Color, percentage: f64) -> Self {
        Self {
            label: label.into(),
            count,
            color,
            percentage,
            icon: None,
            metrics: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn with_metric(mut self, label: impl Into<String>, value: f64) -> Self {
        self.metrics.push(SliceMetric::new(label, value));
        self
    }

    /// Builds slices whose percentages are derived from the counts.
    ///
    /// With a zero total every percentage is zero.
    #[must_use]
    pub fn from_counts(entries: &[(&str, u64, Color)]) -> Vec<Self> {
        let total: u128 = entries.iter().map(|(_, count, _)| u128::from(*count)).sum();
        entries
            .iter()
            .map(|(label, count, color)| {
                let percentage = if total == 0 {
                    0.0
                } else {
                    *count as f64 / total as f64 * 100.0
                };
                Self::new(*label, *count, *color, percentage)
            })
            .collect()
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.percentage.is_finite() || self.percentage < 0.0 {
            return Err(ChartError::InvalidData(format!(
                "slice `{}` percentage must be finite and >= 0",
                self.label
            )));
        }
        for metric in &self.metrics {
            if !metric.value.is_finite() {
                return Err(ChartError::InvalidData(format!(
                    "slice `{}` metric `{}` must be finite",
                    self.label, metric.label
                )));
            }
        }
        self.color.validate()
    }
}

/// Aggregate shown in the donut center next to the grand total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryTotal {
    pub label: String,
    pub value: f64,
}

/// Resolved input of a donut chart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DonutChartData {
    pub slices: Vec<ProportionSlice>,
    #[serde(default)]
    pub secondary_total: Option<SecondaryTotal>,
}

impl DonutChartData {
    #[must_use]
    pub fn new(slices: Vec<ProportionSlice>) -> Self {
        Self {
            slices,
            secondary_total: None,
        }
    }

    #[must_use]
    pub fn with_secondary_total(mut self, label: impl Into<String>, value: f64) -> Self {
        self.secondary_total = Some(SecondaryTotal {
            label: label.into(),
            value,
        });
        self
    }

    /// Sum of all slice counts; widened so any set of `u64` counts fits.
    #[must_use]
    pub fn total_count(&self) -> u128 {
        self.slices.iter().map(|slice| u128::from(slice.count)).sum()
    }

    pub fn validate(&self) -> ChartResult<()> {
        for slice in &self.slices {
            slice.validate()?;
        }
        if let Some(secondary) = &self.secondary_total {
            if !secondary.value.is_finite() {
                return Err(ChartError::InvalidData(format!(
                    "secondary total `{}` must be finite",
                    secondary.label
                )));
            }
        }
        Ok(())
    }
}

/// Formats a percentage with at most one decimal, e.g. `70%` or `12.5%`.
#[must_use]
pub fn format_percentage(percentage: f64) -> String {
    match Decimal::from_f64(percentage) {
        Some(value) => format!("{}%", value.round_dp(1).normalize()),
        None => "-".to_owned(),
    }
}

/// Formats a raw value without a trailing `.0` for integral figures.
#[must_use]
pub fn format_value(value: f64) -> String {
    match Decimal::from_f64(value) {
        Some(value) => value.round_dp(2).normalize().to_string(),
        None => "-".to_owned(),
    }
}
