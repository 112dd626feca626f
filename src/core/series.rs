use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::Color;
use crate::error::{ChartError, ChartResult};

/// One sub-category plotted in every time bucket (for example a user role).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarCategory {
    pub key: String,
    pub label: String,
    pub color: Color,
}

impl BarCategory {
    #[must_use]
    pub fn new(key: impl Into<String>, label: impl Into<String>, color: Color) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            color,
        }
    }
}

/// Values for one time bucket, keyed by category key.
///
/// A category absent from `values` reads as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesBucket {
    pub label: String,
    #[serde(default)]
    pub values: IndexMap<String, f64>,
}

impl SeriesBucket {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            values: IndexMap::new(),
        }
    }

    /// Bucket labelled with the abbreviated month and year, e.g. `Mar 2024`.
    #[must_use]
    pub fn for_month(month: NaiveDate) -> Self {
        Self::new(month.format("%b %Y").to_string())
    }

    #[must_use]
    pub fn with_value(mut self, category_key: impl Into<String>, value: f64) -> Self {
        self.values.insert(category_key.into(), value);
        self
    }

    #[must_use]
    pub fn value(&self, category_key: &str) -> f64 {
        self.values.get(category_key).copied().unwrap_or(0.0)
    }
}

/// Ordered categories crossed with ordered time buckets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategorySeries {
    pub categories: Vec<BarCategory>,
    pub buckets: Vec<SeriesBucket>,
}

impl CategorySeries {
    pub fn new(categories: Vec<BarCategory>, buckets: Vec<SeriesBucket>) -> ChartResult<Self> {
        let series = Self {
            categories,
            buckets,
        };
        series.validate()?;
        Ok(series)
    }

    /// Builds a series from `(month, category key, count)` rows.
    ///
    /// Buckets are ordered by month; repeated rows for the same month and
    /// category accumulate.
    pub fn from_monthly_counts(
        categories: Vec<BarCategory>,
        rows: &[(NaiveDate, String, u64)],
    ) -> ChartResult<Self> {
        let mut months: Vec<NaiveDate> = rows.iter().map(|(month, _, _)| *month).collect();
        months.sort_unstable();
        months.dedup();

        let mut buckets: Vec<SeriesBucket> =
            months.iter().map(|month| SeriesBucket::for_month(*month)).collect();
        for (month, key, count) in rows {
            let Ok(index) = months.binary_search(month) else {
                continue;
            };
            let slot = buckets[index].values.entry(key.clone()).or_insert(0.0);
            *slot += *count as f64;
        }

        Self::new(categories, buckets)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() || self.buckets.is_empty()
    }

    #[must_use]
    pub fn value(&self, bucket: usize, category: usize) -> f64 {
        match (self.buckets.get(bucket), self.categories.get(category)) {
            (Some(bucket), Some(category)) => bucket.value(&category.key),
            _ => 0.0,
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        for category in &self.categories {
            if category.key.is_empty() {
                return Err(ChartError::InvalidData(
                    "bar category key must not be empty".to_owned(),
                ));
            }
            category.color.validate()?;
        }
        for bucket in &self.buckets {
            for (key, value) in &bucket.values {
                if !value.is_finite() || *value < 0.0 {
                    return Err(ChartError::InvalidData(format!(
                        "bucket `{}` value for `{key}` must be finite and >= 0",
                        bucket.label
                    )));
                }
            }
        }
        Ok(())
    }
}
