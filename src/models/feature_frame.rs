use crate::constants::{FEATURE_COLUMNS, FEATURE_COUNT};
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use ndarray::{s, Array2, ArrayView1, ArrayView2, Axis};
use std::collections::HashMap;
use tracing::warn;

/// Time-indexed feature matrix in the fixed [`FEATURE_COLUMNS`] order
///
/// One row per bar, one column per feature. Rows are ordered by time
/// ascending, exactly like the bars they were derived from.
#[derive(Debug, Clone)]
pub struct FeatureFrame {
    times: Vec<DateTime<Utc>>,
    values: Array2<f64>,
}

impl FeatureFrame {
    /// Assemble a frame from named indicator columns.
    ///
    /// Columns are placed by name into the fixed schema order, so the order
    /// in which they were computed or inserted is irrelevant. A schema column
    /// that is absent (or has the wrong length) becomes an all-NaN
    /// placeholder and is reported with a warning.
    pub fn from_named_columns(times: Vec<DateTime<Utc>>, columns: &HashMap<&str, Vec<f64>>) -> Self {
        let n = times.len();
        let mut values = Array2::from_elem((n, FEATURE_COUNT), f64::NAN);

        for (idx, name) in FEATURE_COLUMNS.iter().enumerate() {
            match columns.get(name) {
                Some(column) if column.len() == n => {
                    for (row, value) in column.iter().enumerate() {
                        values[[row, idx]] = *value;
                    }
                }
                Some(column) => {
                    warn!(
                        column = %name,
                        expected = n,
                        actual = column.len(),
                        "Feature column has wrong length, filling with placeholder"
                    );
                }
                None => {
                    warn!(column = %name, "Feature column not found after indicator computation, filling with placeholder");
                }
            }
        }

        Self { times, values }
    }

    /// Wrap an existing matrix, checking it has the schema width.
    pub fn from_matrix(times: Vec<DateTime<Utc>>, values: Array2<f64>) -> Result<Self> {
        if values.ncols() != FEATURE_COUNT || values.nrows() != times.len() {
            return Err(AppError::InvalidInput(format!(
                "Feature matrix must be ({}, {}), got ({}, {})",
                times.len(),
                FEATURE_COUNT,
                values.nrows(),
                values.ncols()
            )));
        }
        Ok(Self { times, values })
    }

    /// Column names, always the fixed schema order
    pub fn column_names(&self) -> &'static [&'static str] {
        FEATURE_COLUMNS
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn column(&self, idx: usize) -> ArrayView1<'_, f64> {
        self.values.column(idx)
    }

    /// Whether any cell is NaN or infinite
    pub fn has_missing(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }

    /// Apply the missing-value policy in place: forward-fill, then
    /// backward-fill, then zero-fill.
    pub fn fill_missing(&mut self) {
        fill_missing(&mut self.values);
    }

    /// Last `n` rows, or `None` when the frame is shorter than `n`.
    pub fn tail(&self, n: usize) -> Option<FeatureFrame> {
        let len = self.len();
        if len < n {
            return None;
        }
        let start = len - n;
        Some(FeatureFrame {
            times: self.times[start..].to_vec(),
            values: self.values.slice(s![start.., ..]).to_owned(),
        })
    }
}

/// Forward-fill → backward-fill → zero-fill, column by column.
///
/// Non-finite values (NaN, ±inf) count as missing. The order matters: a
/// leading gap is filled from the first defined value after it, and only
/// columns with no defined value at all end up zeroed.
pub fn fill_missing(values: &mut Array2<f64>) {
    for mut column in values.axis_iter_mut(Axis(1)) {
        // Forward fill
        let mut last: Option<f64> = None;
        for v in column.iter_mut() {
            if v.is_finite() {
                last = Some(*v);
            } else if let Some(prev) = last {
                *v = prev;
            }
        }

        // Backward fill
        let mut next: Option<f64> = None;
        for v in column.iter_mut().rev() {
            if v.is_finite() {
                next = Some(*v);
            } else if let Some(following) = next {
                *v = following;
            }
        }

        // Zero fill
        for v in column.iter_mut() {
            if !v.is_finite() {
                *v = 0.0;
            }
        }
    }
}
