//! Per-column feature scalers
//!
//! Scalers are fitted at training time and stored next to the model as
//! JSON. They are only ever applied here, never re-fitted.

use crate::constants::{FEATURE_COLUMNS, FEATURE_COUNT, FEATURE_SCHEMA_VERSION};
use crate::error::{AppError, Result};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fitted per-column normalisation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    /// `x_scaled = (x - min) / (max - min) * (hi - lo) + lo`
    MinMax {
        data_min: Vec<f64>,
        data_max: Vec<f64>,
        #[serde(default = "default_feature_range")]
        feature_range: (f64, f64),
    },
    /// `x_scaled = (x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
}

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

impl Scaler {
    pub fn n_features(&self) -> usize {
        match self {
            Scaler::MinMax { data_min, .. } => data_min.len(),
            Scaler::Standard { mean, .. } => mean.len(),
        }
    }

    /// Check internal consistency of the fitted statistics.
    pub fn validate(&self) -> Result<()> {
        match self {
            Scaler::MinMax { data_min, data_max, feature_range } => {
                if data_min.len() != data_max.len() {
                    return Err(AppError::Parse(format!(
                        "min_max scaler has {} minimums but {} maximums",
                        data_min.len(),
                        data_max.len()
                    )));
                }
                if !(feature_range.1 > feature_range.0) {
                    return Err(AppError::Parse(format!(
                        "min_max scaler feature_range ({}, {}) is empty",
                        feature_range.0, feature_range.1
                    )));
                }
            }
            Scaler::Standard { mean, scale } => {
                if mean.len() != scale.len() {
                    return Err(AppError::Parse(format!(
                        "standard scaler has {} means but {} scales",
                        mean.len(),
                        scale.len()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Scale a matrix whose columns follow the fitted feature order.
    pub fn transform(&self, values: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        self.check_width(values.ncols())?;
        let mut out = values.to_owned();
        for (col, mut column) in out.columns_mut().into_iter().enumerate() {
            let (offset, factor, shift) = self.column_params(col);
            column.mapv_inplace(|x| (x - offset) * factor + shift);
        }
        Ok(out)
    }

    /// Map scaled values back to original units.
    pub fn inverse_transform(&self, values: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        self.check_width(values.ncols())?;
        let mut out = values.to_owned();
        for (col, mut column) in out.columns_mut().into_iter().enumerate() {
            let (offset, factor, shift) = self.column_params(col);
            column.mapv_inplace(|x| (x - shift) / factor + offset);
        }
        Ok(out)
    }

    fn check_width(&self, ncols: usize) -> Result<()> {
        if ncols != self.n_features() {
            return Err(AppError::InvalidInput(format!(
                "Scaler fitted on {} columns, got {}",
                self.n_features(),
                ncols
            )));
        }
        Ok(())
    }

    /// `(offset, factor, shift)` such that `scaled = (x - offset) * factor + shift`.
    ///
    /// Zero-width ranges and zero scales behave as a unit factor, matching
    /// how constant columns are fitted.
    fn column_params(&self, col: usize) -> (f64, f64, f64) {
        match self {
            Scaler::MinMax { data_min, data_max, feature_range } => {
                let (lo, hi) = *feature_range;
                let span = data_max[col] - data_min[col];
                let span = if span == 0.0 { 1.0 } else { span };
                (data_min[col], (hi - lo) / span, lo)
            }
            Scaler::Standard { mean, scale } => {
                let s = if scale[col] == 0.0 { 1.0 } else { scale[col] };
                (mean[col], 1.0 / s, 0.0)
            }
        }
    }
}

/// Scaler file as stored next to a model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    #[serde(flatten)]
    pub scaler: Scaler,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<u32>,
}

impl ScalerArtifact {
    pub fn new(scaler: Scaler) -> Self {
        Self {
            scaler,
            feature_names: None,
            schema_version: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let artifact: ScalerArtifact = serde_json::from_str(&content)
            .map_err(|e| AppError::Parse(format!("{}: {}", path.display(), e)))?;
        artifact.scaler.validate()?;
        Ok(artifact)
    }

    /// Reject scalers fitted on a different feature schema.
    pub fn validate_schema(&self) -> Result<()> {
        if self.scaler.n_features() != FEATURE_COUNT {
            return Err(AppError::Config(format!(
                "Scaler has {} columns, feature schema has {}",
                self.scaler.n_features(),
                FEATURE_COUNT
            )));
        }

        if let Some(names) = &self.feature_names {
            if names.iter().map(String::as_str).ne(FEATURE_COLUMNS.iter().copied()) {
                return Err(AppError::Config(format!(
                    "Scaler feature names {:?} do not match feature schema",
                    names
                )));
            }
        }

        if let Some(version) = self.schema_version {
            if version != FEATURE_SCHEMA_VERSION {
                return Err(AppError::Config(format!(
                    "Scaler schema version {} does not match {}",
                    version, FEATURE_SCHEMA_VERSION
                )));
            }
        }

        Ok(())
    }
}
