//! Forecasting artifact table
//!
//! Scans the model directory once at startup and pairs each
//! `lstm_model_{TICKER}_{TIMEFRAME}.onnx` with its
//! `scaler_{TICKER}_{TIMEFRAME}.json`. Broken or unpaired files are logged
//! and skipped; the resulting table is immutable.

use crate::constants::{MODEL_FILE_EXTENSION, MODEL_FILE_PREFIX, SCALER_FILE_EXTENSION, SCALER_FILE_PREFIX};
use crate::error::{AppError, Result};
use crate::models::{normalize_ticker, Timeframe};
use crate::services::scaler::ScalerArtifact;
use crate::services::sequence_model::{OnnxSequenceModel, SequenceModel};
use ndarray::Array3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtifactKey {
    pub ticker: String,
    pub timeframe: Timeframe,
}

impl ArtifactKey {
    pub fn new(ticker: &str, timeframe: Timeframe) -> Self {
        Self {
            ticker: normalize_ticker(ticker),
            timeframe,
        }
    }
}

/// Model and scaler for one (ticker, timeframe)
///
/// The model sits behind a per-artifact mutex: concurrent requests for the
/// same artifact run inference one at a time, different artifacts run in
/// parallel.
pub struct ModelArtifact {
    pub key: ArtifactKey,
    model: Mutex<Box<dyn SequenceModel>>,
    pub scaler: ScalerArtifact,
}

impl ModelArtifact {
    pub fn new(key: ArtifactKey, model: Box<dyn SequenceModel>, scaler: ScalerArtifact) -> Self {
        Self {
            key,
            model: Mutex::new(model),
            scaler,
        }
    }

    /// Run the paired model on an already scaled input.
    pub fn run_model(&self, input: Array3<f32>) -> Result<Vec<f32>> {
        let mut model = self
            .model
            .lock()
            .map_err(|_| AppError::Model(format!("model lock poisoned for {}-{}", self.key.ticker, self.key.timeframe)))?;
        model.predict(input)
    }
}

/// Entry of the `/models/available` listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableModel {
    pub ticker: String,
    pub timeframe: String,
}

#[derive(Default)]
pub struct ModelRegistry {
    artifacts: BTreeMap<ArtifactKey, Arc<ModelArtifact>>,
}

impl ModelRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from already loaded artifacts. Later duplicates replace earlier ones.
    pub fn from_artifacts(artifacts: impl IntoIterator<Item = ModelArtifact>) -> Self {
        let artifacts = artifacts
            .into_iter()
            .map(|a| (a.key.clone(), Arc::new(a)))
            .collect();
        Self { artifacts }
    }

    /// Scan `dir` for ONNX models and JSON scalers.
    pub fn load_from_dir(dir: &Path) -> Self {
        Self::load_from_dir_with(dir, |path| {
            let model = OnnxSequenceModel::load(path)?;
            Ok(Box::new(model) as Box<dyn SequenceModel>)
        })
    }

    /// Scan `dir`, loading each model file with `load_model`.
    pub fn load_from_dir_with<F>(dir: &Path, load_model: F) -> Self
    where
        F: Fn(&Path) -> Result<Box<dyn SequenceModel>>,
    {
        let mut registry = Self::empty();

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Model directory not readable, no artifacts loaded");
                return registry;
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        files.sort();

        for path in &files {
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            if let Some(stem) = strip_affixes(file_name, SCALER_FILE_PREFIX, SCALER_FILE_EXTENSION) {
                let model_path = dir.join(format!("{}{}{}", MODEL_FILE_PREFIX, stem, MODEL_FILE_EXTENSION));
                if !model_path.exists() {
                    warn!(file = %file_name, "Scaler has no matching model, skipping");
                }
                continue;
            }

            let Some(stem) = strip_affixes(file_name, MODEL_FILE_PREFIX, MODEL_FILE_EXTENSION) else {
                continue;
            };

            let key = match parse_artifact_stem(stem) {
                Ok(key) => key,
                Err(reason) => {
                    warn!(file = %file_name, reason = %reason, "Skipping model file with unexpected name");
                    continue;
                }
            };

            let scaler_path = dir.join(format!("{}{}{}", SCALER_FILE_PREFIX, stem, SCALER_FILE_EXTENSION));
            if !scaler_path.exists() {
                warn!(file = %file_name, scaler = %scaler_path.display(), "Model has no matching scaler, skipping");
                continue;
            }

            match load_artifact(key.clone(), path, &scaler_path, &load_model) {
                Ok(artifact) => {
                    info!(ticker = %key.ticker, timeframe = %key.timeframe, "Loaded forecasting model");
                    registry.artifacts.insert(key, Arc::new(artifact));
                }
                Err(e) => {
                    error!(file = %file_name, error = %e, "Failed to load forecasting artifact, skipping");
                }
            }
        }

        info!(dir = %dir.display(), count = registry.len(), "Model registry ready");
        registry
    }

    /// Look up the artifact for a ticker, with or without the `.JK` suffix.
    pub fn get(&self, ticker: &str, timeframe: Timeframe) -> Result<Arc<ModelArtifact>> {
        let key = ArtifactKey::new(ticker, timeframe);
        self.artifacts
            .get(&key)
            .cloned()
            .ok_or_else(|| AppError::ArtifactNotFound {
                ticker: key.ticker,
                timeframe: timeframe.to_string(),
                available: self.available_pairs(),
            })
    }

    /// Loaded artifacts, sorted by ticker then timeframe
    pub fn available(&self) -> Vec<AvailableModel> {
        self.artifacts
            .keys()
            .map(|k| AvailableModel {
                ticker: k.ticker.clone(),
                timeframe: k.timeframe.to_string(),
            })
            .collect()
    }

    fn available_pairs(&self) -> Vec<(String, String)> {
        self.available()
            .into_iter()
            .map(|m| (m.ticker, m.timeframe))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

fn strip_affixes<'a>(file_name: &'a str, prefix: &str, extension: &str) -> Option<&'a str> {
    file_name.strip_prefix(prefix)?.strip_suffix(extension)
}

/// `BBCA_1d` -> (BBCA, 1d). Exactly two `_`-separated parts.
fn parse_artifact_stem(stem: &str) -> std::result::Result<ArtifactKey, String> {
    let parts: Vec<&str> = stem.split('_').collect();
    let [ticker, timeframe] = parts.as_slice() else {
        return Err(format!("expected TICKER_TIMEFRAME, got '{}'", stem));
    };
    if ticker.is_empty() {
        return Err("empty ticker".to_string());
    }
    let timeframe: Timeframe = timeframe.parse().map_err(|e: AppError| e.to_string())?;
    Ok(ArtifactKey::new(ticker, timeframe))
}

fn load_artifact<F>(key: ArtifactKey, model_path: &Path, scaler_path: &Path, load_model: &F) -> Result<ModelArtifact>
where
    F: Fn(&Path) -> Result<Box<dyn SequenceModel>>,
{
    let scaler = ScalerArtifact::load(scaler_path)?;
    scaler.validate_schema()?;
    let model = load_model(model_path)?;
    Ok(ModelArtifact::new(key, model, scaler))
}
