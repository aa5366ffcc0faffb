use crate::constants::{FEATURE_COUNT, N_HORIZONS, WINDOW_LENGTH};
use crate::error::{AppError, Result};
use ndarray::Array3;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use std::path::Path;

/// Pre-trained sequence model: `[batch, window, features]` in, scaled
/// horizon outputs out.
///
/// Inference takes `&mut self`; the owning artifact hands out one call at a
/// time.
pub trait SequenceModel: Send {
    fn predict(&mut self, input: Array3<f32>) -> Result<Vec<f32>>;
}

/// ONNX Runtime backed model
pub struct OnnxSequenceModel {
    session: Session,
    output_name: String,
}

impl OnnxSequenceModel {
    pub fn load(model_path: &Path) -> Result<Self> {
        let load_err = |e: &dyn std::fmt::Display| AppError::Model(format!("{}: {}", model_path.display(), e));

        let session = Session::builder()
            .map_err(|e| load_err(&e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| load_err(&e))?
            .with_intra_threads(1)
            .map_err(|e| load_err(&e))?
            .commit_from_file(model_path)
            .map_err(|e| load_err(&e))?;

        let input = session
            .inputs
            .first()
            .ok_or_else(|| AppError::Model(format!("{}: model declares no inputs", model_path.display())))?;
        if let Some(dims) = input.input_type.tensor_shape() {
            check_input_dims(dims).map_err(|e| load_err(&e))?;
        }

        let output = session
            .outputs
            .first()
            .ok_or_else(|| AppError::Model(format!("{}: model declares no outputs", model_path.display())))?;
        if let Some(dims) = output.output_type.tensor_shape() {
            check_output_dims(dims).map_err(|e| load_err(&e))?;
        }
        let output_name = output.name.clone();

        Ok(Self { session, output_name })
    }
}

fn dim_matches(declared: i64, expected: usize) -> bool {
    declared < 0 || declared == expected as i64
}

/// Declared input must be `[1, WINDOW_LENGTH, FEATURE_COUNT]`, with `-1`
/// allowed for any dynamic axis.
pub fn check_input_dims(dims: &[i64]) -> Result<()> {
    let matches = dims.len() == 3
        && dim_matches(dims[0], 1)
        && dim_matches(dims[1], WINDOW_LENGTH)
        && dim_matches(dims[2], FEATURE_COUNT);
    if matches {
        Ok(())
    } else {
        Err(AppError::Config(format!(
            "model input shape {:?} does not accept [1, {}, {}]",
            dims, WINDOW_LENGTH, FEATURE_COUNT
        )))
    }
}

/// A fixed last output axis must hold at least `N_HORIZONS` values.
pub fn check_output_dims(dims: &[i64]) -> Result<()> {
    match dims.last() {
        Some(&last) if last >= 0 && last < N_HORIZONS as i64 => Err(AppError::Config(format!(
            "model output shape {:?} has fewer than {} horizons",
            dims, N_HORIZONS
        ))),
        _ => Ok(()),
    }
}

impl SequenceModel for OnnxSequenceModel {
    fn predict(&mut self, input: Array3<f32>) -> Result<Vec<f32>> {
        let tensor = Value::from_array(input).map_err(|e| AppError::Model(e.to_string()))?;

        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .map_err(|e| AppError::Model(e.to_string()))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| AppError::Model(format!("missing model output '{}'", self.output_name)))?;

        let (_shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| AppError::Model(e.to_string()))?;

        Ok(data.to_vec())
    }
}

impl std::fmt::Debug for OnnxSequenceModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxSequenceModel")
            .field("output_name", &self.output_name)
            .finish()
    }
}
