//! Windowed multi-horizon prediction
//!
//! Scales the last [`WINDOW_LENGTH`] feature rows with the artifact's fitted
//! scaler, runs the sequence model and maps the scaled horizon outputs back
//! to price units through the target column of the same scaler.

use crate::constants::{FEATURE_COUNT, N_HORIZONS, TARGET_COLUMN_INDEX, WINDOW_LENGTH};
use crate::error::{AppError, Result};
use crate::models::Timeframe;
use crate::services::model_registry::{ModelArtifact, ModelRegistry};
use ndarray::{Array2, Array3, ArrayView2};
use tracing::debug;

/// Forecast prices for t+1, t+2, t+3
pub type Forecast = [f64; N_HORIZONS];

/// Look up the artifact and predict from a feature window.
pub fn predict(
    registry: &ModelRegistry,
    ticker: &str,
    timeframe: Timeframe,
    window: ArrayView2<'_, f64>,
) -> Result<Forecast> {
    let artifact = registry.get(ticker, timeframe)?;
    predict_window(&artifact, window)
}

/// Predict from a `WINDOW_LENGTH x FEATURE_COUNT` window with a resolved artifact.
pub fn predict_window(artifact: &ModelArtifact, window: ArrayView2<'_, f64>) -> Result<Forecast> {
    check_window_shape(window.nrows(), window.ncols())?;

    let scaled = artifact.scaler.scaler.transform(window)?;
    let input: Array3<f32> = scaled
        .mapv(|v| v as f32)
        .into_shape_with_order((1, WINDOW_LENGTH, FEATURE_COUNT))
        .map_err(|e| AppError::Model(format!("Failed to reshape model input: {}", e)))?;

    let outputs = artifact.run_model(input)?;
    if outputs.len() < N_HORIZONS {
        return Err(AppError::Model(format!(
            "Model returned {} outputs, expected {}",
            outputs.len(),
            N_HORIZONS
        )));
    }
    if let Some(bad) = outputs[..N_HORIZONS].iter().find(|v| !v.is_finite()) {
        return Err(AppError::Model(format!("Model returned non-finite output {}", bad)));
    }

    debug!(
        ticker = %artifact.key.ticker,
        timeframe = %artifact.key.timeframe,
        scaled = ?&outputs[..N_HORIZONS],
        "Model inference complete"
    );

    // Only the target column carries meaning after inversion
    let mut synthetic = Array2::<f64>::zeros((N_HORIZONS, FEATURE_COUNT));
    for (h, value) in outputs[..N_HORIZONS].iter().enumerate() {
        synthetic[[h, TARGET_COLUMN_INDEX]] = *value as f64;
    }
    let restored = artifact.scaler.scaler.inverse_transform(synthetic.view())?;

    let mut forecast = [0.0; N_HORIZONS];
    for (h, slot) in forecast.iter_mut().enumerate() {
        *slot = restored[[h, TARGET_COLUMN_INDEX]];
    }
    Ok(forecast)
}

/// Convert request rows into a window matrix, rejecting ragged input.
pub fn window_from_rows(rows: &[Vec<f64>]) -> Result<Array2<f64>> {
    let n_rows = rows.len();
    let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);

    if let Some(ragged) = rows.iter().find(|r| r.len() != n_cols) {
        return Err(shape_mismatch(n_rows, ragged.len()));
    }
    check_window_shape(n_rows, n_cols)?;

    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((n_rows, n_cols), flat).map_err(|e| AppError::InvalidInput(e.to_string()))
}

fn check_window_shape(rows: usize, cols: usize) -> Result<()> {
    if rows != WINDOW_LENGTH || cols != FEATURE_COUNT {
        return Err(shape_mismatch(rows, cols));
    }
    Ok(())
}

fn shape_mismatch(rows: usize, cols: usize) -> AppError {
    AppError::ShapeMismatch {
        expected_rows: WINDOW_LENGTH,
        expected_cols: FEATURE_COUNT,
        rows,
        cols,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::model_registry::ArtifactKey;
    use crate::services::scaler::{Scaler, ScalerArtifact};
    use crate::services::sequence_model::SequenceModel;
    use crate::services::testing::{registry_with, FixedModel};

    fn window(rows: usize, cols: usize) -> Array2<f64> {
        Array2::from_shape_fn((rows, cols), |(r, c)| (r * cols + c) as f64)
    }

    fn artifact(model: impl SequenceModel + 'static, scaler: Scaler) -> ModelArtifact {
        ModelArtifact::new(
            ArtifactKey::new("BBCA", Timeframe::Day1),
            Box::new(model),
            ScalerArtifact::new(scaler),
        )
    }

    #[test]
    fn test_shape_contract() {
        let registry = registry_with(&[("BBCA", Timeframe::Day1)]);

        let short = window(WINDOW_LENGTH - 1, FEATURE_COUNT);
        let err = predict(&registry, "BBCA", Timeframe::Day1, short.view()).unwrap_err();
        assert!(matches!(err, AppError::ShapeMismatch { rows: 59, .. }));

        let wide = window(WINDOW_LENGTH, FEATURE_COUNT + 1);
        let err = predict(&registry, "BBCA", Timeframe::Day1, wide.view()).unwrap_err();
        assert!(matches!(err, AppError::ShapeMismatch { cols, .. } if cols == FEATURE_COUNT + 1));

        let ok = window(WINDOW_LENGTH, FEATURE_COUNT);
        let forecast = predict(&registry, "BBCA", Timeframe::Day1, ok.view()).unwrap();
        assert_eq!(forecast.len(), N_HORIZONS);
    }

    #[test]
    fn test_missing_artifact() {
        let registry = registry_with(&[("BBCA", Timeframe::Day1)]);
        let ok = window(WINDOW_LENGTH, FEATURE_COUNT);
        let err = predict(&registry, "ZZZZ", Timeframe::Day1, ok.view()).unwrap_err();
        assert!(matches!(err, AppError::ArtifactNotFound { .. }));
    }

    #[test]
    fn test_inverse_uses_target_column_only() {
        let mut data_min = vec![0.0; FEATURE_COUNT];
        let mut data_max = vec![1.0; FEATURE_COUNT];
        data_min[TARGET_COLUMN_INDEX] = 1000.0;
        data_max[TARGET_COLUMN_INDEX] = 2000.0;
        let scaler = Scaler::MinMax {
            data_min,
            data_max,
            feature_range: (0.0, 1.0),
        };

        let artifact = artifact(FixedModel(vec![0.0, 0.5, 1.0, 42.0]), scaler);
        let forecast = predict_window(&artifact, window(WINDOW_LENGTH, FEATURE_COUNT).view()).unwrap();
        for (got, want) in forecast.iter().zip([1000.0, 1500.0, 2000.0]) {
            assert!((got - want).abs() < 1e-6, "{} != {}", got, want);
        }
    }

    #[test]
    fn test_model_output_validation() {
        let identity = || Scaler::Standard {
            mean: vec![0.0; FEATURE_COUNT],
            scale: vec![1.0; FEATURE_COUNT],
        };
        let input = window(WINDOW_LENGTH, FEATURE_COUNT);

        let too_few = artifact(FixedModel(vec![1.0, 2.0]), identity());
        assert!(matches!(predict_window(&too_few, input.view()), Err(AppError::Model(_))));

        let nan = artifact(FixedModel(vec![1.0, f32::NAN, 2.0]), identity());
        assert!(matches!(predict_window(&nan, input.view()), Err(AppError::Model(_))));
    }

    #[test]
    fn test_window_from_rows() {
        let rows = vec![vec![1.0; FEATURE_COUNT]; WINDOW_LENGTH];
        let window = window_from_rows(&rows).unwrap();
        assert_eq!(window.dim(), (WINDOW_LENGTH, FEATURE_COUNT));

        let mut ragged = rows.clone();
        ragged[10].pop();
        assert!(matches!(
            window_from_rows(&ragged),
            Err(AppError::ShapeMismatch { cols, .. }) if cols == FEATURE_COUNT - 1
        ));

        assert!(matches!(
            window_from_rows(&[]),
            Err(AppError::ShapeMismatch { rows: 0, cols: 0, .. })
        ));
    }
}
