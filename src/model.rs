//! The fitted pipeline: a standard scaler feeding a ridge regressor.
//!
//! Fitting goes through linfa; the learned parameters are then lifted into a
//! plain serializable struct so the serving side stays a few multiplies per
//! request and the artifact format is independent of linfa internals.

use linfa::prelude::*;
use linfa_elasticnet::ElasticNet;
use linfa_preprocessing::linear_scaling::LinearScaler;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed L2 regularization strength. No search, no cross-validation.
pub const RIDGE_PENALTY: f64 = 1.0;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("insufficient data for training: {0} samples")]
    InsufficientData(usize),

    #[error("feature length mismatch: got {got}, expected {expected}")]
    FeatureLength { got: usize, expected: usize },

    #[error("model fitting error: {0}")]
    Fit(String),
}

/// Learned scaler and regressor parameters, immutable once fitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoPipeline {
    pub lags: usize,
    pub offsets: Vec<f64>,
    pub scales: Vec<f64>,
    pub weights: Vec<f64>,
    pub intercept: f64,
}

impl DoPipeline {
    /// Fit scaler and ridge regressor on the training split only.
    pub fn fit(
        x_train: &Array2<f64>,
        y_train: &Array1<f64>,
        lags: usize,
    ) -> Result<Self, ModelError> {
        if x_train.nrows() == 0 {
            return Err(ModelError::InsufficientData(0));
        }

        let dataset = Dataset::new(x_train.to_owned(), y_train.to_owned());
        let scaler = LinearScaler::standard()
            .fit(&dataset)
            .map_err(|e| ModelError::Fit(e.to_string()))?;
        let offsets = scaler.offsets().to_vec();
        let scales = scaler.scales().to_vec();

        let dataset = scaler.transform(dataset);
        let ridge = ElasticNet::ridge()
            .penalty(RIDGE_PENALTY)
            .fit(&dataset)
            .map_err(|e| ModelError::Fit(e.to_string()))?;

        Ok(Self {
            lags,
            offsets,
            scales,
            weights: ridge.hyperplane().to_vec(),
            intercept: ridge.intercept(),
        })
    }

    /// Predict from a lag window ordered most recent first.
    pub fn predict(&self, window: &[f64]) -> Result<f64, ModelError> {
        if window.len() != self.weights.len() {
            return Err(ModelError::FeatureLength {
                got: window.len(),
                expected: self.weights.len(),
            });
        }

        let scaled = window
            .iter()
            .zip(&self.offsets)
            .zip(&self.scales)
            .map(|((x, offset), scale)| (x - offset) / scale);
        Ok(self.intercept + scaled.zip(&self.weights).map(|(z, w)| z * w).sum::<f64>())
    }

    /// Row-wise prediction over a feature matrix.
    pub fn predict_batch(&self, x: &Array2<f64>) -> Result<Vec<f64>, ModelError> {
        x.rows()
            .into_iter()
            .map(|row| self.predict(&row.to_vec()))
            .collect()
    }
}

/// The sole reported quality metric, computed on the held-out split.
pub fn mean_absolute_error(predictions: &[f64], truth: &[f64]) -> f64 {
    if predictions.is_empty() || predictions.len() != truth.len() {
        return f64::NAN;
    }
    predictions
        .iter()
        .zip(truth)
        .map(|(p, t)| (p - t).abs())
        .sum::<f64>()
        / predictions.len() as f64
}
