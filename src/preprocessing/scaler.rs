//! Single-variable target scaling

use crate::error::{ReportError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Type of scaling applied to a target variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalerType {
    /// Standard scaling (z-score normalization): (x - mean) / std
    Standard,
    /// Min-Max scaling: (x - min) / (max - min)
    MinMax,
    /// ln(1 + x); needs no fitting
    Log1p,
}

/// Parameters for a fitted scaler
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct ScalerParams {
    center: f64, // mean or min
    scale: f64,  // std or range
}

/// Scaler for one target variable, fitted on its training values.
///
/// Holdout reports use [`TargetScaler::inverse_transform`] to score
/// predictions on the original target scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetScaler {
    scaler_type: ScalerType,
    params: Option<ScalerParams>,
}

impl TargetScaler {
    pub fn new(scaler_type: ScalerType) -> Self {
        Self {
            scaler_type,
            params: None,
        }
    }

    pub fn scaler_type(&self) -> ScalerType {
        self.scaler_type
    }

    pub fn is_fitted(&self) -> bool {
        self.scaler_type == ScalerType::Log1p || self.params.is_some()
    }

    /// Fit the scaler to the data
    pub fn fit(&mut self, y: &Array1<f64>) -> Result<&mut Self> {
        if y.is_empty() {
            return Err(ReportError::DataError("cannot fit a scaler on no values".to_string()));
        }

        self.params = match self.scaler_type {
            ScalerType::Standard => {
                let mean = y.mean().unwrap_or(0.0);
                let std = if y.len() > 1 { y.std(1.0) } else { 0.0 };
                Some(ScalerParams {
                    center: mean,
                    scale: if std == 0.0 { 1.0 } else { std },
                })
            }
            ScalerType::MinMax => {
                let min = y.iter().copied().fold(f64::INFINITY, f64::min);
                let max = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let range = max - min;
                Some(ScalerParams {
                    center: min,
                    scale: if range == 0.0 { 1.0 } else { range },
                })
            }
            ScalerType::Log1p => {
                if y.iter().any(|&v| v <= -1.0) {
                    return Err(ReportError::DataError(
                        "log1p scaling needs values greater than -1".to_string(),
                    ));
                }
                None
            }
        };
        Ok(self)
    }

    pub fn fit_transform(&mut self, y: &Array1<f64>) -> Result<Array1<f64>> {
        self.fit(y)?;
        self.transform(y)
    }

    pub fn transform(&self, y: &Array1<f64>) -> Result<Array1<f64>> {
        match (self.scaler_type, self.params) {
            (ScalerType::Log1p, _) => Ok(y.mapv(f64::ln_1p)),
            (_, Some(p)) => Ok(y.mapv(|v| (v - p.center) / p.scale)),
            (_, None) => Err(ReportError::ModelNotFitted),
        }
    }

    /// Map scaled values back to the original scale
    pub fn inverse_transform(&self, y: &Array1<f64>) -> Result<Array1<f64>> {
        match (self.scaler_type, self.params) {
            (ScalerType::Log1p, _) => Ok(y.mapv(f64::exp_m1)),
            (_, Some(p)) => Ok(y.mapv(|v| v * p.scale + p.center)),
            (_, None) => Err(ReportError::ModelNotFitted),
        }
    }
}
