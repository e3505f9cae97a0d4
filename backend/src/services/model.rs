//! Fitted flood-risk model: a standard scaler plus a logistic-regression
//! classifier, loaded once at startup from a JSON artifact and shared
//! read-only across requests.

use std::path::Path;

use serde::Deserialize;
use shared::RiskAssessment;

use crate::error::{AppError, AppResult};

/// Feature name the artifact must have been fitted on. A mismatch is a
/// deployment error and is rejected at load time, before serving.
const FEATURE_NAME: &str = "rainfall_mm";

/// Serialized form of the fitted artifact (external contract)
#[derive(Debug, Clone, Deserialize)]
pub struct FloodModelArtifact {
    pub feature_names: Vec<String>,
    pub scaler: ScalerParams,
    pub classifier: ClassifierParams,
}

/// Fitted standard-scaler parameters, one entry per feature
#[derive(Debug, Clone, Deserialize)]
pub struct ScalerParams {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Fitted logistic-regression parameters
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierParams {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Validated, ready-to-serve flood model
#[derive(Debug, Clone)]
pub struct FloodModel {
    mean: f64,
    scale: f64,
    coefficient: f64,
    intercept: f64,
}

impl FloodModel {
    /// Load and validate the artifact from disk. Any shape problem is
    /// fatal here so the process refuses to start with a bad model.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!(
                "Failed to read model artifact {}: {}",
                path.display(),
                e
            ))
        })?;

        let artifact: FloodModelArtifact = serde_json::from_str(&raw).map_err(|e| {
            AppError::Configuration(format!(
                "Failed to parse model artifact {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_artifact(artifact)
    }

    /// Validate an artifact against the single-feature contract.
    pub fn from_artifact(artifact: FloodModelArtifact) -> AppResult<Self> {
        if artifact.feature_names.as_slice() != [FEATURE_NAME] {
            return Err(AppError::Configuration(format!(
                "Model artifact fitted on {:?}, expected [{:?}]",
                artifact.feature_names, FEATURE_NAME
            )));
        }
        if artifact.scaler.mean.len() != 1 || artifact.scaler.scale.len() != 1 {
            return Err(AppError::Configuration(
                "Scaler parameters must have exactly one entry per feature".to_string(),
            ));
        }
        if artifact.classifier.coefficients.len() != 1 {
            return Err(AppError::Configuration(
                "Classifier must have exactly one coefficient".to_string(),
            ));
        }

        let scale = artifact.scaler.scale[0];
        if !scale.is_finite() || scale == 0.0 {
            return Err(AppError::Configuration(format!(
                "Scaler scale must be finite and non-zero, got {}",
                scale
            )));
        }

        Ok(Self {
            mean: artifact.scaler.mean[0],
            scale,
            coefficient: artifact.classifier.coefficients[0],
            intercept: artifact.classifier.intercept,
        })
    }

    /// Run a rainfall measurement through the scaler and classifier.
    ///
    /// Deterministic for a given artifact. No input-range validation:
    /// negative or implausible values pass straight through. The
    /// prediction uses the unrounded probability against the 0.5
    /// decision threshold; the reported probability is rounded to
    /// 2 decimal places.
    pub fn assess(&self, rainfall_mm: f64) -> AppResult<RiskAssessment> {
        let scaled = (rainfall_mm - self.mean) / self.scale;
        let probability = sigmoid(self.coefficient * scaled + self.intercept);

        if !probability.is_finite() {
            return Err(AppError::ModelInference(format!(
                "Non-finite probability for rainfall {}",
                rainfall_mm
            )));
        }

        Ok(RiskAssessment {
            rainfall_mm,
            flood_prediction: probability >= 0.5,
            flood_probability: round2(probability),
        })
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> FloodModelArtifact {
        FloodModelArtifact {
            feature_names: vec![FEATURE_NAME.to_string()],
            scaler: ScalerParams {
                mean: vec![92.4],
                scale: vec![61.8],
            },
            classifier: ClassifierParams {
                coefficients: vec![3.2],
                intercept: -0.8,
            },
        }
    }

    #[test]
    fn test_sigmoid_bounds() {
        assert!(sigmoid(-50.0) >= 0.0);
        assert!(sigmoid(50.0) <= 1.0);
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.004), 0.0);
        assert_eq!(round2(0.005), 0.01);
        assert_eq!(round2(0.996), 1.0);
    }

    #[test]
    fn test_feature_name_mismatch_rejected() {
        let mut bad = artifact();
        bad.feature_names = vec!["rain".to_string()];
        assert!(matches!(
            FloodModel::from_artifact(bad),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let mut bad = artifact();
        bad.scaler.mean = vec![1.0, 2.0];
        bad.scaler.scale = vec![1.0, 2.0];
        assert!(FloodModel::from_artifact(bad).is_err());
    }

    #[test]
    fn test_zero_scale_rejected() {
        let mut bad = artifact();
        bad.scaler.scale = vec![0.0];
        assert!(FloodModel::from_artifact(bad).is_err());
    }

    #[test]
    fn test_zero_rainfall_is_low_risk() {
        let model = FloodModel::from_artifact(artifact()).unwrap();
        let result = model.assess(0.0).unwrap();
        assert!(!result.flood_prediction);
        assert!(result.flood_probability < 0.05);
    }

    #[test]
    fn test_heavy_rainfall_is_high_risk() {
        let model = FloodModel::from_artifact(artifact()).unwrap();
        let result = model.assess(300.0).unwrap();
        assert!(result.flood_prediction);
        assert!(result.flood_probability > 0.95);
    }
}
