//! Flood risk assessment models

use serde::{Deserialize, Serialize};

/// Result of running a rainfall measurement through the fitted classifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    /// Caller-supplied rainfall, echoed back unmodified
    pub rainfall_mm: f64,
    pub flood_prediction: bool,
    /// Positive-class probability, rounded to 2 decimal places
    pub flood_probability: f64,
}
