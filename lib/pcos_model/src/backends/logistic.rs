//! Logistic regression backend: `P(positive) = sigmoid(w·x + b)`.

use serde::{Deserialize, Serialize};

use crate::classifier::{check_row, ClassLabel, ClassProbabilities, Classifier};
use crate::error::ModelError;

fn default_threshold() -> f64 {
    0.5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Decision threshold on `P(positive)`.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl LogisticModel {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
            threshold: default_threshold(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.coefficients.is_empty() {
            return Err(ModelError::artifact("logistic model has no coefficients"));
        }
        if self.coefficients.iter().any(|w| !w.is_finite()) || !self.intercept.is_finite() {
            return Err(ModelError::artifact(
                "logistic parameters must be finite",
            ));
        }
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(ModelError::artifact(format!(
                "decision threshold {} outside (0, 1)",
                self.threshold
            )));
        }
        Ok(())
    }

    fn positive_probability(&self, row: &[f64]) -> f64 {
        let z: f64 = self
            .coefficients
            .iter()
            .zip(row.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;
        1.0 / (1.0 + (-z).exp())
    }
}

impl Classifier for LogisticModel {
    fn kind(&self) -> &str {
        "logistic"
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, row: &[f64]) -> Result<ClassLabel, ModelError> {
        check_row(self.n_features(), row)?;
        if self.positive_probability(row) >= self.threshold {
            Ok(ClassLabel::Positive)
        } else {
            Ok(ClassLabel::Negative)
        }
    }

    fn predict_proba(&self, row: &[f64]) -> Result<ClassProbabilities, ModelError> {
        check_row(self.n_features(), row)?;
        ClassProbabilities::from_positive(self.positive_probability(row))
    }
}
