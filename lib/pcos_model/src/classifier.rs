//! The predictor seam: class labels, probability pairs and the `Classifier` trait.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Binary outcome of the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassLabel {
    Negative,
    Positive,
}

impl ClassLabel {
    /// Map a class index (0 = negative, 1 = positive) to a label.
    pub fn from_index(index: usize) -> Result<Self, ModelError> {
        match index {
            0 => Ok(ClassLabel::Negative),
            1 => Ok(ClassLabel::Positive),
            other => Err(ModelError::InvalidOutput(format!(
                "class index {other} is not a binary label"
            ))),
        }
    }

    pub fn index(self) -> usize {
        match self {
            ClassLabel::Negative => 0,
            ClassLabel::Positive => 1,
        }
    }
}

/// `[P(negative), P(positive)]`, always summing to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassProbabilities {
    negative: f64,
    positive: f64,
}

impl ClassProbabilities {
    /// Build a probability pair from raw, possibly unnormalized, class weights.
    pub fn new(negative: f64, positive: f64) -> Result<Self, ModelError> {
        if !negative.is_finite() || !positive.is_finite() {
            return Err(ModelError::InvalidOutput(format!(
                "non-finite class weights [{negative}, {positive}]"
            )));
        }
        if negative < 0.0 || positive < 0.0 {
            return Err(ModelError::InvalidOutput(format!(
                "negative class weights [{negative}, {positive}]"
            )));
        }
        let total = negative + positive;
        if total <= 0.0 {
            return Err(ModelError::InvalidOutput(
                "class weights sum to zero".to_string(),
            ));
        }
        let positive = (positive / total).clamp(0.0, 1.0);
        Ok(Self {
            negative: 1.0 - positive,
            positive,
        })
    }

    /// Build a pair from the positive-class probability alone.
    pub fn from_positive(positive: f64) -> Result<Self, ModelError> {
        if !(0.0..=1.0).contains(&positive) {
            return Err(ModelError::InvalidOutput(format!(
                "probability {positive} outside [0, 1]"
            )));
        }
        Self::new(1.0 - positive, positive)
    }

    pub fn negative(&self) -> f64 {
        self.negative
    }

    pub fn positive(&self) -> f64 {
        self.positive
    }

    pub fn of(&self, label: ClassLabel) -> f64 {
        match label {
            ClassLabel::Negative => self.negative,
            ClassLabel::Positive => self.positive,
        }
    }

    pub fn as_array(&self) -> [f64; 2] {
        [self.negative, self.positive]
    }

    /// Most likely class; a tie goes to the negative class.
    pub fn argmax(&self) -> ClassLabel {
        if self.positive > self.negative {
            ClassLabel::Positive
        } else {
            ClassLabel::Negative
        }
    }
}

/// One classifier invocation: the discrete label and the probability pair
/// computed from the same input row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub label: ClassLabel,
    pub probabilities: ClassProbabilities,
}

/// A trained binary classifier over a fixed-order numeric feature vector.
///
/// Implementations are read-only after loading and shared across sessions.
pub trait Classifier: Send + Sync {
    /// Backend identifier, e.g. `random_forest`.
    fn kind(&self) -> &str;

    /// Number of columns every input row must have.
    fn n_features(&self) -> usize;

    fn predict(&self, row: &[f64]) -> Result<ClassLabel, ModelError>;

    fn predict_proba(&self, row: &[f64]) -> Result<ClassProbabilities, ModelError>;

    /// Per-feature importance scores in column order, if the model has them.
    fn feature_importances(&self) -> Option<Vec<f64>> {
        None
    }
}

/// Reject rows whose width does not match the model.
pub fn check_row(expected: usize, row: &[f64]) -> Result<(), ModelError> {
    if row.len() != expected {
        return Err(ModelError::FeatureCount {
            expected,
            got: row.len(),
        });
    }
    Ok(())
}
