//! Concrete classifier backends and the serialized model description.

pub mod forest;
pub mod logistic;

use serde::{Deserialize, Serialize};

use crate::classifier::{ClassLabel, ClassProbabilities, Classifier};
use crate::error::ModelError;

pub use forest::{DecisionTree, RandomForest};
pub use logistic::LogisticModel;

/// A classifier as stored in the artifact, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    RandomForest(RandomForest),
    Logistic(LogisticModel),
}

impl ModelSpec {
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            ModelSpec::RandomForest(m) => m.validate(),
            ModelSpec::Logistic(m) => m.validate(),
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            ModelSpec::RandomForest(m) => m,
            ModelSpec::Logistic(m) => m,
        }
    }
}

impl Classifier for ModelSpec {
    fn kind(&self) -> &str {
        self.inner().kind()
    }

    fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn predict(&self, row: &[f64]) -> Result<ClassLabel, ModelError> {
        self.inner().predict(row)
    }

    fn predict_proba(&self, row: &[f64]) -> Result<ClassProbabilities, ModelError> {
        self.inner().predict_proba(row)
    }

    fn feature_importances(&self) -> Option<Vec<f64>> {
        self.inner().feature_importances()
    }
}
