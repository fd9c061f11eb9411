//! The model artifact: a trained classifier plus the ordered feature schema
//! it was trained on, loaded once at startup.

use std::collections::HashSet;
use std::fs::read_to_string;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::backends::ModelSpec;
use crate::classifier::Classifier;
use crate::error::ModelError;

/// How the artifact asks a field to be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredKind {
    Numeric,
    Binary,
    Cycle,
}

/// Display hints for one feature, keyed by feature name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldOverride {
    pub feature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Free text shown under the control, typically the expected range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<DeclaredKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleMetadata {
    pub name: String,
    pub description: Option<String>,
    pub positive_class: String,
    pub negative_class: String,
}

impl Default for BundleMetadata {
    fn default() -> Self {
        Self {
            name: "PCOS Prediction with Random Forest".to_string(),
            description: None,
            positive_class: "PCOS".to_string(),
            negative_class: "Not PCOS".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub model: ModelSpec,
    /// Column order the classifier expects.
    pub features: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldOverride>,
    #[serde(default)]
    pub metadata: BundleMetadata,
}

impl ModelBundle {
    /// Parse and validate an artifact from its JSON text.
    pub fn from_json(text: &str) -> Result<Self, ModelError> {
        let bundle: ModelBundle = serde_json::from_str(text)?;
        bundle.validate()?;
        Ok(bundle)
    }

    /// Read, parse and validate an artifact file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let text = read_to_string(path)?;
        let bundle = Self::from_json(&text)?;
        log::info!(
            "loaded {} model from {} ({} features)",
            bundle.model.kind(),
            path.display(),
            bundle.features.len()
        );
        Ok(bundle)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.features.is_empty() {
            return Err(ModelError::artifact("feature list is empty"));
        }
        let mut seen = HashSet::new();
        for name in &self.features {
            if name.trim().is_empty() {
                return Err(ModelError::artifact("feature names must not be blank"));
            }
            if !seen.insert(name.as_str()) {
                return Err(ModelError::artifact(format!("duplicate feature '{name}'")));
            }
        }
        self.model.validate()?;
        if self.model.n_features() != self.features.len() {
            return Err(ModelError::artifact(format!(
                "model expects {} features but the schema lists {}",
                self.model.n_features(),
                self.features.len()
            )));
        }
        for field in &self.fields {
            if !seen.contains(field.feature.as_str()) {
                return Err(ModelError::artifact(format!(
                    "field override for unknown feature '{}'",
                    field.feature
                )));
            }
        }
        Ok(())
    }

    pub fn classifier(&self) -> &dyn Classifier {
        &self.model
    }

    pub fn field_override(&self, feature: &str) -> Option<&FieldOverride> {
        self.fields.iter().find(|f| f.feature == feature)
    }
}

pub fn load_bundle(path: impl AsRef<Path>) -> Result<ModelBundle, ModelError> {
    ModelBundle::load(path)
}
