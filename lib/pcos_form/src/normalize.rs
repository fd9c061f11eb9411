//! Turning raw control values into the classifier's feature vector.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::schema::{FeatureSchema, FieldKind};

/// Raw control values keyed by feature name, exactly as entered.
pub type RawInputs = BTreeMap<String, String>;

/// A value the user entered that could not be used as-is. The field falls
/// back to `0.0` and the rest of the form is unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldError {
    #[error("{label}: '{raw}' is not a valid number, using 0.00")]
    InvalidNumber {
        feature: String,
        label: String,
        raw: String,
    },
    #[error("{label}: '{raw}' is not one of {options}, using {fallback}")]
    UnknownOption {
        feature: String,
        label: String,
        raw: String,
        options: String,
        fallback: String,
    },
}

impl FieldError {
    pub fn feature(&self) -> &str {
        match self {
            FieldError::InvalidNumber { feature, .. } => feature,
            FieldError::UnknownOption { feature, .. } => feature,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureValue {
    pub name: String,
    pub value: f64,
}

/// Normalized values in schema order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct FeatureInput {
    values: Vec<FeatureValue>,
}

impl FeatureInput {
    /// The row handed to the classifier.
    pub fn row(&self) -> Vec<f64> {
        self.values.iter().map(|v| v.value).collect()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.iter().find(|v| v.name == name).map(|v| v.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureValue> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedInput {
    pub input: FeatureInput,
    pub errors: Vec<FieldError>,
}

impl NormalizedInput {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse a decimal number written with either `.` or `,` as separator.
/// Blank input reads as `0.0`; anything unparsable or non-finite is `None`.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    let value: f64 = trimmed.replace(',', ".").parse().ok()?;
    value.is_finite().then_some(value)
}

/// Build the feature vector for every schema field, in schema order.
///
/// Missing entries count as blank. Bad values are reported and replaced by
/// `0.0` without stopping the remaining fields.
pub fn normalize(schema: &FeatureSchema, raw: &RawInputs) -> NormalizedInput {
    let mut values = Vec::with_capacity(schema.len());
    let mut errors = Vec::new();

    for field in schema.fields() {
        let entered = raw.get(&field.name).map(String::as_str).unwrap_or("");
        let value = match field.kind {
            FieldKind::Numeric => parse_numeric(entered).unwrap_or_else(|| {
                errors.push(FieldError::InvalidNumber {
                    feature: field.name.clone(),
                    label: field.label.clone(),
                    raw: entered.to_string(),
                });
                0.0
            }),
            kind => kind.choice_value(entered).unwrap_or_else(|| {
                let options = kind.options();
                errors.push(FieldError::UnknownOption {
                    feature: field.name.clone(),
                    label: field.label.clone(),
                    raw: entered.to_string(),
                    options: options
                        .iter()
                        .map(|(label, _)| *label)
                        .collect::<Vec<_>>()
                        .join(" / "),
                    fallback: options[0].0.to_string(),
                });
                options[0].1
            }),
        };
        values.push(FeatureValue {
            name: field.name.clone(),
            value,
        });
    }

    if !errors.is_empty() {
        log::debug!("normalized input with {} field error(s)", errors.len());
    }

    NormalizedInput {
        input: FeatureInput { values },
        errors,
    }
}
