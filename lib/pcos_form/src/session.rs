//! Per-user interaction state: control values and prediction history.

use serde::Serialize;

use crate::normalize::{FeatureInput, RawInputs};
use crate::schema::FeatureSchema;

/// One past prediction as shown in the history table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub label: String,
    pub prob_negative: String,
    pub prob_positive: String,
    pub inputs: FeatureInput,
}

/// State owned by one user. Handlers take it by value and hand it back, so
/// nothing outside the session can mutate it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Session {
    inputs: RawInputs,
    history: Vec<HistoryEntry>,
    generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inputs(&self) -> &RawInputs {
        &self.inputs
    }

    /// Current control value, blank when never entered or after a reset.
    pub fn raw_value(&self, feature: &str) -> &str {
        self.inputs.get(feature).map(String::as_str).unwrap_or("")
    }

    /// Keep the submitted control values for schema fields.
    pub fn remember_inputs(&mut self, schema: &FeatureSchema, raw: &RawInputs) {
        for name in schema.names() {
            match raw.get(name) {
                Some(value) => {
                    self.inputs.insert(name.to_string(), value.clone());
                }
                None => {
                    self.inputs.remove(name);
                }
            }
        }
    }

    /// Clear every schema field and bump the generation so controls are
    /// redrawn blank. History is untouched.
    pub fn reset(&mut self, schema: &FeatureSchema) {
        for name in schema.names() {
            self.inputs.remove(name);
        }
        self.generation += 1;
    }

    /// Incremented on every reset; part of each control's id.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn record(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
    }

    /// Oldest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }
}
