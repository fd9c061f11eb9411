//! The form's interaction handler.
//!
//! Every user action is a pure step `(Session, Action) -> (Session, Page)`:
//!
//! ```text
//! idle --predict--> result shown --(next action)--> idle
//! idle --reset----> idle (controls cleared)
//! show history: read-only overlay, no transition
//! ```

use std::sync::Arc;

use pcos_model::{ModelBundle, ModelError, Prediction};
use serde::Serialize;

use crate::chart::importance_ranking;
use crate::normalize::{normalize, FieldError, NormalizedInput, RawInputs};
use crate::predict::predict;
use crate::present::{format_percent, present, Outcome};
use crate::render::render_page;
use crate::schema::FeatureSchema;
use crate::session::{HistoryEntry, Session};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Redraw the form from the session as it is.
    View,
    /// Keep edited control values and redraw, without predicting.
    Update(RawInputs),
    Predict(RawInputs),
    Reset,
    /// Show the history table; control values on the page are kept.
    ShowHistory(RawInputs),
}

/// What to show after an action. Rendering reads the session for control
/// values and history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub errors: Vec<FieldError>,
    pub outcome: Option<Outcome>,
    /// Classifier failure, shown as-is.
    pub failure: Option<String>,
    /// Ascending (label, score) pairs; empty when the model has none.
    pub importance: Vec<(String, f64)>,
    pub show_history: bool,
    pub notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub session: Session,
    pub page: Page,
}

/// Full result of one prediction, shared by the page, the JSON API and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub normalized: NormalizedInput,
    pub prediction: Prediction,
    pub outcome: Outcome,
}

pub struct FormController {
    bundle: Arc<ModelBundle>,
    schema: FeatureSchema,
}

impl FormController {
    pub fn new(bundle: Arc<ModelBundle>) -> Self {
        let schema = FeatureSchema::from_bundle(&bundle);
        Self { bundle, schema }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    /// Normalize, classify and present one set of raw values.
    pub fn evaluate(&self, raw: &RawInputs) -> Result<Evaluation, ModelError> {
        let normalized = normalize(&self.schema, raw);
        let prediction = predict(self.bundle.classifier(), &normalized.input)?;
        let outcome = present(&prediction, &self.bundle.metadata);
        Ok(Evaluation {
            normalized,
            prediction,
            outcome,
        })
    }

    /// Importance ranking for the chart, if the model exposes scores.
    pub fn importance(&self) -> Vec<(String, f64)> {
        self.bundle
            .classifier()
            .feature_importances()
            .map(|scores| importance_ranking(&self.schema, &scores))
            .unwrap_or_default()
    }

    pub fn handle(&self, mut session: Session, action: Action) -> Interaction {
        let mut page = Page::default();
        match action {
            Action::View => {}
            Action::Update(raw) => {
                session.remember_inputs(&self.schema, &raw);
            }
            Action::Predict(raw) => {
                session.remember_inputs(&self.schema, &raw);
                match self.evaluate(&raw) {
                    Ok(evaluation) => {
                        let probabilities = evaluation.prediction.probabilities;
                        session.record(HistoryEntry {
                            label: evaluation.outcome.class_name.clone(),
                            prob_negative: format_percent(probabilities.negative()),
                            prob_positive: format_percent(probabilities.positive()),
                            inputs: evaluation.normalized.input,
                        });
                        log::info!(
                            "prediction {} ({})",
                            evaluation.outcome.class_name,
                            format_percent(evaluation.outcome.probability)
                        );
                        page.errors = evaluation.normalized.errors;
                        page.outcome = Some(evaluation.outcome);
                        page.importance = self.importance();
                    }
                    Err(err) => {
                        log::error!("prediction failed: {err}");
                        page.errors = normalize(&self.schema, &raw).errors;
                        page.failure = Some(err.to_string());
                    }
                }
            }
            Action::Reset => {
                session.reset(&self.schema);
                page.notice = Some("All inputs have been cleared.".to_string());
            }
            Action::ShowHistory(raw) => {
                session.remember_inputs(&self.schema, &raw);
                page.show_history = true;
            }
        }
        Interaction { session, page }
    }

    pub fn render(&self, interaction: &Interaction) -> String {
        render_page(
            &self.schema,
            &self.bundle.metadata,
            &interaction.page,
            &interaction.session,
        )
    }
}
