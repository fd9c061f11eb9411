//! The PCOS screening form: feature schema, input normalization, prediction,
//! result presentation, charts and per-session history.
//!
//! ```
//! use std::sync::Arc;
//! use pcos_form::{Action, FormController, Session};
//! use pcos_model::ModelBundle;
//!
//! let bundle = ModelBundle::from_json(r#"{
//!     "model": {"kind": "logistic", "coefficients": [0.3], "intercept": -9.0},
//!     "features": ["BMI"]
//! }"#).unwrap();
//! let controller = FormController::new(Arc::new(bundle));
//! let raw = [("BMI".to_string(), "34,2".to_string())].into_iter().collect();
//! let step = controller.handle(Session::new(), Action::Predict(raw));
//! assert_eq!(step.session.history().len(), 1);
//! let html = controller.render(&step);
//! assert!(html.contains("Prediction result"));
//! ```

pub mod chart;
pub mod controller;
pub mod normalize;
pub mod predict;
pub mod present;
pub mod render;
pub mod schema;
pub mod session;

pub use controller::{Action, Evaluation, FormController, Interaction, Page};
pub use normalize::{
    normalize, parse_numeric, FeatureInput, FeatureValue, FieldError, NormalizedInput, RawInputs,
};
pub use predict::predict;
pub use present::{format_percent, present, recommendation, Outcome, Tone, DISCLAIMER};
pub use schema::{FeatureSchema, FieldKind, FieldSpec};
pub use session::{HistoryEntry, Session};
