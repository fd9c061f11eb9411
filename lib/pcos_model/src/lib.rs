//! Model artifact support for the PCOS screening form.
//!
//! An artifact is a JSON document holding a trained binary classifier and the
//! ordered list of feature names used to build its input rows:
//!
//! ```
//! use pcos_model::{Classifier, ModelBundle};
//! let bundle = ModelBundle::from_json(r#"{
//!     "model": {"kind": "logistic", "coefficients": [1.0], "intercept": 0.0},
//!     "features": ["BMI"]
//! }"#).unwrap();
//! let p = bundle.classifier().predict_proba(&[0.0]).unwrap();
//! assert!((p.positive() - 0.5).abs() < 1e-12);
//! ```

pub mod backends;
pub mod bundle;
pub mod classifier;
pub mod error;

pub use backends::{DecisionTree, LogisticModel, ModelSpec, RandomForest};
pub use bundle::{load_bundle, BundleMetadata, DeclaredKind, FieldOverride, ModelBundle};
pub use classifier::{check_row, ClassLabel, ClassProbabilities, Classifier, Prediction};
pub use error::ModelError;
