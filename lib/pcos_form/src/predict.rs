use pcos_model::{Classifier, ModelError, Prediction};

use crate::normalize::FeatureInput;

/// Run the classifier once for a normalized input.
///
/// The row is built a single time and both the label and the probability
/// pair are computed from that same row.
pub fn predict(
    classifier: &dyn Classifier,
    input: &FeatureInput,
) -> Result<Prediction, ModelError> {
    let row = input.row();
    let label = classifier.predict(&row)?;
    let probabilities = classifier.predict_proba(&row)?;
    log::debug!(
        "{} classifier: label={label:?} proba={:?}",
        classifier.kind(),
        probabilities.as_array()
    );
    Ok(Prediction {
        label,
        probabilities,
    })
}
