//! Fixed mapping from a prediction to what the user reads.

use pcos_model::{BundleMetadata, ClassLabel, ClassProbabilities, Prediction};
use serde::Serialize;

pub const DISCLAIMER: &str = "This result comes from a statistical model and is not a medical \
     diagnosis. Always consult a qualified healthcare professional.";

const POSITIVE_ADVICE: &str = "Consult an obstetrician-gynecologist or an endocrinologist for \
     further examination and to confirm the diagnosis.";

const NEGATIVE_ADVICE: &str = "Keep up a healthy lifestyle with balanced meals and regular \
     exercise, and continue routine health check-ups.";

/// Banner style of a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Success,
    Warning,
}

/// Probability as a percentage with two decimals, e.g. `0.8734` -> `87.34%`.
pub fn format_percent(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

/// Next-step advice for a predicted class.
pub fn recommendation(label: ClassLabel) -> &'static str {
    match label {
        ClassLabel::Positive => POSITIVE_ADVICE,
        ClassLabel::Negative => NEGATIVE_ADVICE,
    }
}

/// Display name of a class as configured by the artifact.
pub fn class_name(metadata: &BundleMetadata, label: ClassLabel) -> &str {
    match label {
        ClassLabel::Positive => &metadata.positive_class,
        ClassLabel::Negative => &metadata.negative_class,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub label: ClassLabel,
    pub class_name: String,
    pub tone: Tone,
    /// Probability of the predicted class.
    pub probability: f64,
    pub headline: String,
    pub recommendation: &'static str,
    pub disclaimer: &'static str,
    pub probabilities: ClassProbabilities,
}

pub fn present(prediction: &Prediction, metadata: &BundleMetadata) -> Outcome {
    let label = prediction.label;
    let probability = prediction.probabilities.of(label);
    let name = class_name(metadata, label).to_string();
    let tone = match label {
        ClassLabel::Positive => Tone::Warning,
        ClassLabel::Negative => Tone::Success,
    };
    Outcome {
        label,
        headline: format!(
            "Prediction result: {name} with probability {}",
            format_percent(probability)
        ),
        class_name: name,
        tone,
        probability,
        recommendation: recommendation(label),
        disclaimer: DISCLAIMER,
        probabilities: prediction.probabilities,
    }
}
