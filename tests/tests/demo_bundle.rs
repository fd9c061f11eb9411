use approx::assert_abs_diff_eq;
use pcos_form::{normalize, FieldKind, FormController, RawInputs};
use pcos_model::{ClassLabel, Classifier};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;
use tests::demo_bundle;

fn raw(pairs: &[(&str, &str)]) -> RawInputs {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn controller() -> FormController {
    FormController::new(Arc::new(demo_bundle().expect("demo bundle loads")))
}

#[test]
fn demo_bundle_is_valid() {
    let bundle = demo_bundle().unwrap();
    assert_eq!(bundle.features.len(), 10);
    assert_eq!(bundle.classifier().kind(), "random_forest");
    assert_eq!(bundle.classifier().n_features(), 10);
    assert!(bundle.validate().is_ok());
}

#[test]
fn demo_schema_uses_expected_controls() {
    let controller = controller();
    let schema = controller.schema();
    assert_eq!(schema.field("Follicle No. (R)").unwrap().kind, FieldKind::Numeric);
    assert_eq!(schema.field("Skin darkening (Y/N)").unwrap().kind, FieldKind::Binary);
    // lowercase spelling still gets a selector
    assert_eq!(schema.field("hair growth(Y/N)").unwrap().kind, FieldKind::Binary);
    assert_eq!(schema.field("Cycle(R/I)").unwrap().kind, FieldKind::Cycle);
    // declared by the artifact
    let fast_food = schema.field("Fast food (Y/N)").unwrap();
    assert_eq!(fast_food.kind, FieldKind::Binary);
    assert_eq!(fast_food.label, "Regular fast food");
}

#[test]
fn blank_form_predicts_negative() {
    let evaluation = controller().evaluate(&RawInputs::new()).unwrap();
    assert_eq!(evaluation.prediction.label, ClassLabel::Negative);
    assert_abs_diff_eq!(
        evaluation.prediction.probabilities.positive(),
        0.080534,
        epsilon = 1e-6
    );
    assert_eq!(
        evaluation.outcome.headline,
        "Prediction result: Not PCOS with probability 91.95%"
    );
    assert!(evaluation.normalized.is_clean());
}

#[test]
fn typical_positive_profile() {
    let inputs = raw(&[
        ("Follicle No. (R)", "14"),
        ("Follicle No. (L)", "13"),
        ("Skin darkening (Y/N)", "Yes"),
        ("hair growth(Y/N)", "Yes"),
        ("Weight gain(Y/N)", "Yes"),
        ("Cycle(R/I)", "Irregular"),
        ("AMH(ng/mL)", "7,5"),
        ("Fast food (Y/N)", "Yes"),
        ("Pimples(Y/N)", "Yes"),
        ("BMI", "31.2"),
    ]);
    let evaluation = controller().evaluate(&inputs).unwrap();
    assert_eq!(evaluation.prediction.label, ClassLabel::Positive);
    assert_eq!(evaluation.outcome.class_name, "PCOS");
    assert_eq!(
        evaluation.outcome.headline,
        "Prediction result: PCOS with probability 87.34%"
    );
    assert_eq!(
        evaluation.normalized.input.row(),
        vec![14.0, 13.0, 1.0, 1.0, 1.0, 1.0, 7.5, 1.0, 1.0, 31.2]
    );
}

#[test]
fn importance_ranking_puts_follicles_on_top() {
    let ranking = controller().importance();
    assert_eq!(ranking.len(), 10);
    let top: Vec<&str> = ranking.iter().rev().take(2).map(|(l, _)| l.as_str()).collect();
    assert_eq!(top, vec!["Follicle count, right ovary", "Follicle count, left ovary"]);
    let total: f64 = ranking.iter().map(|(_, s)| s).sum();
    assert_abs_diff_eq!(total, 1.0, epsilon = 1e-9);
    assert!(ranking.windows(2).all(|w| w[0].1 <= w[1].1));
}

proptest! {
    #[test]
    fn demo_probabilities_are_well_formed(
        follicles_r in 0u32..30,
        follicles_l in 0u32..30,
        bmi in 12.0f64..50.0,
        cycle in prop::sample::select(vec!["Regular", "Irregular", ""]),
    ) {
        let controller = controller();
        let inputs = raw(&[
            ("Follicle No. (R)", &follicles_r.to_string()),
            ("Follicle No. (L)", &follicles_l.to_string()),
            ("BMI", &format!("{bmi:.2}")),
            ("Cycle(R/I)", cycle),
        ]);
        let normalized = normalize(controller.schema(), &inputs);
        prop_assert!(normalized.is_clean());
        let evaluation = controller.evaluate(&inputs).unwrap();
        let p = evaluation.prediction.probabilities;
        prop_assert!((p.negative() + p.positive() - 1.0).abs() < 1e-9);
        prop_assert_eq!(evaluation.prediction.label, p.argmax());
    }
}
