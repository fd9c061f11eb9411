//! Feature schema: which control each feature gets and how it is labelled.

use pcos_model::{DeclaredKind, ModelBundle};
use serde::Serialize;

/// The control a feature is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text parsed as a decimal number.
    Numeric,
    /// `No` / `Yes` selector.
    Binary,
    /// `Regular` / `Irregular` menstrual cycle selector.
    Cycle,
}

const BINARY_OPTIONS: &[(&str, f64)] = &[("No", 0.0), ("Yes", 1.0)];
const CYCLE_OPTIONS: &[(&str, f64)] = &[("Regular", 0.0), ("Irregular", 1.0)];

const BINARY_PREFIXES: &[&str] = &["skindarkening", "weightgain", "hairgrowth"];

/// Lowercase with all whitespace removed, so `Skin darkening (Y/N)` and
/// `skin darkening(Y/N)` compare equal.
pub(crate) fn name_key(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl FieldKind {
    /// Pick the control for a feature from its name.
    pub fn infer(name: &str) -> Self {
        let key = name_key(name);
        if BINARY_PREFIXES.iter().any(|prefix| key.starts_with(prefix)) {
            FieldKind::Binary
        } else if key.starts_with("cycle(r/i)") {
            FieldKind::Cycle
        } else {
            FieldKind::Numeric
        }
    }

    /// Option labels and the value each maps to; empty for numeric fields.
    pub fn options(self) -> &'static [(&'static str, f64)] {
        match self {
            FieldKind::Numeric => &[],
            FieldKind::Binary => BINARY_OPTIONS,
            FieldKind::Cycle => CYCLE_OPTIONS,
        }
    }

    pub fn is_choice(self) -> bool {
        !self.options().is_empty()
    }

    /// Value of a selected option. An empty selection means the first
    /// option; labels match case-insensitively and the option codes
    /// (`0`, `1`) are accepted as well.
    pub fn choice_value(self, choice: &str) -> Option<f64> {
        let options = self.options();
        let choice = choice.trim();
        if choice.is_empty() {
            return options.first().map(|(_, value)| *value);
        }
        if let Some((_, value)) = options
            .iter()
            .find(|(label, _)| label.eq_ignore_ascii_case(choice))
        {
            return Some(*value);
        }
        let code: f64 = choice.parse().ok()?;
        options
            .iter()
            .find(|(_, value)| *value == code)
            .map(|(_, value)| *value)
    }

    /// Label of the option holding `value`, used to show a stored choice.
    pub fn option_label(self, value: f64) -> Option<&'static str> {
        self.options()
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(label, _)| *label)
    }
}

impl From<DeclaredKind> for FieldKind {
    fn from(kind: DeclaredKind) -> Self {
        match kind {
            DeclaredKind::Numeric => FieldKind::Numeric,
            DeclaredKind::Binary => FieldKind::Binary,
            DeclaredKind::Cycle => FieldKind::Cycle,
        }
    }
}

/// Descriptive labels for the common columns of the PCOS dataset. Ranges
/// are documented to the user but not enforced.
const CATALOG: &[(&str, &str, &str)] = &[
    ("age(yrs)", "Age (years)", "Typical range 18-50"),
    ("weight(kg)", "Weight (kg)", "Typical range 35-120"),
    ("bmi", "Body mass index", "kg/m2, typical range 15-45"),
    (
        "cycle(r/i)",
        "Menstrual cycle",
        "Regular or irregular menstrual cycles",
    ),
    (
        "cyclelength(days)",
        "Menstrual bleeding length (days)",
        "Typical range 2-10",
    ),
    (
        "follicleno.(r)",
        "Follicle count, right ovary",
        "From ultrasound, typical range 0-20",
    ),
    (
        "follicleno.(l)",
        "Follicle count, left ovary",
        "From ultrasound, typical range 0-20",
    ),
    (
        "amh(ng/ml)",
        "Anti-Mullerian hormone (ng/mL)",
        "Typical range 1-10 ng/mL",
    ),
    ("lh(miu/ml)", "Luteinizing hormone (mIU/mL)", "Typical range 1-20"),
    (
        "fsh(miu/ml)",
        "Follicle-stimulating hormone (mIU/mL)",
        "Typical range 1-15",
    ),
    (
        "skindarkening(y/n)",
        "Skin darkening",
        "Dark, velvety patches on the neck, armpits or groin",
    ),
    (
        "hairgrowth(y/n)",
        "Excess hair growth",
        "Coarse hair on the face, chest or back",
    ),
    (
        "weightgain(y/n)",
        "Recent weight gain",
        "Noticeable weight gain over recent months",
    ),
    ("fastfood(y/n)", "Regular fast food", "1 = yes, 0 = no"),
    ("pimples(y/n)", "Acne / pimples", "1 = yes, 0 = no"),
    ("hairloss(y/n)", "Hair loss", "1 = yes, 0 = no"),
];

/// One input control of the form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    /// Feature name as the classifier knows it.
    pub name: String,
    pub label: String,
    pub help: Option<String>,
    pub kind: FieldKind,
}

impl FieldSpec {
    /// Field with label, help and kind derived from the name alone.
    pub fn from_name(name: &str) -> Self {
        let key = name_key(name);
        let entry = CATALOG.iter().find(|(k, _, _)| *k == key);
        Self {
            name: name.to_string(),
            label: entry
                .map(|(_, label, _)| label.to_string())
                .unwrap_or_else(|| name.to_string()),
            help: entry.map(|(_, _, help)| help.to_string()),
            kind: FieldKind::infer(name),
        }
    }
}

/// The ordered list of fields; order matches the classifier's columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSchema {
    fields: Vec<FieldSpec>,
}

impl FeatureSchema {
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            fields: names.iter().map(|n| FieldSpec::from_name(n.as_ref())).collect(),
        }
    }

    /// Schema for an artifact, applying its per-field overrides.
    pub fn from_bundle(bundle: &ModelBundle) -> Self {
        let mut schema = Self::from_names(bundle.features.as_slice());
        for field in &mut schema.fields {
            if let Some(hint) = bundle.field_override(&field.name) {
                if let Some(label) = &hint.label {
                    field.label = label.clone();
                }
                if let Some(help) = &hint.help {
                    field.help = Some(help.clone());
                }
                if let Some(kind) = hint.kind {
                    field.kind = kind.into();
                }
            }
        }
        schema
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn detects_binary_fields_any_casing() {
        for name in [
            "Skin darkening (Y/N)",
            "Weight gain(Y/N)",
            "hair growth(Y/N)",
            "Hair growth(Y/N)",
            "HAIR GROWTH (Y/N)",
        ] {
            assert_eq!(FieldKind::infer(name), FieldKind::Binary, "{name}");
        }
    }

    #[test]
    fn detects_cycle_but_not_cycle_length() {
        assert_eq!(FieldKind::infer("Cycle(R/I)"), FieldKind::Cycle);
        assert_eq!(FieldKind::infer("Cycle length(days)"), FieldKind::Numeric);
        assert_eq!(FieldKind::infer("BMI"), FieldKind::Numeric);
        assert_eq!(FieldKind::infer("Fast food (Y/N)"), FieldKind::Numeric);
    }

    #[test]
    fn choice_values() {
        assert_eq!(FieldKind::Binary.choice_value("Yes"), Some(1.0));
        assert_eq!(FieldKind::Binary.choice_value("no"), Some(0.0));
        assert_eq!(FieldKind::Binary.choice_value(""), Some(0.0));
        assert_eq!(FieldKind::Binary.choice_value("1"), Some(1.0));
        assert_eq!(FieldKind::Binary.choice_value("maybe"), None);
        assert_eq!(FieldKind::Binary.choice_value("2"), None);
        assert_eq!(FieldKind::Cycle.choice_value("Irregular"), Some(1.0));
        assert_eq!(FieldKind::Cycle.choice_value("Regular"), Some(0.0));
        assert_eq!(FieldKind::Cycle.option_label(1.0), Some("Irregular"));
        assert_eq!(FieldKind::Numeric.choice_value("Yes"), None);
    }

    #[test]
    fn catalog_labels_and_fallback() {
        let schema = FeatureSchema::from_names(&["Follicle No. (R)", "Mystery score"]);
        let fields = schema.fields();
        assert_eq!(fields[0].label, "Follicle count, right ovary");
        assert!(fields[0].help.as_deref().unwrap().contains("0-20"));
        assert_eq!(fields[1].label, "Mystery score");
        assert_eq!(fields[1].help, None);
        assert_eq!(schema.names().collect::<Vec<_>>(), vec!["Follicle No. (R)", "Mystery score"]);
    }

    #[test]
    fn bundle_overrides_apply() {
        let bundle = ModelBundle::from_json(
            r#"{
                "model": {"kind": "logistic", "coefficients": [0.1, 0.2], "intercept": 0.0},
                "features": ["Fast food (Y/N)", "BMI"],
                "fields": [
                    {"feature": "Fast food (Y/N)", "kind": "binary", "label": "Fast food"},
                    {"feature": "BMI", "help": "kg/m2"}
                ]
            }"#,
        )
        .unwrap();
        let schema = FeatureSchema::from_bundle(&bundle);
        let fast_food = schema.field("Fast food (Y/N)").unwrap();
        assert_eq!(fast_food.kind, FieldKind::Binary);
        assert_eq!(fast_food.label, "Fast food");
        let bmi = schema.field("BMI").unwrap();
        assert_eq!(bmi.label, "Body mass index");
        assert_eq!(bmi.help.as_deref(), Some("kg/m2"));
    }
}
