//! One-shot commands that load a bundle and print to stdout.

use std::io::Write;
use std::sync::Arc;

use clap::Args;
use pcos_form::{format_percent, FormController, RawInputs};
use pcos_model::{load_bundle, ModelBundle};
use serde::Serialize;

use crate::config::ModelArgs;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    fn from_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Text
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct PredictArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Feature value, repeatable: --set "BMI=27,4"
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub values: Vec<String>,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct InspectReport<'a> {
    name: &'a str,
    model: &'a str,
    features: usize,
    fields: &'a [pcos_form::FieldSpec],
    importance: Vec<(String, f64)>,
}

pub fn load_controller(args: &ModelArgs) -> Result<FormController, AppError> {
    let bundle = load_bundle(&args.model)?;
    Ok(FormController::new(Arc::new(bundle)))
}

pub fn inspect(args: &InspectArgs, out: &mut impl Write) -> Result<(), AppError> {
    let controller = load_controller(&args.model)?;
    write_inspect(&controller, OutputMode::from_flag(args.json), out)
}

pub fn write_inspect(
    controller: &FormController,
    mode: OutputMode,
    out: &mut impl Write,
) -> Result<(), AppError> {
    let bundle: &ModelBundle = controller.bundle();
    let report = InspectReport {
        name: &bundle.metadata.name,
        model: bundle.classifier().kind(),
        features: controller.schema().len(),
        fields: controller.schema().fields(),
        importance: controller.importance(),
    };
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        }
        OutputMode::Text => {
            writeln!(out, "{} ({} model)", report.name, report.model)?;
            writeln!(out, "{} features:", report.features)?;
            for field in report.fields {
                writeln!(out, "  {:<28} {:?}  {}", field.name, field.kind, field.label)?;
            }
            if !report.importance.is_empty() {
                writeln!(out, "importance:")?;
                for (label, score) in report.importance.iter().rev() {
                    writeln!(out, "  {label:<28} {score:.4}")?;
                }
            }
        }
    }
    Ok(())
}

/// Parse `NAME=VALUE` assignments against the schema's feature names.
pub fn parse_assignments(
    controller: &FormController,
    values: &[String],
) -> Result<RawInputs, AppError> {
    let mut raw = RawInputs::new();
    for assignment in values {
        let (name, value) = assignment
            .split_once('=')
            .ok_or_else(|| AppError::Assignment(assignment.clone()))?;
        let name = name.trim();
        if controller.schema().field(name).is_none() {
            return Err(AppError::UnknownFeature(name.to_string()));
        }
        raw.insert(name.to_string(), value.to_string());
    }
    Ok(raw)
}

pub fn predict(args: &PredictArgs, out: &mut impl Write) -> Result<(), AppError> {
    let controller = load_controller(&args.model)?;
    write_prediction(
        &controller,
        &args.values,
        OutputMode::from_flag(args.json),
        out,
    )
}

pub fn write_prediction(
    controller: &FormController,
    values: &[String],
    mode: OutputMode,
    out: &mut impl Write,
) -> Result<(), AppError> {
    let raw = parse_assignments(controller, values)?;
    let evaluation = controller.evaluate(&raw)?;
    for error in &evaluation.normalized.errors {
        log::warn!("{error}");
    }
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, &evaluation)?;
            writeln!(out)?;
        }
        OutputMode::Text => {
            let outcome = &evaluation.outcome;
            let metadata = &controller.bundle().metadata;
            writeln!(out, "{}", outcome.headline)?;
            writeln!(
                out,
                "  {}: {}",
                metadata.negative_class,
                format_percent(outcome.probabilities.negative())
            )?;
            writeln!(
                out,
                "  {}: {}",
                metadata.positive_class,
                format_percent(outcome.probabilities.positive())
            )?;
            writeln!(out, "{}", outcome.recommendation)?;
            writeln!(out, "{}", outcome.disclaimer)?;
        }
    }
    Ok(())
}
