//! HTML rendering of the form page.

use std::fmt::Write;

use pcos_model::BundleMetadata;

use crate::chart::{importance_chart_svg, probability_chart_svg};
use crate::controller::Page;
use crate::normalize::parse_numeric;
use crate::present::Tone;
use crate::schema::{FeatureSchema, FieldKind, FieldSpec};
use crate::session::Session;

const STYLE: &str = "body{font-family:sans-serif;max-width:760px;margin:2rem auto;\
padding:0 1rem;color:#222}\
label{display:block;font-weight:600;margin-top:.8rem}\
input,select{width:100%;padding:.35rem;box-sizing:border-box}\
small{color:#666}\
.alert{padding:.7rem 1rem;border-radius:4px;margin:.8rem 0}\
.success{background:#e6f4ea;color:#1e4620}\
.warning{background:#fff4e5;color:#663c00}\
.error{background:#fdecea;color:#611a15}\
.info{background:#e8f0fe;color:#174ea6}\
.actions{margin-top:1.2rem;display:flex;gap:.5rem}\
.disclaimer{font-style:italic;color:#555}\
table{border-collapse:collapse;font-size:.85rem;display:block;overflow-x:auto}\
th,td{border:1px solid #ccc;padding:.25rem .5rem;text-align:left}";

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// The complete HTML document for one page state.
pub fn render_page(
    schema: &FeatureSchema,
    metadata: &BundleMetadata,
    page: &Page,
    session: &Session,
) -> String {
    let title = escape_html(&metadata.name);
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{title}</title><style>{STYLE}</style></head><body><h1>{title}</h1>"
    );
    if let Some(description) = &metadata.description {
        let _ = write!(html, "<p>{}</p>", escape_html(description));
    }
    html.push_str("<p>Enter the following data to get a prediction:</p>");

    render_form(&mut html, schema, session);

    if let Some(notice) = &page.notice {
        let _ = write!(html, "<div class=\"alert info\">{}</div>", escape_html(notice));
    }
    for error in &page.errors {
        let _ = write!(
            html,
            "<div class=\"alert error\">Invalid input for {}</div>",
            escape_html(&error.to_string())
        );
    }
    if let Some(failure) = &page.failure {
        let _ = write!(
            html,
            "<div class=\"alert error\">Prediction failed: {}</div>",
            escape_html(failure)
        );
    }
    if let Some(outcome) = &page.outcome {
        let tone = match outcome.tone {
            Tone::Success => "success",
            Tone::Warning => "warning",
        };
        let _ = write!(
            html,
            "<div class=\"alert {tone}\"><strong>{}</strong></div>\
             <h2>Recommendation</h2><p>{}</p><p class=\"disclaimer\">{}</p>\
             <h2>Probability</h2>{}",
            escape_html(&outcome.headline),
            escape_html(outcome.recommendation),
            escape_html(outcome.disclaimer),
            probability_chart_svg(
                &outcome.probabilities,
                &metadata.negative_class,
                &metadata.positive_class
            )
        );
        if !page.importance.is_empty() {
            let _ = write!(
                html,
                "<h2>Feature importance</h2>{}",
                importance_chart_svg(&page.importance)
            );
        }
    }
    if page.show_history {
        render_history(&mut html, schema, metadata, session);
    }
    html.push_str("</body></html>");
    html
}

fn render_form(html: &mut String, schema: &FeatureSchema, session: &Session) {
    let generation = session.generation();
    html.push_str("<form method=\"post\" action=\"/\" autocomplete=\"off\">");
    for (idx, field) in schema.fields().iter().enumerate() {
        let id = format!("field-{generation}-{idx}");
        let _ = write!(
            html,
            "<label for=\"{id}\">{}</label>",
            escape_html(&field.label)
        );
        render_control(html, &id, field, session.raw_value(&field.name));
        if let Some(help) = &field.help {
            let _ = write!(html, "<small>{}</small>", escape_html(help));
        }
    }
    html.push_str(
        "<div class=\"actions\">\
         <button type=\"submit\" name=\"action\" value=\"predict\">Predict</button>\
         <button type=\"submit\" name=\"action\" value=\"reset\">Reset</button>\
         <button type=\"submit\" name=\"action\" value=\"history\">Show history</button>\
         </div></form>",
    );
}

fn render_control(html: &mut String, id: &str, field: &FieldSpec, current: &str) {
    let name = escape_html(&field.name);
    match field.kind {
        FieldKind::Numeric => {
            let invalid = if is_valid_numeric(current) {
                ""
            } else {
                " aria-invalid=\"true\""
            };
            let _ = write!(
                html,
                "<input type=\"text\" inputmode=\"decimal\" id=\"{id}\" name=\"{name}\" \
                 value=\"{}\" placeholder=\"0.00\"{invalid}>",
                escape_html(current)
            );
        }
        kind => {
            let selected = kind.choice_value(current);
            let _ = write!(html, "<select id=\"{id}\" name=\"{name}\">");
            for (label, value) in kind.options() {
                let mark = if selected == Some(*value) { " selected" } else { "" };
                let _ = write!(html, "<option value=\"{label}\"{mark}>{label}</option>");
            }
            html.push_str("</select>");
        }
    }
}

fn render_history(
    html: &mut String,
    schema: &FeatureSchema,
    metadata: &BundleMetadata,
    session: &Session,
) {
    html.push_str("<h2>Prediction history</h2>");
    let history = session.history();
    if history.is_empty() {
        html.push_str("<p>No prediction history yet.</p>");
        return;
    }
    let _ = write!(
        html,
        "<table><thead><tr><th>#</th><th>Prediction</th><th>P({})</th><th>P({})</th>",
        escape_html(&metadata.negative_class),
        escape_html(&metadata.positive_class)
    );
    for field in schema.fields() {
        let _ = write!(html, "<th>{}</th>", escape_html(&field.label));
    }
    html.push_str("</tr></thead><tbody>");
    for (idx, entry) in history.iter().enumerate() {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
            idx + 1,
            escape_html(&entry.label),
            entry.prob_negative,
            entry.prob_positive
        );
        for field in schema.fields() {
            let cell = match entry.inputs.get(&field.name) {
                Some(value) => display_value(field.kind, value),
                None => String::new(),
            };
            let _ = write!(html, "<td>{}</td>", escape_html(&cell));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
}

fn display_value(kind: FieldKind, value: f64) -> String {
    match kind.option_label(value) {
        Some(label) => label.to_string(),
        None => format!("{value:.2}"),
    }
}

fn is_valid_numeric(raw: &str) -> bool {
    parse_numeric(raw).is_some()
}
