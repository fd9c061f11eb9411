//! Inline SVG bar charts for the result page.

use pcos_model::ClassProbabilities;

use crate::present::format_percent;
use crate::render::escape_html;
use crate::schema::FeatureSchema;

const NEGATIVE_COLOR: &str = "skyblue";
const POSITIVE_COLOR: &str = "salmon";
const IMPORTANCE_COLOR: &str = "#4c72b0";

/// Two vertical bars (negative, positive) on a `[0, 1]` axis, each with its
/// percentage written above it.
pub fn probability_chart_svg(
    probabilities: &ClassProbabilities,
    negative_name: &str,
    positive_name: &str,
) -> String {
    let (width, height) = (360.0_f64, 280.0_f64);
    let (left, right, top, bottom) = (56.0, 16.0, 24.0, 40.0);
    let plot_w = width - left - right;
    let plot_h = height - top - bottom;
    let baseline = top + plot_h;

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
         viewBox=\"0 0 {width} {height}\" role=\"img\" font-family=\"sans-serif\" font-size=\"12\">"
    );

    for step in 0..=4 {
        let tick = step as f64 * 0.25;
        let y = baseline - tick * plot_h;
        svg.push_str(&format!(
            "<line x1=\"{left}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"#ddd\"/>\
             <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{tick:.2}</text>",
            left + plot_w,
            left - 6.0,
            y + 4.0
        ));
    }
    svg.push_str(&format!(
        "<text transform=\"translate(14 {:.1}) rotate(-90)\" \
         text-anchor=\"middle\">Probability</text>",
        top + plot_h / 2.0
    ));

    let slot = plot_w / 2.0;
    let bar_w = slot * 0.6;
    let bars = [
        (negative_name, probabilities.negative(), NEGATIVE_COLOR),
        (positive_name, probabilities.positive(), POSITIVE_COLOR),
    ];
    for (idx, (name, value, color)) in bars.iter().enumerate() {
        let center = left + slot * (idx as f64 + 0.5);
        let bar_h = value.clamp(0.0, 1.0) * plot_h;
        let y = baseline - bar_h;
        svg.push_str(&format!(
            "<rect x=\"{:.1}\" y=\"{y:.1}\" width=\"{bar_w:.1}\" \
             height=\"{bar_h:.1}\" fill=\"{color}\"/>\
             <text x=\"{center:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>\
             <text x=\"{center:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>",
            center - bar_w / 2.0,
            y - 6.0,
            format_percent(*value),
            baseline + 18.0,
            escape_html(name)
        ));
    }
    svg.push_str(&format!(
        "<line x1=\"{left}\" y1=\"{baseline:.1}\" x2=\"{:.1}\" y2=\"{baseline:.1}\" \
         stroke=\"black\"/></svg>",
        left + plot_w
    ));
    svg
}

/// Field labels paired with importance scores, sorted ascending.
///
/// Returns an empty list when the scores do not line up with the schema.
pub fn importance_ranking(schema: &FeatureSchema, importances: &[f64]) -> Vec<(String, f64)> {
    if importances.len() != schema.len() {
        log::warn!(
            "ignoring {} importance scores for {} features",
            importances.len(),
            schema.len()
        );
        return Vec::new();
    }
    let mut ranking: Vec<(String, f64)> = schema
        .fields()
        .iter()
        .zip(importances.iter())
        .map(|(field, score)| (field.label.clone(), *score))
        .collect();
    ranking.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranking
}

/// Horizontal bars for an ascending ranking; the last (largest) entry is
/// drawn on the top row.
pub fn importance_chart_svg(ranking: &[(String, f64)]) -> String {
    if ranking.is_empty() {
        return String::new();
    }
    let row_h = 24.0_f64;
    let (label_w, plot_w, value_w, top) = (230.0_f64, 260.0_f64, 56.0_f64, 8.0_f64);
    let width = label_w + plot_w + value_w;
    let height = top * 2.0 + row_h * ranking.len() as f64;
    let max = ranking.iter().map(|(_, s)| *s).fold(0.0_f64, f64::max);
    let last = ranking.len() - 1;

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
         viewBox=\"0 0 {width} {height}\" role=\"img\" font-family=\"sans-serif\" font-size=\"12\">"
    );
    for (idx, (label, score)) in ranking.iter().enumerate() {
        let y = top + (last - idx) as f64 * row_h;
        let bar_w = if max > 0.0 { score / max * plot_w } else { 0.0 };
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{}</text>\
             <rect x=\"{label_w}\" y=\"{:.1}\" width=\"{bar_w:.1}\" height=\"{:.1}\" \
             fill=\"{IMPORTANCE_COLOR}\"/>\
             <text x=\"{:.1}\" y=\"{:.1}\">{score:.3}</text>",
            label_w - 8.0,
            y + row_h * 0.65,
            escape_html(label),
            y + 3.0,
            row_h - 6.0,
            label_w + bar_w + 4.0,
            y + row_h * 0.65
        ));
    }
    svg.push_str("</svg>");
    svg
}
