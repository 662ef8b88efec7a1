//! HTML rendering of the input form and the prediction result

use crate::advice::{Advisory, AdvisoryCatalog};
use crate::form::{FormState, MIN_VALUE, MODEL_FIELD, STEP};
use crate::models::registry::ModelKind;
use crate::types::features::Feature;
use crate::types::prediction::{PredictionResult, RiskClass};
use std::fmt::Write;

pub const TITLE: &str =
    "Machine learning model for predicting intraoperative blood loss > 750 ml during burn surgery";

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0; display: flex; color: #262730; }
aside { width: 22rem; min-height: 100vh; padding: 1.5rem; background: #f0f2f6; box-sizing: border-box; }
main { flex: 1; padding: 2rem 3rem; max-width: 60rem; }
label { display: block; margin-top: .8rem; font-size: .9rem; }
input, select { width: 100%; padding: .35rem; box-sizing: border-box; }
button { margin-top: 1.2rem; padding: .5rem 1.2rem; }
.error { background: #ffe2e0; color: #7d1a12; padding: .8rem 1rem; border-radius: .4rem; }
.success { background: #dff5e3; color: #14532d; padding: .8rem 1rem; border-radius: .4rem; }
.advice li { margin-bottom: .3rem; }
"#;

/// Everything a page render needs.
pub struct Page<'a> {
    pub form: &'a FormState,
    pub outcome: Outcome<'a>,
}

/// What appears below the title.
pub enum Outcome<'a> {
    /// Nothing submitted yet
    Empty,
    Prediction {
        result: &'a PredictionResult,
        advice: &'a AdvisoryCatalog,
    },
    /// Submission rejected before inference
    Rejected(String),
    /// Inference failed
    Failed,
}

impl Page<'_> {
    pub fn render(&self) -> String {
        let mut html = String::with_capacity(16 * 1024);
        let _ = write!(
            html,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n",
            title = escape(TITLE)
        );
        render_form(&mut html, self.form);
        html.push_str("<main>\n");
        let _ = writeln!(html, "<h1>{}</h1>", escape(TITLE));
        match &self.outcome {
            Outcome::Empty => {}
            Outcome::Prediction { result, advice } => render_result(&mut html, result, advice),
            Outcome::Rejected(message) => {
                let _ = writeln!(html, "<div class=\"error\">{}</div>", escape(message));
            }
            Outcome::Failed => {
                html.push_str("<div class=\"error\">Prediction failed. Please try again.</div>\n");
            }
        }
        html.push_str("</main>\n</body>\n</html>\n");
        html
    }
}

fn render_form(html: &mut String, form: &FormState) {
    // Defaults are off the `step` grid; submissions are validated server-side.
    html.push_str(
        "<aside>\n<h2>Input Features</h2>\n<form method=\"post\" action=\"/predict\" novalidate>\n",
    );
    for feature in Feature::ALL {
        let _ = writeln!(
            html,
            "<label for=\"{key}\">{name}:</label>\n\
             <input type=\"number\" id=\"{key}\" name=\"{key}\" value=\"{value}\" min=\"{MIN_VALUE:.1}\" step=\"{STEP}\" required>",
            key = feature.key(),
            name = escape(feature.name()),
            value = form.features.get(feature),
        );
    }
    let _ = writeln!(
        html,
        "<label for=\"{MODEL_FIELD}\">Select Model</label>\n<select id=\"{MODEL_FIELD}\" name=\"{MODEL_FIELD}\">"
    );
    for kind in ModelKind::ALL {
        let selected = if kind == form.model { " selected" } else { "" };
        let _ = writeln!(
            html,
            "<option value=\"{}\"{}>{}</option>",
            kind.slug(),
            selected,
            escape(kind.display_name())
        );
    }
    html.push_str("</select>\n<button type=\"submit\">Predict</button>\n</form>\n</aside>\n");
}

fn render_result(html: &mut String, result: &PredictionResult, advice: &AdvisoryCatalog) {
    let class = match result.risk_class {
        RiskClass::High => "error",
        RiskClass::Low => "success",
    };

    let _ = writeln!(
        html,
        "<h2>Prediction using {}</h2>\n\
         <p>Predicted risk of intraoperative blood loss &gt; 750 ml: <strong>{}</strong></p>\n\
         <div class=\"{class}\">Predicted class: {}</div>",
        escape(result.model.display_name()),
        result.probability_display(),
        result.risk_class.verdict(),
    );

    html.push_str("<h2>Recommendations</h2>\n");
    let _ = write!(html, "<div class=\"{class} advice\">");
    render_advisory(html, advice.for_class(result.risk_class));
    html.push_str("</div>\n");
}

fn render_advisory(html: &mut String, advisory: &Advisory) {
    let _ = writeln!(
        html,
        "<p><strong>{}:</strong><br>{}</p>\n<ol>",
        escape(&advisory.title),
        escape(&advisory.summary)
    );
    for section in &advisory.sections {
        let _ = writeln!(html, "<li><strong>{}:</strong>\n<ul>", escape(&section.heading));
        for point in &section.points {
            let _ = writeln!(
                html,
                "<li><strong>{}:</strong> {}</li>",
                escape(&point.topic),
                escape(&point.text)
            );
        }
        html.push_str("</ul></li>\n");
    }
    let _ = writeln!(html, "</ol>\n<p>{}</p>", escape(&advisory.closing));
}

/// Minimal HTML escaping for text and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
