//! WASM bindings for the Health Report Summarizer
//!
//! All page state is held in Rust by `HealthSummaryApp`; JavaScript only
//! handles DOM events and renders the view it is handed.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { HealthSummaryApp } from './pkg/healthsum_wasm.js';
//!
//! await init();
//!
//! const app = new HealthSummaryApp(JSON.stringify({ upload_url: "/upload" }));
//! app.onChange((view) => render(view));
//! app.onNotify(({ level, title, description }) => toast(level, title, description));
//!
//! input.addEventListener("change", () => app.submitFile(input.files[0]));
//! copyButton.addEventListener("click", () => app.copySummary());
//! downloadButton.addEventListener("click", () => app.downloadSummary());
//! ```

pub mod app;
pub mod logging;
pub mod platform;
pub mod transport;

use healthsum_core::{render_spans, validate_document, Document, Span, UploadOutcome};
use wasm_bindgen::prelude::*;

pub use app::HealthSummaryApp;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the library version
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Check a file before upload
/// Returns Ok(()) if accepted, Err with the user-facing reason if not
#[wasm_bindgen(js_name = validateFile)]
pub fn validate_file(name: &str, size: f64, mime_type: &str) -> Result<(), JsValue> {
    match rejection_reason(name, size, mime_type) {
        Some(reason) => Err(JsValue::from_str(&reason)),
        None => Ok(()),
    }
}

/// Split summary text into `{ text, highlighted }` spans
/// `terms_json` is a JSON array of strings
#[wasm_bindgen(js_name = renderSpans)]
pub fn render_spans_js(text: &str, terms_json: &str) -> Result<JsValue, JsValue> {
    let spans = spans_from_json(text, terms_json).map_err(|e| JsValue::from_str(&e))?;
    serde_wasm_bindgen::to_value(&spans)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn rejection_reason(name: &str, size: f64, mime_type: &str) -> Option<String> {
    let size_bytes = if size.is_finite() && size > 0.0 { size as u64 } else { 0 };
    validate_document(&Document::new(name, size_bytes, mime_type))
        .err()
        .map(|e| e.to_string())
}

fn spans_from_json(text: &str, terms_json: &str) -> Result<Vec<Span>, String> {
    let terms: Vec<String> =
        serde_json::from_str(terms_json).map_err(|e| format!("Invalid terms: {}", e))?;
    Ok(render_spans(text, &terms))
}

pub(crate) fn outcome_label(outcome: UploadOutcome) -> &'static str {
    match outcome {
        UploadOutcome::Rejected => "rejected",
        UploadOutcome::Succeeded => "succeeded",
        UploadOutcome::Failed => "failed",
        UploadOutcome::Superseded => "superseded",
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: spans from JSON terms always rebuild the text
        #[test]
        fn spans_from_json_round_trip(text in ".{0,80}", terms in prop::collection::vec("[a-z]{1,6}", 0..4)) {
            let json = serde_json::to_string(&terms).unwrap();
            let spans = spans_from_json(&text, &json).unwrap();
            let joined: String = spans.iter().map(|s| s.text.as_str()).collect();
            prop_assert_eq!(joined, text);
        }
    }
}
