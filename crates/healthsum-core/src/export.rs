//! Download and clipboard exports of a summary

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::model::SummaryResult;

lazy_static! {
    // Last extension of the filename, as long as it contains no path separator
    static ref EXTENSION: Regex = Regex::new(r"\.[^/.]+$").unwrap();
}

pub const EXPORT_MIME_TYPE: &str = "text/markdown";

/// A text file ready to be handed to the platform's save mechanism
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryExport {
    pub filename: String,
    pub mime_type: String,
    pub content: String,
}

/// `labs.csv` → `labs_summary.md`
///
/// Directory parts of the server-provided name are dropped so the export
/// always lands in the directory chosen by the user.
pub fn export_filename(original: &str) -> String {
    let base = original
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(original);
    format!("{}_summary.md", EXTENSION.replace(base, ""))
}

/// Markdown body with the summary and a metadata block
pub fn export_markdown(result: &SummaryResult) -> String {
    let pages = result
        .page_count
        .map_or_else(|| "N/A".to_string(), |n| n.to_string());
    let sentences = result
        .sentence_count
        .map_or_else(|| "N/A".to_string(), |n| n.to_string());
    let terms = if result.detected_terms.is_empty() {
        "None".to_string()
    } else {
        result.detected_terms.join(", ")
    };

    format!(
        "# {} - Summary\n\n{}\n\n## Metadata\n- Pages: {}\n- Sentences: {}\n- Detected Terms: {}",
        result.filename, result.summary_text, pages, sentences, terms
    )
}

pub fn export_summary(result: &SummaryResult) -> SummaryExport {
    SummaryExport {
        filename: export_filename(&result.filename),
        mime_type: EXPORT_MIME_TYPE.to_string(),
        content: export_markdown(result),
    }
}

/// Text placed on the clipboard: the raw summary without metadata
pub fn clipboard_text(result: &SummaryResult) -> &str {
    &result.summary_text
}
