//! Data model shared by the controller, the history store and the transports

use serde::{Deserialize, Serialize};

/// Metadata of a candidate file, as reported by the picker or the filesystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub size_bytes: u64,
    /// MIME type declared by the platform (often empty or wrong for CSV)
    pub declared_type: String,
}

impl Document {
    pub fn new(name: impl Into<String>, size_bytes: u64, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            declared_type: declared_type.into(),
        }
    }
}

/// Summary of one analysed document, ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub summary_text: String,
    pub filename: String,
    pub page_count: Option<u32>,
    pub sentence_count: Option<u32>,
    pub detected_terms: Vec<String>,
}

/// Success body of the upload and detail endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub metadata: SummaryMetadata,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SummaryMetadata {
    pub filename: String,
    #[serde(default)]
    pub n_pages: Option<u32>,
    #[serde(default)]
    pub n_sentences: Option<u32>,
    #[serde(default)]
    pub terms: Option<Vec<String>>,
}

impl From<SummaryResponse> for SummaryResult {
    fn from(response: SummaryResponse) -> Self {
        Self {
            summary_text: response.summary,
            filename: response.metadata.filename,
            page_count: response.metadata.n_pages,
            sentence_count: response.metadata.n_sentences,
            detected_terms: response.metadata.terms.unwrap_or_default(),
        }
    }
}

/// One previously processed document as listed by the history endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub filename: String,
    #[serde(rename = "summaryPreview")]
    pub preview: String,
    #[serde(rename = "timestamp")]
    pub timestamp_iso: String,
}

/// Severity of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A toast-style message shown once per terminal outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn new(level: NotificationLevel, title: &str, description: impl Into<String>) -> Self {
        Self {
            level,
            title: title.to_string(),
            description: description.into(),
        }
    }
}
