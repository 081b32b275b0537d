//! Render-ready view state
//!
//! Derived on demand from the controller, the history store and the UI
//! preferences. Nothing here is stored between renders.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::highlight::Span;
use crate::history::{format_relative, HistoryStore};
use crate::model::SummaryResult;
use crate::upload::UploadController;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Light,
    Dark,
}

impl ColorMode {
    pub fn toggled(self) -> Self {
        match self {
            ColorMode::Light => ColorMode::Dark,
            ColorMode::Dark => ColorMode::Light,
        }
    }
}

/// Page-wide UI state shared by the header and the main panels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UiPreferences {
    pub color_mode: ColorMode,
    pub history_open: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultView {
    pub filename: String,
    pub page_count: Option<u32>,
    pub sentence_count: Option<u32>,
    pub detected_terms: Vec<String>,
    pub spans: Vec<Span>,
}

impl ResultView {
    /// `spans` is the highlighted rendering of `result.summary_text`
    pub fn new(result: &SummaryResult, spans: &[Span]) -> Self {
        Self {
            filename: result.filename.clone(),
            page_count: result.page_count,
            sentence_count: result.sentence_count,
            detected_terms: result.detected_terms.clone(),
            spans: spans.to_vec(),
        }
    }
}

/// Main panel content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentView {
    /// Nothing analysed yet and nothing in flight
    Empty,
    /// First upload in flight, no result to show yet
    Pending,
    Result(ResultView),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryItemView {
    pub id: String,
    pub filename: String,
    pub preview: String,
    pub age: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryPanelView {
    pub open: bool,
    pub loading: bool,
    pub items: Vec<HistoryItemView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState {
    /// Displayed progress while an upload is pending
    pub upload_progress: Option<u8>,
    pub content: ContentView,
    pub history: HistoryPanelView,
    pub color_mode: ColorMode,
}

impl ViewState {
    pub fn derive(
        controller: &UploadController,
        history: &HistoryStore,
        preferences: UiPreferences,
        now: DateTime<Utc>,
    ) -> Self {
        let upload_progress = controller
            .attempt()
            .filter(|_| controller.is_uploading())
            .map(|attempt| attempt.progress.display_percent());

        let content = match controller.result().zip(controller.result_spans()) {
            Some((result, spans)) => ContentView::Result(ResultView::new(result, spans)),
            None if upload_progress.is_some() => ContentView::Pending,
            None => ContentView::Empty,
        };

        let items = history
            .entries()
            .iter()
            .map(|entry| HistoryItemView {
                id: entry.id.clone(),
                filename: entry.filename.clone(),
                preview: entry.preview.clone(),
                age: format_relative(&entry.timestamp_iso, now),
            })
            .collect();

        Self {
            upload_progress,
            content,
            history: HistoryPanelView {
                open: preferences.history_open,
                loading: history.is_loading(),
                items,
            },
            color_mode: preferences.color_mode,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content == ContentView::Empty
    }
}
