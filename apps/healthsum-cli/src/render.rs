//! Terminal presentation of the view state

use healthsum_core::view::{HistoryPanelView, ResultView};
use healthsum_core::{Notification, NotificationLevel, Span};

const HIGHLIGHT: &str = "\x1b[1;33m";
const RESET: &str = "\x1b[0m";

pub fn level_label(level: NotificationLevel) -> &'static str {
    match level {
        NotificationLevel::Success => "success",
        NotificationLevel::Info => "info",
        NotificationLevel::Warning => "warning",
        NotificationLevel::Error => "error",
    }
}

/// `[level] title: description`
pub fn notification_line(notification: &Notification) -> String {
    format!(
        "[{}] {}: {}",
        level_label(notification.level),
        notification.title,
        notification.description
    )
}

pub fn progress_line(percent: u8) -> String {
    format!("\rUploading... {:>3}%", percent)
}

/// Summary text with highlighted spans in bold yellow when `color` is set
pub fn spans_text(spans: &[Span], color: bool) -> String {
    spans
        .iter()
        .map(|span| {
            if span.highlighted && color {
                format!("{}{}{}", HIGHLIGHT, span.text, RESET)
            } else {
                span.text.clone()
            }
        })
        .collect()
}

pub fn result_block(result: &ResultView, color: bool) -> String {
    let mut badges = Vec::new();
    if let Some(pages) = result.page_count {
        badges.push(format!("Pages: {}", pages));
    }
    if let Some(sentences) = result.sentence_count {
        badges.push(format!("Sentences: {}", sentences));
    }

    let mut out = result.filename.clone();
    if !badges.is_empty() {
        out.push_str(&format!("  ({})", badges.join(", ")));
    }
    out.push_str("\n\n");
    out.push_str(&spans_text(&result.spans, color));
    out.push('\n');
    if !result.detected_terms.is_empty() {
        out.push_str(&format!("\nDetected terms: {}\n", result.detected_terms.join(", ")));
    }
    out
}

pub fn history_block(history: &HistoryPanelView) -> String {
    if history.items.is_empty() {
        return "No history yet.\n".to_string();
    }
    history
        .items
        .iter()
        .map(|item| format!("{}\t{}\t{}\n    {}\n", item.id, item.filename, item.age, item.preview))
        .collect()
}
