//! Previously processed documents
//!
//! History is non-critical: a failed fetch is logged and replaced by the
//! configured fallback, never reported to the user.

use chrono::{DateTime, Duration, Utc};

use crate::config::HistoryFallback;
use crate::error::ServiceError;
use crate::model::{HistoryEntry, SummaryResult};

/// Identity of one history fetch, used to drop stale responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshId(u64);

#[derive(Debug, Default)]
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
    fallback: HistoryFallback,
    last_refresh: u64,
    loading: bool,
}

impl HistoryStore {
    pub fn new(fallback: HistoryFallback) -> Self {
        Self {
            fallback,
            ..Self::default()
        }
    }

    /// Entries in server order
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn find(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Mark a fetch as started and return its identity
    pub fn begin_refresh(&mut self) -> RefreshId {
        self.last_refresh += 1;
        self.loading = true;
        RefreshId(self.last_refresh)
    }

    /// Apply the outcome of fetch `id`
    ///
    /// The sequence is replaced as a whole. Returns `false` when a newer
    /// fetch has started since, in which case nothing changes.
    pub fn apply(
        &mut self,
        id: RefreshId,
        outcome: Result<Vec<HistoryEntry>, ServiceError>,
        now: DateTime<Utc>,
    ) -> bool {
        if id.0 != self.last_refresh {
            tracing::debug!(refresh = id.0, latest = self.last_refresh, "Dropping stale history response");
            return false;
        }

        self.loading = false;
        self.entries = match outcome {
            Ok(entries) => {
                tracing::debug!(count = entries.len(), "History refreshed");
                entries
            }
            Err(e) => {
                tracing::warn!("Failed to fetch history: {}", e);
                match self.fallback {
                    HistoryFallback::Empty => Vec::new(),
                    HistoryFallback::Demo => demo_entries(now),
                }
            }
        };
        true
    }
}

/// Stand-in result for a history entry when no detail endpoint exists
///
/// Only the preview text is known; page and sentence counts stay absent.
pub fn synthesize_result(entry: &HistoryEntry) -> SummaryResult {
    SummaryResult {
        summary_text: entry.preview.clone(),
        filename: entry.filename.clone(),
        page_count: None,
        sentence_count: None,
        detected_terms: Vec::new(),
    }
}

/// Illustrative entries for local development without a backend
pub fn demo_entries(now: DateTime<Utc>) -> Vec<HistoryEntry> {
    let entry = |id: &str, filename: &str, preview: &str, days_ago: i64| HistoryEntry {
        id: id.to_string(),
        filename: filename.to_string(),
        preview: preview.to_string(),
        timestamp_iso: (now - Duration::days(days_ago)).to_rfc3339(),
    };

    vec![
        entry(
            "1",
            "mammogram_results_2024.pdf",
            "Normal breast tissue examination with no abnormalities detected...",
            1,
        ),
        entry(
            "2",
            "blood_work_comprehensive.csv",
            "Complete blood count within normal ranges, cholesterol slightly elevated...",
            2,
        ),
        entry(
            "3",
            "cardiology_report_june.pdf",
            "ECG shows normal sinus rhythm, echocardiogram reveals good cardiac function...",
            3,
        ),
    ]
}

/// Human-friendly age of a timestamp: Today, Yesterday, `n days ago`, or the date
pub fn format_relative(timestamp_iso: &str, now: DateTime<Utc>) -> String {
    let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp_iso) else {
        return timestamp_iso.to_string();
    };
    let parsed = parsed.with_timezone(&Utc);

    match (now - parsed).num_days() {
        days if days <= 0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        days if days < 7 => format!("{} days ago", days),
        _ => parsed.format("%Y-%m-%d").to_string(),
    }
}
