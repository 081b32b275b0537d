//! Term highlighting for summary text
//!
//! Splits a summary into plain and highlighted spans. The split keeps every
//! character of the input, so joining the span texts gives back the summary.

use regex::{Regex, RegexBuilder};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub text: String,
    pub highlighted: bool,
}

impl Span {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            highlighted: false,
        }
    }
}

/// Compiled matcher for one set of detected terms
#[derive(Debug, Clone)]
pub struct TermHighlighter {
    pattern: Option<Regex>,
    lowered_terms: Vec<String>,
}

impl TermHighlighter {
    pub fn new<S: AsRef<str>>(terms: &[S]) -> Self {
        let mut terms: Vec<&str> = terms
            .iter()
            .map(AsRef::as_ref)
            .filter(|term| !term.trim().is_empty())
            .collect();
        // Longest first so "blood pressure" wins over "blood"
        terms.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        terms.dedup();

        let lowered_terms = terms.iter().map(|term| term.to_lowercase()).collect();
        let pattern = if terms.is_empty() {
            None
        } else {
            build_pattern(&terms)
        };

        Self {
            pattern,
            lowered_terms,
        }
    }

    /// Split `text` into spans, flagging the detected terms
    pub fn spans(&self, text: &str) -> Vec<Span> {
        let Some(pattern) = &self.pattern else {
            return vec![Span::plain(text)];
        };

        let mut spans = Vec::new();
        let mut cursor = 0;
        for found in pattern.find_iter(text) {
            spans.push(Span::plain(&text[cursor..found.start()]));
            spans.push(Span {
                text: found.as_str().to_string(),
                highlighted: self.is_term(found.as_str()),
            });
            cursor = found.end();
        }
        spans.push(Span::plain(&text[cursor..]));
        spans
    }

    fn is_term(&self, candidate: &str) -> bool {
        let candidate = candidate.trim().to_lowercase();
        self.lowered_terms.iter().any(|term| *term == candidate)
    }
}

fn build_pattern(terms: &[&str]) -> Option<Regex> {
    let alternation = terms
        .iter()
        .map(|term| regex::escape(term))
        .collect::<Vec<_>>()
        .join("|");

    match RegexBuilder::new(&format!(r"\b(?:{})\b", alternation))
        .case_insensitive(true)
        .build()
    {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            tracing::warn!(terms = terms.len(), "Could not build highlight pattern: {}", e);
            None
        }
    }
}

/// Split `text` into plain and highlighted spans for `terms`
pub fn render_spans<S: AsRef<str>>(text: &str, terms: &[S]) -> Vec<Span> {
    TermHighlighter::new(terms).spans(text)
}
