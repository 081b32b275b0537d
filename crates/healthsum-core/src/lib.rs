//! Upload-and-result lifecycle for the Health Report Summarizer
//!
//! This crate holds everything the clients share:
//! - `validation` / `progress` / `upload`: the sans-IO upload state machine
//! - `history`: the list of previously processed documents
//! - `highlight` / `export` / `view`: what the UI renders
//! - `dashboard`: the async driver, generic over the [`service`] seams
//!
//! The browser client (wasm) and the terminal client only provide
//! transports, an event loop and presentation.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod highlight;
pub mod history;
pub mod model;
pub mod progress;
pub mod service;
pub mod upload;
pub mod validation;
pub mod view;

pub use config::{ClientConfig, HistoryFallback};
pub use dashboard::{Dashboard, UploadOutcome};
pub use error::{ClipboardError, ServiceError, ValidationError};
pub use export::SummaryExport;
pub use highlight::{render_spans, Span, TermHighlighter};
pub use model::{
    Document, HistoryEntry, Notification, NotificationLevel, SummaryResponse, SummaryResult,
};
pub use service::{AnalysisService, Clipboard, EventLoop, Notifier};
#[cfg(feature = "tokio")]
pub use service::TokioEventLoop;
pub use upload::{AttemptId, UploadController, UploadPhase};
pub use validation::{validate_document, FileValidator};
pub use view::{ColorMode, ContentView, ViewState};
