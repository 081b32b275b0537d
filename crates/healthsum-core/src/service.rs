//! Seams between the lifecycle logic and the platform
//!
//! The browser and terminal clients each provide a transport, an event
//! loop, a notifier and (in the browser) a clipboard.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::LocalBoxFuture;

use crate::error::{ClipboardError, ServiceError};
use crate::model::{Document, HistoryEntry, Notification, SummaryResponse, SummaryResult};

/// Remote analysis service
#[async_trait(?Send)]
pub trait AnalysisService {
    /// Platform handle for the file bytes (browser `File`, native path, ...)
    type Payload: 'static;

    /// `POST` the document as multipart field `file`
    async fn upload(
        &self,
        document: &Document,
        payload: Self::Payload,
    ) -> Result<SummaryResult, ServiceError>;

    /// `GET` the list of previously processed documents
    async fn history(&self) -> Result<Vec<HistoryEntry>, ServiceError>;

    /// Full record of one history entry, when the backend can provide it
    async fn entry_detail(&self, _id: &str) -> Result<Option<SummaryResult>, ServiceError> {
        Ok(None)
    }
}

/// Single-threaded cooperative scheduler
pub trait EventLoop {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;

    /// Run a task to completion without waiting for it
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);

    fn now(&self) -> DateTime<Utc>;
}

/// Sink for user-facing notifications
pub trait Notifier {
    fn notify(&self, notification: &Notification);
}

impl<F: Fn(&Notification)> Notifier for F {
    fn notify(&self, notification: &Notification) {
        self(notification)
    }
}

#[async_trait(?Send)]
pub trait Clipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Interpret an upload or detail response
pub fn parse_summary(status: u16, status_text: &str, body: &str) -> Result<SummaryResult, ServiceError> {
    if !is_success(status) {
        return Err(ServiceError::Server {
            status,
            status_text: status_text.to_string(),
        });
    }
    serde_json::from_str::<SummaryResponse>(body)
        .map(SummaryResult::from)
        .map_err(|e| ServiceError::Parse(e.to_string()))
}

/// Interpret a history response
pub fn parse_history(status: u16, status_text: &str, body: &str) -> Result<Vec<HistoryEntry>, ServiceError> {
    if !is_success(status) {
        return Err(ServiceError::Server {
            status,
            status_text: status_text.to_string(),
        });
    }
    serde_json::from_str(body).map_err(|e| ServiceError::Parse(e.to_string()))
}

#[cfg(feature = "tokio")]
mod tokio_loop {
    use super::*;

    /// Event loop backed by tokio
    ///
    /// `spawn` uses `spawn_local`, so the dashboard must run inside a
    /// `tokio::task::LocalSet`.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct TokioEventLoop;

    impl EventLoop for TokioEventLoop {
        fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
            Box::pin(tokio::time::sleep(duration))
        }

        fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
            tokio::task::spawn_local(task);
        }

        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(feature = "tokio")]
pub use tokio_loop::TokioEventLoop;
