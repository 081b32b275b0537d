//! Scripted service, event loop and recorders shared by the integration tests

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use futures::future::LocalBoxFuture;

use healthsum_core::{
    AnalysisService, Clipboard, ClipboardError, Document, EventLoop, HistoryEntry, Notification,
    ServiceError, SummaryResult,
};

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
}

/// Event loop on the test's tokio runtime with a frozen wall clock
pub struct TestLoop;

impl EventLoop for TestLoop {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        tokio::task::spawn_local(task);
    }

    fn now(&self) -> DateTime<Utc> {
        fixed_now()
    }
}

struct Scripted<T> {
    delay: Duration,
    outcome: T,
}

/// Service answering from queues of canned responses, each after a delay
#[derive(Default)]
pub struct ScriptedService {
    uploads: RefCell<VecDeque<Scripted<Result<SummaryResult, ServiceError>>>>,
    histories: RefCell<VecDeque<Scripted<Result<Vec<HistoryEntry>, ServiceError>>>>,
    details: RefCell<HashMap<String, SummaryResult>>,
    pub upload_calls: Cell<usize>,
    pub history_calls: Cell<usize>,
    pub detail_calls: Cell<usize>,
}

impl ScriptedService {
    pub fn upload_responds(
        self,
        after_ms: u64,
        outcome: Result<SummaryResult, ServiceError>,
    ) -> Self {
        self.uploads.borrow_mut().push_back(Scripted {
            delay: Duration::from_millis(after_ms),
            outcome,
        });
        self
    }

    pub fn history_responds(
        self,
        after_ms: u64,
        outcome: Result<Vec<HistoryEntry>, ServiceError>,
    ) -> Self {
        self.histories.borrow_mut().push_back(Scripted {
            delay: Duration::from_millis(after_ms),
            outcome,
        });
        self
    }

    pub fn with_detail(self, id: &str, result: SummaryResult) -> Self {
        self.details.borrow_mut().insert(id.to_string(), result);
        self
    }
}

#[async_trait(?Send)]
impl AnalysisService for ScriptedService {
    type Payload = ();

    async fn upload(&self, _document: &Document, _payload: ()) -> Result<SummaryResult, ServiceError> {
        self.upload_calls.set(self.upload_calls.get() + 1);
        let scripted = self
            .uploads
            .borrow_mut()
            .pop_front()
            .expect("unscripted upload");
        tokio::time::sleep(scripted.delay).await;
        scripted.outcome
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>, ServiceError> {
        self.history_calls.set(self.history_calls.get() + 1);
        let scripted = self.histories.borrow_mut().pop_front();
        match scripted {
            Some(scripted) => {
                tokio::time::sleep(scripted.delay).await;
                scripted.outcome
            }
            None => Ok(Vec::new()),
        }
    }

    async fn entry_detail(&self, id: &str) -> Result<Option<SummaryResult>, ServiceError> {
        self.detail_calls.set(self.detail_calls.get() + 1);
        Ok(self.details.borrow().get(id).cloned())
    }
}

/// Clipboard that records writes or refuses them
pub struct TestClipboard {
    pub deny: bool,
    pub written: RefCell<Vec<String>>,
}

impl TestClipboard {
    pub fn allowing() -> Self {
        Self {
            deny: false,
            written: RefCell::new(Vec::new()),
        }
    }

    pub fn denying() -> Self {
        Self {
            deny: true,
            written: RefCell::new(Vec::new()),
        }
    }
}

#[async_trait(?Send)]
impl Clipboard for TestClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        if self.deny {
            return Err(ClipboardError("permission denied".to_string()));
        }
        self.written.borrow_mut().push(text.to_string());
        Ok(())
    }
}

/// Collects notifications emitted by a dashboard
#[derive(Clone, Default)]
pub struct Recorder {
    pub notifications: Rc<RefCell<Vec<Notification>>>,
}

impl Recorder {
    pub fn notifier(&self) -> impl Fn(&Notification) + 'static {
        let sink = Rc::clone(&self.notifications);
        move |notification: &Notification| sink.borrow_mut().push(notification.clone())
    }

    pub fn titles(&self) -> Vec<String> {
        self.notifications
            .borrow()
            .iter()
            .map(|n| n.title.clone())
            .collect()
    }
}

pub fn labs_csv() -> Document {
    Document::new("labs.csv", 2 * 1024 * 1024, "text/csv")
}

pub fn summary(text: &str, terms: &[&str]) -> SummaryResult {
    SummaryResult {
        summary_text: text.to_string(),
        filename: "labs.csv".to_string(),
        page_count: None,
        sentence_count: Some(1),
        detected_terms: terms.iter().map(|t| t.to_string()).collect(),
    }
}

pub fn history_entry(id: &str, filename: &str, preview: &str) -> HistoryEntry {
    HistoryEntry {
        id: id.to_string(),
        filename: filename.to_string(),
        preview: preview.to_string(),
        timestamp_iso: "2024-06-09T09:00:00Z".to_string(),
    }
}
