//! Async driver tying the controller, the history store and the platform
//!
//! All state lives behind a single `RefCell` that is never held across an
//! `.await`, so every update is applied atomically with respect to the
//! other tasks on the same event loop.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use futures::future::{self, Either};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::export::{clipboard_text, export_summary, SummaryExport};
use crate::history::{synthesize_result, HistoryStore};
use crate::model::{Document, Notification, NotificationLevel};
use crate::service::{AnalysisService, Clipboard, EventLoop, Notifier};
use crate::upload::{AttemptId, AttemptStatus, Resolution, Submission, UploadController};
use crate::validation::FileValidator;
use crate::view::{UiPreferences, ViewState};

/// How a call to [`Dashboard::submit`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Rejected,
    Succeeded,
    Failed,
    /// A newer submission replaced this one before it finished
    Superseded,
}

type Observer = Box<dyn Fn(&ViewState)>;

struct State {
    controller: UploadController,
    history: HistoryStore,
    preferences: UiPreferences,
    rng: StdRng,
}

struct Inner<S> {
    service: S,
    event_loop: Box<dyn EventLoop>,
    notifier: Box<dyn Notifier>,
    tick_interval: Duration,
    state: RefCell<State>,
    observers: RefCell<Vec<Observer>>,
}

/// Page-level controller shared by every UI callback
///
/// Cloning is cheap and yields a handle to the same dashboard.
pub struct Dashboard<S> {
    inner: Rc<Inner<S>>,
}

impl<S> Clone for Dashboard<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: AnalysisService + 'static> Dashboard<S> {
    pub fn new(
        config: &ClientConfig,
        service: S,
        event_loop: impl EventLoop + 'static,
        notifier: impl Notifier + 'static,
    ) -> Self {
        let state = State {
            controller: UploadController::new(FileValidator::new(config.max_upload_bytes)),
            history: HistoryStore::new(config.history_fallback),
            preferences: UiPreferences::default(),
            rng: StdRng::from_entropy(),
        };

        Self {
            inner: Rc::new(Inner {
                service,
                event_loop: Box::new(event_loop),
                notifier: Box::new(notifier),
                tick_interval: config.tick_interval(),
                state: RefCell::new(state),
                observers: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Make the simulated progress reproducible
    pub fn seed_progress(&self, seed: u64) {
        self.inner.state.borrow_mut().rng = StdRng::seed_from_u64(seed);
    }

    pub fn service(&self) -> &S {
        &self.inner.service
    }

    /// Register a callback run after every state change
    ///
    /// Observers may read [`Dashboard::view`] but must not register further
    /// observers from inside the callback.
    pub fn on_change(&self, observer: impl Fn(&ViewState) + 'static) {
        self.inner.observers.borrow_mut().push(Box::new(observer));
    }

    pub fn view(&self) -> ViewState {
        let state = self.inner.state.borrow();
        ViewState::derive(
            &state.controller,
            &state.history,
            state.preferences,
            self.inner.event_loop.now(),
        )
    }

    /// Validate and upload one document
    ///
    /// Resolves when the attempt reaches a terminal state or is superseded
    /// by a later call. A superseded request is dropped without being
    /// awaited further.
    pub async fn submit(&self, document: Document, payload: S::Payload) -> UploadOutcome {
        let submission = self
            .inner
            .state
            .borrow_mut()
            .controller
            .submit(document.clone());

        let id = match submission {
            Submission::Rejected(notification) => {
                self.notify(&notification);
                self.publish();
                return UploadOutcome::Rejected;
            }
            Submission::Started(id) => id,
        };
        self.publish();

        let request = self.inner.service.upload(&document, payload);
        let ticker = self.run_progress(id);
        futures::pin_mut!(ticker);

        let outcome = match future::select(request, ticker).await {
            Either::Left((outcome, _)) => outcome,
            Either::Right(((), _)) => {
                debug!(attempt = id.value(), "Dropping request of superseded attempt");
                return UploadOutcome::Superseded;
            }
        };

        let resolution = self.inner.state.borrow_mut().controller.resolve(id, outcome);
        match resolution {
            Resolution::Applied {
                status,
                notification,
                refresh_history,
            } => {
                self.notify(&notification);
                self.publish();
                if refresh_history {
                    self.spawn_history_refresh();
                }
                match status {
                    AttemptStatus::Succeeded => UploadOutcome::Succeeded,
                    _ => UploadOutcome::Failed,
                }
            }
            Resolution::Superseded => UploadOutcome::Superseded,
        }
    }

    /// Tick the simulated progress until the attempt stops being current
    async fn run_progress(&self, id: AttemptId) {
        loop {
            self.inner.event_loop.sleep(self.inner.tick_interval).await;

            let ticked = {
                let mut guard = self.inner.state.borrow_mut();
                let state = &mut *guard;
                state.controller.tick(id, &mut state.rng)
            };
            if ticked.is_none() {
                return;
            }
            self.publish();
        }
    }

    /// Fetch the history list and replace the panel contents
    ///
    /// Failures are logged and never reach the notifier. When several
    /// refreshes overlap only the most recent one is applied.
    pub async fn refresh_history(&self) {
        let refresh = self.inner.state.borrow_mut().history.begin_refresh();
        self.publish();

        let outcome = self.inner.service.history().await;
        let now = self.inner.event_loop.now();
        let applied = self
            .inner
            .state
            .borrow_mut()
            .history
            .apply(refresh, outcome, now);
        if applied {
            self.publish();
        }
    }

    /// Start a history refresh without waiting for it
    pub fn spawn_history_refresh(&self) {
        let this = self.clone();
        self.inner
            .event_loop
            .spawn(Box::pin(async move { this.refresh_history().await }));
    }

    /// Show a history entry in the main panel
    ///
    /// Uses the detail endpoint when the service provides one and falls
    /// back to the entry's preview. Returns `false` for an unknown id.
    pub async fn open_history_entry(&self, id: &str) -> bool {
        let entry = self.inner.state.borrow().history.find(id).cloned();
        let Some(entry) = entry else {
            warn!(id, "Unknown history entry");
            return false;
        };

        let result = match self.inner.service.entry_detail(&entry.id).await {
            Ok(Some(result)) => result,
            Ok(None) => synthesize_result(&entry),
            Err(e) => {
                warn!(id, "Failed to fetch history detail: {}", e);
                synthesize_result(&entry)
            }
        };

        self.inner.state.borrow_mut().controller.show_result(result);
        self.notify(&Notification::new(
            NotificationLevel::Info,
            "Loaded from History",
            format!("Loaded summary for {}", entry.filename),
        ));
        self.publish();
        true
    }

    /// Copy the displayed summary text; `false` when nothing is displayed
    pub async fn copy_summary<C: Clipboard + ?Sized>(&self, clipboard: &C) -> bool {
        let text = self
            .inner
            .state
            .borrow()
            .controller
            .result()
            .map(|result| clipboard_text(result).to_string());
        let Some(text) = text else {
            return false;
        };

        match clipboard.write_text(&text).await {
            Ok(()) => self.notify(&Notification::new(
                NotificationLevel::Success,
                "Copied to Clipboard",
                "Summary has been copied to your clipboard",
            )),
            Err(e) => {
                warn!("{}", e);
                self.notify(&Notification::new(
                    NotificationLevel::Warning,
                    "Copy Failed",
                    "Unable to copy to clipboard",
                ));
            }
        }
        true
    }

    /// Markdown export of the displayed summary
    pub fn export_summary(&self) -> Option<SummaryExport> {
        let export = self
            .inner
            .state
            .borrow()
            .controller
            .result()
            .map(export_summary);
        if let Some(export) = &export {
            info!(file = %export.filename, "Exporting summary");
        }
        export
    }

    pub fn toggle_history(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            state.preferences.history_open = !state.preferences.history_open;
        }
        self.publish();
    }

    pub fn toggle_color_mode(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            state.preferences.color_mode = state.preferences.color_mode.toggled();
        }
        self.publish();
    }

    fn notify(&self, notification: &Notification) {
        self.inner.notifier.notify(notification);
    }

    fn publish(&self) {
        let view = self.view();
        for observer in self.inner.observers.borrow().iter() {
            observer(&view);
        }
    }
}
