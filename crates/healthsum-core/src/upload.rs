//! Upload lifecycle state machine
//!
//! The controller is synchronous and holds no I/O. A driver (see
//! [`crate::dashboard`]) calls [`UploadController::submit`], ticks progress
//! while the request is in flight and hands the response back through
//! [`UploadController::resolve`]. Every attempt gets a fresh [`AttemptId`]
//! so that a late response from a superseded attempt is ignored.

use rand::Rng;
use serde::Serialize;

use crate::error::ServiceError;
use crate::highlight::{Span, TermHighlighter};
use crate::model::{Document, Notification, NotificationLevel, SummaryResult};
use crate::progress::ProgressSimulator;
use crate::validation::FileValidator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UploadPhase {
    Idle,
    Validating,
    Uploading,
    Succeeded,
    Failed,
}

impl UploadPhase {
    /// Whether the lifecycle allows moving from `self` to `next`
    pub fn can_transition_to(self, next: UploadPhase) -> bool {
        use UploadPhase::*;
        matches!(
            (self, next),
            (Idle, Validating)
                // a new submission supersedes the attempt in flight
                | (Uploading, Validating)
                | (Validating, Uploading)
                | (Validating, Failed)
                | (Uploading, Succeeded)
                | (Uploading, Failed)
                | (Succeeded, Idle)
                | (Failed, Idle)
                // a rejected file while another upload keeps running
                | (Failed, Uploading)
        )
    }
}

/// Identity of one validate→upload→outcome cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AttemptId(u64);

impl AttemptId {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttemptStatus {
    Pending,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone)]
pub struct UploadAttempt {
    pub id: AttemptId,
    pub document: Document,
    pub progress: ProgressSimulator,
    pub status: AttemptStatus,
}

/// What happened to a submission before the network
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Validation passed; the caller must send the request for this attempt
    Started(AttemptId),
    /// Validation failed; nothing is sent
    Rejected(Notification),
}

/// What happened when a response came back
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The response belonged to the current attempt and was applied
    Applied {
        status: AttemptStatus,
        notification: Notification,
        /// The history list should be refreshed (fire-and-forget)
        refresh_history: bool,
    },
    /// The attempt had already been replaced; the response was dropped
    Superseded,
}

/// The result on screen together with its highlighted rendering
#[derive(Debug, Clone)]
struct DisplayedResult {
    result: SummaryResult,
    spans: Vec<Span>,
}

impl DisplayedResult {
    fn new(result: SummaryResult) -> Self {
        let spans = TermHighlighter::new(&result.detected_terms).spans(&result.summary_text);
        Self { result, spans }
    }
}

#[derive(Debug)]
pub struct UploadController {
    validator: FileValidator,
    phase: UploadPhase,
    last_id: u64,
    attempt: Option<UploadAttempt>,
    displayed: Option<DisplayedResult>,
}

impl Default for UploadController {
    fn default() -> Self {
        Self::new(FileValidator::default())
    }
}

impl UploadController {
    pub fn new(validator: FileValidator) -> Self {
        Self {
            validator,
            phase: UploadPhase::Idle,
            last_id: 0,
            attempt: None,
            displayed: None,
        }
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    /// The latest attempt, pending or finished
    pub fn attempt(&self) -> Option<&UploadAttempt> {
        self.attempt.as_ref()
    }

    pub fn result(&self) -> Option<&SummaryResult> {
        self.displayed.as_ref().map(|displayed| &displayed.result)
    }

    /// Highlighted spans of the displayed result, rendered once when stored
    pub fn result_spans(&self) -> Option<&[Span]> {
        self.displayed.as_ref().map(|displayed| displayed.spans.as_slice())
    }

    pub fn is_uploading(&self) -> bool {
        self.phase == UploadPhase::Uploading
    }

    pub fn is_current(&self, id: AttemptId) -> bool {
        self.attempt
            .as_ref()
            .is_some_and(|attempt| attempt.id == id && attempt.status == AttemptStatus::Pending)
    }

    /// Validate a document and, if accepted, open a new attempt
    ///
    /// An attempt already in flight is superseded: its progress stops and
    /// its eventual response will be reported as [`Resolution::Superseded`].
    pub fn submit(&mut self, document: Document) -> Submission {
        self.transition(UploadPhase::Validating);

        if let Err(reason) = self.validator.validate(&document) {
            tracing::info!(file = %document.name, %reason, "Upload rejected by validation");
            self.transition(UploadPhase::Failed);
            if self.has_pending_attempt() {
                self.transition(UploadPhase::Uploading);
            } else {
                self.transition(UploadPhase::Idle);
            }
            return Submission::Rejected(Notification::new(
                NotificationLevel::Error,
                "File Validation Error",
                reason.to_string(),
            ));
        }

        if let Some(previous) = self.attempt.as_mut() {
            if previous.status == AttemptStatus::Pending {
                tracing::debug!(attempt = previous.id.value(), "Superseding attempt in flight");
                previous.progress.abandon();
                previous.status = AttemptStatus::Failed;
            }
        }

        self.last_id += 1;
        let id = AttemptId(self.last_id);
        tracing::debug!(attempt = id.value(), file = %document.name, "Starting upload attempt");
        self.attempt = Some(UploadAttempt {
            id,
            document,
            progress: ProgressSimulator::started(),
            status: AttemptStatus::Pending,
        });
        self.transition(UploadPhase::Uploading);

        Submission::Started(id)
    }

    /// Advance the simulated progress of `id` if it is still current
    pub fn tick<R: Rng>(&mut self, id: AttemptId, rng: &mut R) -> Option<f64> {
        self.pending_attempt(id)?.progress.tick(rng)
    }

    /// Apply the response of attempt `id`
    ///
    /// The progress timer is stopped before the terminal state is applied.
    /// A failure leaves any previously shown result untouched.
    pub fn resolve(
        &mut self,
        id: AttemptId,
        outcome: Result<SummaryResult, ServiceError>,
    ) -> Resolution {
        let Some(attempt) = self.pending_attempt(id) else {
            tracing::debug!(attempt = id.value(), "Ignoring response of superseded attempt");
            return Resolution::Superseded;
        };

        match outcome {
            Ok(result) => {
                attempt.progress.complete();
                attempt.status = AttemptStatus::Succeeded;
                let name = attempt.document.name.clone();
                tracing::info!(attempt = id.value(), file = %name, "Upload succeeded");

                self.transition(UploadPhase::Succeeded);
                self.displayed = Some(DisplayedResult::new(result));
                self.transition(UploadPhase::Idle);

                Resolution::Applied {
                    status: AttemptStatus::Succeeded,
                    notification: Notification::new(
                        NotificationLevel::Success,
                        "Upload Successful",
                        format!("Successfully processed {}", name),
                    ),
                    refresh_history: true,
                }
            }
            Err(error) => {
                attempt.progress.abandon();
                attempt.status = AttemptStatus::Failed;
                tracing::warn!(attempt = id.value(), %error, "Upload failed");

                self.transition(UploadPhase::Failed);
                self.transition(UploadPhase::Idle);

                Resolution::Applied {
                    status: AttemptStatus::Failed,
                    notification: Notification::new(
                        NotificationLevel::Error,
                        "Upload Failed",
                        error.user_message(),
                    ),
                    refresh_history: false,
                }
            }
        }
    }

    /// Replace the displayed result (history selection)
    pub fn show_result(&mut self, result: SummaryResult) {
        self.displayed = Some(DisplayedResult::new(result));
    }

    fn has_pending_attempt(&self) -> bool {
        self.attempt
            .as_ref()
            .is_some_and(|attempt| attempt.status == AttemptStatus::Pending)
    }

    fn pending_attempt(&mut self, id: AttemptId) -> Option<&mut UploadAttempt> {
        self.attempt
            .as_mut()
            .filter(|attempt| attempt.id == id && attempt.status == AttemptStatus::Pending)
    }

    fn transition(&mut self, next: UploadPhase) {
        if !self.phase.can_transition_to(next) {
            tracing::error!(from = ?self.phase, to = ?next, "Refusing illegal upload transition");
            return;
        }
        tracing::debug!(from = ?self.phase, to = ?next, "Upload phase");
        self.phase = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn labs_csv() -> Document {
        Document::new("labs.csv", 2 * 1024 * 1024, "text/csv")
    }

    fn summary(text: &str) -> SummaryResult {
        SummaryResult {
            summary_text: text.to_string(),
            filename: "labs.csv".to_string(),
            page_count: None,
            sentence_count: None,
            detected_terms: vec![],
        }
    }

    fn started(submission: Submission) -> AttemptId {
        match submission {
            Submission::Started(id) => id,
            Submission::Rejected(n) => panic!("unexpected rejection: {:?}", n),
        }
    }

    #[test]
    fn test_transition_table() {
        use UploadPhase::*;
        assert!(Idle.can_transition_to(Validating));
        assert!(Validating.can_transition_to(Failed));
        assert!(Uploading.can_transition_to(Validating));
        assert!(!Idle.can_transition_to(Uploading));
        assert!(!Succeeded.can_transition_to(Uploading));
        assert!(!Failed.can_transition_to(Succeeded));
    }

    #[test]
    fn test_rejected_submission_returns_to_idle() {
        let mut controller = UploadController::default();
        let submission = controller.submit(Document::new("scan.pdf", 20 * 1024 * 1024, ""));

        match submission {
            Submission::Rejected(notification) => {
                assert_eq!(notification.level, NotificationLevel::Error);
                assert_eq!(notification.title, "File Validation Error");
                assert!(notification.description.contains("20.0MB"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(controller.phase(), UploadPhase::Idle);
        assert!(controller.attempt().is_none());
        assert!(controller.result().is_none());
    }

    #[test]
    fn test_accepted_submission_starts_uploading() {
        let mut controller = UploadController::default();
        let id = started(controller.submit(labs_csv()));

        assert_eq!(controller.phase(), UploadPhase::Uploading);
        let attempt = controller.attempt().unwrap();
        assert_eq!(attempt.id, id);
        assert_eq!(attempt.status, AttemptStatus::Pending);
        assert_eq!(attempt.progress.percent(), 0.0);
    }

    #[test]
    fn test_success_stores_result_and_completes_progress() {
        let mut controller = UploadController::default();
        let id = started(controller.submit(labs_csv()));

        let resolution = controller.resolve(id, Ok(summary("Hemoglobin normal.")));

        assert_eq!(
            resolution,
            Resolution::Applied {
                status: AttemptStatus::Succeeded,
                notification: Notification::new(
                    NotificationLevel::Success,
                    "Upload Successful",
                    "Successfully processed labs.csv"
                ),
                refresh_history: true,
            }
        );
        assert_eq!(controller.phase(), UploadPhase::Idle);
        assert_eq!(controller.attempt().unwrap().progress.percent(), 100.0);
        assert_eq!(
            controller.result().unwrap().summary_text,
            "Hemoglobin normal."
        );
    }

    #[test]
    fn test_stored_result_carries_rendered_spans() {
        let mut controller = UploadController::default();
        assert!(controller.result_spans().is_none());

        let mut result = summary("Hemoglobin normal.");
        result.detected_terms = vec!["hemoglobin".to_string()];
        controller.show_result(result);

        let spans = controller.result_spans().unwrap();
        assert_eq!(spans.len(), 3);
        assert!(spans[1].highlighted);
        assert_eq!(spans[1].text, "Hemoglobin");
    }

    #[test]
    fn test_failure_keeps_previous_result() {
        let mut controller = UploadController::default();
        let first = started(controller.submit(labs_csv()));
        controller.resolve(first, Ok(summary("first")));

        let second = started(controller.submit(labs_csv()));
        let resolution = controller.resolve(
            second,
            Err(ServiceError::Server {
                status: 502,
                status_text: "Bad Gateway".to_string(),
            }),
        );

        match resolution {
            Resolution::Applied {
                status,
                notification,
                refresh_history,
            } => {
                assert_eq!(status, AttemptStatus::Failed);
                assert_eq!(notification.title, "Upload Failed");
                assert_eq!(notification.description, "Server responded with 502: Bad Gateway");
                assert!(!refresh_history);
            }
            Resolution::Superseded => panic!("response should apply"),
        }
        assert_eq!(controller.result().unwrap().summary_text, "first");
        assert_eq!(controller.attempt().unwrap().progress.percent(), 0.0);
    }

    #[test]
    fn test_late_response_of_superseded_attempt_is_ignored() {
        let mut controller = UploadController::default();
        let first = started(controller.submit(labs_csv()));
        let second = started(controller.submit(labs_csv()));
        assert!(second > first);

        assert_eq!(
            controller.resolve(second, Ok(summary("second"))),
            Resolution::Applied {
                status: AttemptStatus::Succeeded,
                notification: Notification::new(
                    NotificationLevel::Success,
                    "Upload Successful",
                    "Successfully processed labs.csv"
                ),
                refresh_history: true,
            }
        );
        assert_eq!(
            controller.resolve(first, Ok(summary("first"))),
            Resolution::Superseded
        );
        assert_eq!(controller.result().unwrap().summary_text, "second");
    }

    #[test]
    fn test_response_is_applied_once() {
        let mut controller = UploadController::default();
        let id = started(controller.submit(labs_csv()));
        controller.resolve(id, Ok(summary("once")));

        assert_eq!(
            controller.resolve(id, Err(ServiceError::Parse("late".to_string()))),
            Resolution::Superseded
        );
        assert_eq!(controller.result().unwrap().summary_text, "once");
    }

    #[test]
    fn test_ticks_only_for_current_attempt() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut controller = UploadController::default();
        let first = started(controller.submit(labs_csv()));
        assert!(controller.tick(first, &mut rng).is_some());

        let second = started(controller.submit(labs_csv()));
        assert_eq!(controller.tick(first, &mut rng), None);
        assert!(controller.tick(second, &mut rng).is_some());

        controller.resolve(second, Ok(summary("done")));
        assert_eq!(controller.tick(second, &mut rng), None);
    }

    #[test]
    fn test_new_attempt_resets_progress() {
        let mut controller = UploadController::default();
        let first = started(controller.submit(labs_csv()));
        for _ in 0..5 {
            controller.tick(first, &mut StdRng::seed_from_u64(3));
        }
        started(controller.submit(labs_csv()));
        assert_eq!(controller.attempt().unwrap().progress.percent(), 0.0);
    }

    #[test]
    fn test_rejection_during_upload_keeps_attempt() {
        let mut controller = UploadController::default();
        let id = started(controller.submit(labs_csv()));

        let rejected = controller.submit(Document::new("notes.txt", 10, "text/plain"));
        assert!(matches!(rejected, Submission::Rejected(_)));

        // The rejected file never becomes an attempt; the upload in flight stays current
        assert!(controller.is_current(id));
        assert_eq!(controller.phase(), UploadPhase::Uploading);
        assert!(matches!(
            controller.resolve(id, Ok(summary("kept"))),
            Resolution::Applied { .. }
        ));
        assert_eq!(controller.phase(), UploadPhase::Idle);
    }
}
