use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::domain::Submission;

/// Side effect performed for a validated submission.
#[async_trait]
pub trait SubmitEffect: Send + Sync {
    async fn perform(&self, submission: &Submission) -> Result<(), SubmitError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("submission effect failed: {0}")]
    Effect(String),
}

/// Stand-in for a network call: waits a fixed delay and succeeds.
#[derive(Debug, Clone)]
pub struct SimulatedDelay {
    delay: Duration,
}

impl SimulatedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl SubmitEffect for SimulatedDelay {
    async fn perform(&self, _submission: &Submission) -> Result<(), SubmitError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// State the result view reads: the loading flag and the last completed submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayState {
    /// Submissions in flight; more than one only when overlapping submits are allowed.
    pending: usize,
    last_submitted: Option<Submission>,
}

impl DisplayState {
    pub fn is_loading(&self) -> bool {
        self.pending > 0
    }

    pub fn last_submitted(&self) -> Option<&Submission> {
        self.last_submitted.as_ref()
    }
}

pub type SharedDisplay = Arc<Mutex<DisplayState>>;

pub(crate) fn lock(state: &Mutex<DisplayState>) -> MutexGuard<'_, DisplayState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds the loading flag for the lifetime of one submission and clears it on drop,
/// whichever way the submission ends.
#[derive(Debug)]
pub struct LoadingGuard {
    state: Weak<Mutex<DisplayState>>,
}

impl LoadingGuard {
    pub fn acquire(state: &SharedDisplay) -> Self {
        lock(state).pending += 1;
        Self {
            state: Arc::downgrade(state),
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            let mut display = lock(&state);
            display.pending = display.pending.saturating_sub(1);
        }
    }
}

/// Runs the submit effect in the background and publishes the snapshot on success.
#[derive(Clone)]
pub struct SubmissionHandler {
    effect: Arc<dyn SubmitEffect>,
}

impl SubmissionHandler {
    pub fn new(effect: Arc<dyn SubmitEffect>) -> Self {
        Self { effect }
    }

    pub fn simulated(delay: Duration) -> Self {
        Self::new(Arc::new(SimulatedDelay::new(delay)))
    }

    /// Sets the loading flag and spawns the effect on the current Tokio runtime.
    ///
    /// The task only keeps a weak reference to `state`: if the component is dropped
    /// before the effect finishes, the completion is discarded.
    pub fn spawn(&self, state: &SharedDisplay, submission: Submission) -> JoinHandle<()> {
        let guard = LoadingGuard::acquire(state);
        let target = Arc::downgrade(state);
        let effect = Arc::clone(&self.effect);

        info!(entries = submission.tech_stack.len(), "submission started");

        tokio::spawn(async move {
            let _guard = guard;
            complete(effect.as_ref(), &target, submission).await;
        })
    }
}

async fn complete(
    effect: &dyn SubmitEffect,
    target: &Weak<Mutex<DisplayState>>,
    submission: Submission,
) {
    if let Err(err) = effect.perform(&submission).await {
        error!(error = %err, "submission failed");
        return;
    }

    match target.upgrade() {
        Some(state) => {
            let entries = submission.tech_stack.len();
            lock(&state).last_submitted = Some(submission);
            debug!(entries, "submission completed");
            info!("submission published");
        }
        None => debug!("form dropped before submission completed, discarding result"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::domain::{Gender, TechStackEntry};
    use chrono::NaiveDate;
    use std::io;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap_or_else(PoisonError::into_inner))
                .into_owned()
        }
    }

    struct Failing;

    #[async_trait]
    impl SubmitEffect for Failing {
        async fn perform(&self, _submission: &Submission) -> Result<(), SubmitError> {
            Err(SubmitError::Effect("upstream unavailable".to_string()))
        }
    }

    fn submission() -> Submission {
        Submission {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            gender: Gender::Male,
            date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 4).expect("valid date"),
            email: "johndoe@email.com".to_string(),
            phone_number: "+919876543210".to_string(),
            tech_stack: vec![TechStackEntry {
                value: "Rust".to_string(),
                ..TechStackEntry::blank()
            }],
        }
    }

    #[test]
    fn guard_clears_flag_on_drop() {
        let state = SharedDisplay::default();
        let guard = LoadingGuard::acquire(&state);
        assert!(lock(&state).is_loading());
        drop(guard);
        assert!(!lock(&state).is_loading());
    }

    #[test]
    fn guard_outliving_state_is_harmless() {
        let state = SharedDisplay::default();
        let guard = LoadingGuard::acquire(&state);
        drop(state);
        drop(guard);
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_delay_publishes_after_the_wait() {
        let state = SharedDisplay::default();
        let handler = SubmissionHandler::simulated(Duration::from_secs(3));

        let draft = submission();
        let task = handler.spawn(&state, draft.clone());
        assert!(lock(&state).is_loading());

        tokio::time::sleep(Duration::from_millis(2_900)).await;
        assert!(lock(&state).last_submitted().is_none());
        assert!(lock(&state).is_loading());

        task.await.expect("task joins");
        let display = lock(&state).clone();
        assert!(!display.is_loading());
        assert_eq!(display.last_submitted(), Some(&draft));
    }

    #[tokio::test(start_paused = true)]
    async fn failing_effect_clears_flag_and_keeps_previous_snapshot() {
        let state = SharedDisplay::default();
        let handler = SubmissionHandler::new(Arc::new(Failing));

        handler
            .spawn(&state, submission())
            .await
            .expect("task joins");

        let display = lock(&state);
        assert!(!display.is_loading());
        assert!(display.last_submitted().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn completion_after_teardown_is_a_no_op() {
        let state = SharedDisplay::default();
        let handler = SubmissionHandler::simulated(Duration::from_secs(3));

        let task = handler.spawn(&state, submission());
        drop(state);

        task.await.expect("task finishes without panicking");
    }

    #[tokio::test(start_paused = true)]
    async fn logs_carry_no_personal_details() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .without_time()
            .with_writer(move || writer.clone())
            .finish();
        let _default = tracing::subscriber::set_default(subscriber);

        let state = SharedDisplay::default();
        SubmissionHandler::simulated(Duration::from_secs(3))
            .spawn(&state, submission())
            .await
            .expect("task joins");

        let text = logs.text();
        assert!(text.contains("submission started"));
        assert!(text.contains("submission completed"));
        for personal in ["John", "Doe", "johndoe@email.com", "+919876543210", "1990"] {
            assert!(!text.contains(personal), "log leaked {personal}: {text}");
        }
    }
}
