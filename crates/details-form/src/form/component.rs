use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::warn;

use crate::config::FormConfig;

use super::controller::{FormController, FormError};
use super::domain::{EntryId, Gender, Submission, TechStackEntry};
use super::render::ResultView;
use super::rules::{FieldErrors, FieldPath};
use super::submission::{lock, SharedDisplay, SubmissionHandler};

/// Input coming from the host UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Change { path: FieldPath, value: String },
    SelectGender(Option<Gender>),
    Blur(FieldPath),
    AppendTechStack,
    RemoveTechStack(usize),
    MoveTechStack { from: usize, to: usize },
    Submit,
    Reset,
}

/// What a submit trigger did.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The draft was valid; the handle resolves once the snapshot is published.
    Started(JoinHandle<()>),
    Invalid(FieldErrors),
    /// An earlier submission is still pending.
    Busy,
}

#[derive(Debug)]
pub enum EventOutcome {
    Updated,
    Appended(EntryId),
    Removed(Option<TechStackEntry>),
    Moved(bool),
    Submit(SubmitOutcome),
}

/// The basic details form: controller, submission handler and display state.
pub struct DetailsForm {
    controller: FormController,
    handler: SubmissionHandler,
    display: SharedDisplay,
    allow_overlapping_submits: bool,
}

impl DetailsForm {
    pub fn new(config: &FormConfig) -> Self {
        Self::with_handler(config, SubmissionHandler::simulated(config.submit_delay))
    }

    pub fn with_handler(config: &FormConfig, handler: SubmissionHandler) -> Self {
        Self {
            controller: FormController::with_standard_fields(config.validation_mode),
            handler,
            display: SharedDisplay::default(),
            allow_overlapping_submits: config.allow_overlapping_submits,
        }
    }

    pub fn controller(&self) -> &FormController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut FormController {
        &mut self.controller
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.display).is_loading()
    }

    pub fn last_submitted(&self) -> Option<Submission> {
        lock(&self.display).last_submitted().cloned()
    }

    pub fn result_view(&self) -> ResultView {
        ResultView::project(lock(&self.display).last_submitted())
    }

    /// Validates the draft and, if it passes, starts the submission in the background.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit(&mut self) -> SubmitOutcome {
        if !self.allow_overlapping_submits && self.is_loading() {
            warn!("submission already pending, ignoring submit");
            return SubmitOutcome::Busy;
        }

        match self.controller.handle_submit() {
            Ok(submission) => SubmitOutcome::Started(self.handler.spawn(&self.display, submission)),
            Err(errors) => SubmitOutcome::Invalid(errors),
        }
    }

    /// Clears the draft. The last submitted snapshot stays on display.
    pub fn reset(&mut self) {
        self.controller.reset();
    }

    pub fn dispatch(&mut self, event: FormEvent) -> Result<EventOutcome, FormError> {
        let outcome = match event {
            FormEvent::Change { path, value } => {
                self.controller.set_value(path, value)?;
                EventOutcome::Updated
            }
            FormEvent::SelectGender(choice) => {
                self.controller.select_gender(choice);
                EventOutcome::Updated
            }
            FormEvent::Blur(path) => {
                self.controller.blur(path);
                EventOutcome::Updated
            }
            FormEvent::AppendTechStack => {
                EventOutcome::Appended(self.controller.append_tech_stack_entry())
            }
            FormEvent::RemoveTechStack(index) => {
                EventOutcome::Removed(self.controller.remove_tech_stack_entry(index))
            }
            FormEvent::MoveTechStack { from, to } => {
                EventOutcome::Moved(self.controller.move_tech_stack_entry(from, to))
            }
            FormEvent::Submit => EventOutcome::Submit(self.submit()),
            FormEvent::Reset => {
                self.reset();
                EventOutcome::Updated
            }
        };
        Ok(outcome)
    }

    /// Shares the display state, e.g. with a host that renders on its own schedule.
    pub fn display(&self) -> SharedDisplay {
        Arc::clone(&self.display)
    }
}
