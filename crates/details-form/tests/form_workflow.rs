//! Integration specifications for the basic details form.
//!
//! Scenarios drive the public component the way a host UI does: input events in,
//! submit outcomes and the rendered result out. Timers run on paused Tokio time so the
//! simulated three second submission completes instantly.

mod common {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use details_form::config::FormConfig;
    use details_form::form::{
        DetailsForm, FieldPath, FormEvent, Gender, Submission, SubmissionHandler, SubmitEffect,
        SubmitError,
    };

    pub(super) fn config() -> FormConfig {
        FormConfig::default()
    }

    pub(super) fn change(form: &mut DetailsForm, path: FieldPath, value: &str) {
        form.dispatch(FormEvent::Change {
            path,
            value: value.to_string(),
        })
        .expect("change accepted");
    }

    pub(super) fn fill_valid(form: &mut DetailsForm) {
        change(form, FieldPath::FirstName, "John");
        change(form, FieldPath::LastName, "Doe");
        form.dispatch(FormEvent::SelectGender(Some(Gender::Other)))
            .expect("gender selected");
        change(form, FieldPath::DateOfBirth, "1990-05-04");
        change(form, FieldPath::Email, "johndoe@email.com");
        change(form, FieldPath::PhoneNumber, "+911234567890");
        change(form, FieldPath::TechStackEntry(0), "React Native");
    }

    pub(super) struct Unreachable;

    #[async_trait]
    impl SubmitEffect for Unreachable {
        async fn perform(&self, _submission: &Submission) -> Result<(), SubmitError> {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Err(SubmitError::Effect("backend unreachable".to_string()))
        }
    }

    pub(super) fn failing_form() -> DetailsForm {
        DetailsForm::with_handler(&config(), SubmissionHandler::new(Arc::new(Unreachable)))
    }
}

use std::time::Duration;

use common::*;
use details_form::config::FormConfig;
use details_form::form::{
    DetailsForm, ErrorKind, EventOutcome, FieldPath, FormEvent, Gender, SubmitOutcome,
};

fn started(outcome: SubmitOutcome) -> tokio::task::JoinHandle<()> {
    match outcome {
        SubmitOutcome::Started(handle) => handle,
        other => panic!("expected submission to start, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn empty_submit_reports_required_for_every_field() {
    let mut form = DetailsForm::new(&config());

    match form.submit() {
        SubmitOutcome::Invalid(errors) => {
            assert_eq!(errors.len(), 7);
            assert!(errors
                .iter()
                .all(|(_, error)| error.kind == ErrorKind::Required));
        }
        other => panic!("expected validation errors, got {other:?}"),
    }
    assert!(!form.is_loading());
    assert!(form.last_submitted().is_none());
}

#[tokio::test(start_paused = true)]
async fn pattern_errors_block_submission() {
    let mut form = DetailsForm::new(&config());
    fill_valid(&mut form);
    change(&mut form, FieldPath::FirstName, "John1");
    change(&mut form, FieldPath::PhoneNumber, "+910234567890");

    match form.submit() {
        SubmitOutcome::Invalid(errors) => {
            assert_eq!(errors.len(), 2);
            assert_eq!(
                errors.kind_of(&FieldPath::FirstName),
                Some(ErrorKind::Pattern)
            );
            assert_eq!(
                errors.kind_of(&FieldPath::PhoneNumber),
                Some(ErrorKind::Pattern)
            );
        }
        other => panic!("expected validation errors, got {other:?}"),
    }

    change(&mut form, FieldPath::FirstName, "John");
    assert!(form.controller().error(&FieldPath::FirstName).is_none());
    assert!(form.controller().error(&FieldPath::PhoneNumber).is_some());
}

#[tokio::test(start_paused = true)]
async fn valid_submission_renders_after_three_seconds() {
    let mut form = DetailsForm::new(&config());
    fill_valid(&mut form);
    form.dispatch(FormEvent::AppendTechStack).expect("append");
    change(&mut form, FieldPath::TechStackEntry(1), "Rust");

    let handle = started(form.submit());
    assert!(form.is_loading());

    tokio::time::sleep(Duration::from_millis(2_999)).await;
    assert!(form.last_submitted().is_none());
    assert_eq!(form.result_view().gender, "");

    handle.await.expect("submission task joins");
    assert!(!form.is_loading());

    let view = form.result_view();
    assert_eq!(view.first_name, "John");
    assert_eq!(view.last_name, "Doe");
    assert_eq!(view.gender, "Other");
    assert_eq!(view.date_of_birth, "04-May-1990");
    assert_eq!(view.tech_stack, "React Native, Rust");

    let snapshot = form.last_submitted().expect("snapshot stored");
    assert_eq!(snapshot.gender, Gender::Other);
    assert_eq!(snapshot.phone_number, "+911234567890");
}

#[tokio::test(start_paused = true)]
async fn reset_clears_draft_but_keeps_last_result() {
    let mut form = DetailsForm::new(&config());
    fill_valid(&mut form);
    started(form.submit()).await.expect("submission task joins");

    form.dispatch(FormEvent::Reset).expect("reset");

    let values = form.controller().values();
    assert_eq!(values.first_name, "");
    assert!(values.gender.is_none());
    assert_eq!(values.tech_stack.len(), 1);
    assert_eq!(values.tech_stack[0].value, "");
    assert!(form.controller().errors().is_empty());
    assert_eq!(form.result_view().first_name, "John");
}

#[tokio::test(start_paused = true)]
async fn second_submit_while_pending_is_rejected() {
    let mut form = DetailsForm::new(&config());
    fill_valid(&mut form);

    let handle = started(form.submit());
    assert!(matches!(form.submit(), SubmitOutcome::Busy));
    assert_eq!(form.controller().submit_count(), 1);

    handle.await.expect("submission task joins");
    assert!(matches!(form.submit(), SubmitOutcome::Started(_)));
}

#[tokio::test(start_paused = true)]
async fn overlapping_submits_can_be_allowed() {
    let config = FormConfig {
        allow_overlapping_submits: true,
        ..FormConfig::default()
    };
    let mut form = DetailsForm::new(&config);
    fill_valid(&mut form);

    let first = started(form.submit());
    tokio::time::sleep(Duration::from_secs(1)).await;
    change(&mut form, FieldPath::FirstName, "Jane");
    let second = started(form.submit());

    first.await.expect("first joins");
    assert_eq!(form.result_view().first_name, "John");
    assert!(form.is_loading(), "second submission still pending");
    second.await.expect("second joins");
    assert_eq!(form.result_view().first_name, "Jane");
    assert!(!form.is_loading());
}

#[tokio::test(start_paused = true)]
async fn failed_effect_is_swallowed_and_loading_cleared() {
    let mut form = failing_form();
    fill_valid(&mut form);

    let handle = started(form.submit());
    assert!(form.is_loading());
    handle.await.expect("task joins without panicking");

    assert!(!form.is_loading());
    assert!(form.last_submitted().is_none());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_form_mid_submission_is_harmless() {
    let mut form = DetailsForm::new(&config());
    fill_valid(&mut form);
    let display = form.display();
    let handle = started(form.submit());
    drop(form);
    drop(display);

    handle.await.expect("late completion is a no-op");
}

#[tokio::test(start_paused = true)]
async fn tech_stack_identity_survives_removal() {
    let mut form = DetailsForm::new(&config());
    let first = match form.dispatch(FormEvent::AppendTechStack).expect("append") {
        EventOutcome::Appended(id) => id,
        other => panic!("expected append, got {other:?}"),
    };
    let second = match form.dispatch(FormEvent::AppendTechStack).expect("append") {
        EventOutcome::Appended(id) => id,
        other => panic!("expected append, got {other:?}"),
    };
    assert_ne!(first, second);
    assert_eq!(form.controller().tech_stack().len(), 3);

    match form.dispatch(FormEvent::RemoveTechStack(0)).expect("remove") {
        EventOutcome::Removed(None) => {}
        other => panic!("first slot must stay, got {other:?}"),
    }

    form.dispatch(FormEvent::RemoveTechStack(1)).expect("remove");
    let slots = form.controller().tech_stack_slots();
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[1].id, Some(second));
    assert!(!slots[0].removable);
    assert!(slots[1].removable);
}

#[tokio::test(start_paused = true)]
async fn blank_tech_stack_entries_block_submission() {
    let mut form = DetailsForm::new(&config());
    fill_valid(&mut form);
    form.dispatch(FormEvent::AppendTechStack).expect("append");

    match form.submit() {
        SubmitOutcome::Invalid(errors) => {
            assert_eq!(errors.len(), 1);
            let error = errors
                .get(&FieldPath::TechStackEntry(1))
                .expect("blank entry flagged");
            assert_eq!(error.kind, ErrorKind::Required);
            assert_eq!(error.message, "Tech stack entry is required");
        }
        other => panic!("expected validation errors, got {other:?}"),
    }

    form.dispatch(FormEvent::RemoveTechStack(1)).expect("remove");
    assert!(form.controller().errors().is_empty());
    assert!(matches!(form.submit(), SubmitOutcome::Started(_)));
}

#[tokio::test(start_paused = true)]
async fn gender_cannot_be_changed_as_text() {
    let mut form = DetailsForm::new(&config());
    let err = form
        .dispatch(FormEvent::Change {
            path: FieldPath::Gender,
            value: "other".to_string(),
        })
        .expect_err("gender is a choice");
    assert!(err.to_string().contains("gender"));
}
