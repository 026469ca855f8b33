use crate::session::{render_errors, render_form};
use clap::Args;
use details_form::config::FormConfig;
use details_form::error::AppError;
use details_form::form::{DetailsForm, FieldPath, FormEvent, Gender, SubmitOutcome};
use serde_json::json;
use tracing::warn;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print the submitted snapshot and the rendered result as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

fn change(path: FieldPath, value: &str) -> FormEvent {
    FormEvent::Change {
        path,
        value: value.to_string(),
    }
}

/// Events a user would produce filling the form with one typo in the phone number.
fn scripted_fill() -> Vec<FormEvent> {
    vec![
        change(FieldPath::FirstName, "John"),
        change(FieldPath::LastName, "Doe"),
        FormEvent::SelectGender(Some(Gender::Other)),
        change(FieldPath::DateOfBirth, "1990-05-04"),
        change(FieldPath::Email, "johndoe@email.com"),
        change(FieldPath::PhoneNumber, "+910987654321"),
        change(FieldPath::TechStackEntry(0), "React Native"),
        FormEvent::AppendTechStack,
        change(FieldPath::TechStackEntry(1), "Rust"),
        FormEvent::AppendTechStack,
    ]
}

pub(crate) async fn run(args: DemoArgs, config: &FormConfig) -> Result<(), AppError> {
    let mut form = DetailsForm::new(config);

    println!("Basic details form demo");
    println!("\nSubmitting an empty form");
    report_rejection(form.submit());

    for event in scripted_fill() {
        form.dispatch(event)?;
    }

    println!("\nDraft after filling in (phone number has a leading zero, last entry is blank)");
    println!("{}", render_form(&form));
    println!("\nSubmitting");
    report_rejection(form.submit());

    form.dispatch(change(FieldPath::PhoneNumber, "+919876543210"))?;
    form.dispatch(FormEvent::RemoveTechStack(2))?;
    form.dispatch(FormEvent::RemoveTechStack(0))?;

    println!(
        "\nFixed the phone number and removed the blank entry; submitting (waits {} ms)",
        config.submit_delay.as_millis()
    );
    match form.submit() {
        SubmitOutcome::Started(handle) => {
            if let Err(err) = handle.await {
                warn!(error = %err, "submission task ended abnormally");
            }
        }
        other => {
            report_rejection(other);
            return Ok(());
        }
    }

    let view = form.result_view();
    if args.json {
        let payload = json!({
            "submission": form.last_submitted(),
            "result": view,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("\n{view}");
    }

    form.reset();
    println!("\nAfter reset the draft is empty but the last result stays on display");
    println!("{}", render_form(&form));
    println!("\n{}", form.result_view());

    Ok(())
}

fn report_rejection(outcome: SubmitOutcome) {
    match outcome {
        SubmitOutcome::Invalid(errors) => {
            println!("Rejected with {} error(s):", errors.len());
            print!("{}", render_errors(&errors));
        }
        SubmitOutcome::Busy => println!("Rejected: a submission is already in progress"),
        SubmitOutcome::Started(_) => println!("Unexpectedly accepted"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use details_form::form::ErrorKind;

    #[tokio::test]
    async fn scripted_fill_fails_only_on_phone_and_blank_entry() {
        let mut form = DetailsForm::new(&FormConfig::default());
        for event in scripted_fill() {
            form.dispatch(event).expect("scripted event applies");
        }

        match form.submit() {
            SubmitOutcome::Invalid(errors) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(
                    errors.kind_of(&FieldPath::PhoneNumber),
                    Some(ErrorKind::Pattern)
                );
                assert_eq!(
                    errors.kind_of(&FieldPath::TechStackEntry(2)),
                    Some(ErrorKind::Required)
                );
            }
            other => panic!("expected the scripted draft to be rejected, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn demo_runs_to_completion() {
        run(DemoArgs { json: true }, &FormConfig::default())
            .await
            .expect("demo completes");
    }
}
