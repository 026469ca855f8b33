use clap::Args;
use details_form::config::FormConfig;
use details_form::error::AppError;
use details_form::form::{
    FieldErrors, FormController, FormValues, ResultView, Submission, ValidationMode,
};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// JSON draft with the form's camelCase keys; read from stdin when omitted
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ValidationReport {
    pub(crate) valid: bool,
    pub(crate) errors: FieldErrors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) submission: Option<Submission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) result: Option<ResultView>,
}

pub(crate) fn validate_values(values: FormValues, mode: ValidationMode) -> ValidationReport {
    let mut controller = FormController::with_standard_fields(mode);
    controller.load_values(values);

    match controller.handle_submit() {
        Ok(submission) => ValidationReport {
            valid: true,
            errors: FieldErrors::default(),
            result: Some(ResultView::project(Some(&submission))),
            submission: Some(submission),
        },
        Err(errors) => ValidationReport {
            valid: false,
            errors,
            submission: None,
            result: None,
        },
    }
}

pub(crate) fn run(args: ValidateArgs, config: &FormConfig) -> Result<(), AppError> {
    let raw = match args.input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let values: FormValues = serde_json::from_str(&raw)?;
    let report = validate_values(values, config.validation_mode);
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.valid {
        Ok(())
    } else {
        Err(AppError::InvalidSubmission {
            invalid_fields: report.errors.len(),
        })
    }
}
