use crate::demo::{self, DemoArgs};
use crate::session;
use crate::validate::{self, ValidateArgs};
use clap::{Args, Parser, Subcommand};
use details_form::config::{AppConfig, FormConfig};
use details_form::error::AppError;
use details_form::form::ValidationMode;
use details_form::telemetry;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "Basic Details Form",
    about = "Fill in, validate and submit the basic details form from the terminal",
    version
)]
struct Cli {
    #[command(flatten)]
    overrides: FormOverrides,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill in the form interactively (default command)
    Session,
    /// Walk through a scripted fill, validation and submission
    Demo(DemoArgs),
    /// Validate a JSON draft and print the errors or the rendered result
    Validate(ValidateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct FormOverrides {
    /// Override the simulated submission delay in milliseconds
    #[arg(long, global = true)]
    pub(crate) delay_ms: Option<u64>,
    /// Override when fields are validated (on_submit, on_blur, on_change)
    #[arg(long, global = true, value_parser = parse_validation_mode)]
    pub(crate) validation_mode: Option<ValidationMode>,
    /// Accept a submit while an earlier one is still pending
    #[arg(long, global = true)]
    pub(crate) allow_overlapping_submits: bool,
}

impl FormOverrides {
    pub(crate) fn apply(self, config: &mut FormConfig) {
        if let Some(delay_ms) = self.delay_ms {
            config.submit_delay = Duration::from_millis(delay_ms);
        }
        if let Some(mode) = self.validation_mode {
            config.validation_mode = mode;
        }
        if self.allow_overlapping_submits {
            config.allow_overlapping_submits = true;
        }
    }
}

fn parse_validation_mode(raw: &str) -> Result<ValidationMode, String> {
    raw.parse()
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    cli.overrides.apply(&mut config.form);

    telemetry::init(&config.telemetry)?;
    info!(
        ?config.environment,
        mode = ?config.form.validation_mode,
        delay_ms = config.form.submit_delay.as_millis() as u64,
        "basic details form ready"
    );

    match cli.command.unwrap_or(Command::Session) {
        Command::Session => session::run(&config.form).await,
        Command::Demo(args) => demo::run(args, &config.form).await,
        Command::Validate(args) => validate::run(args, &config.form),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_configured_values() {
        let cli = Cli::try_parse_from([
            "details-form",
            "demo",
            "--delay-ms",
            "10",
            "--validation-mode",
            "on_blur",
        ])
        .expect("arguments parse");

        let mut config = FormConfig::default();
        cli.overrides.apply(&mut config);
        assert_eq!(config.submit_delay, Duration::from_millis(10));
        assert_eq!(config.validation_mode, ValidationMode::OnBlur);
        assert!(!config.allow_overlapping_submits);
        assert!(matches!(cli.command, Some(Command::Demo(_))));
    }

    #[test]
    fn session_is_the_default_command() {
        let cli = Cli::try_parse_from(["details-form"]).expect("no arguments");
        assert!(cli.command.is_none());
    }

    #[test]
    fn unknown_validation_mode_is_rejected() {
        let result = Cli::try_parse_from(["details-form", "--validation-mode", "eager"]);
        assert!(result.is_err());
    }
}
