use std::fmt::Write as _;

use details_form::config::FormConfig;
use details_form::error::AppError;
use details_form::form::{
    DetailsForm, EventOutcome, FieldErrors, FieldPath, FormEvent, Gender, SubmitOutcome,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

const HELP: &str = "\
Commands:
  set <field> <value>   change a text field (firstName, lastName, dateOfBirth, email,
                        phoneNumber, techStack.N.value); omit the value to clear it
  gender <choice>       select male, female or other; `none` clears the selection
  blur <field>          leave a field (validates it in on_blur mode)
  add                   append a tech stack entry
  remove <index>        remove a tech stack entry (the first one always stays)
  move <from> <to>      reorder tech stack entries
  submit                validate and submit the form
  reset                 clear the form (the last result stays on display)
  show                  print the current draft and its errors
  result                print the last submitted result
  help                  print this help
  quit                  leave the session";

/// One parsed line of session input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SessionCommand {
    Event(FormEvent),
    Show,
    Result,
    Help,
    Quit,
}

/// Parses a line of input. Blank lines yield `None`.
pub(crate) fn parse_command(line: &str) -> Result<Option<SessionCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim_start()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "set" => {
            let (field, value) = match rest.split_once(char::is_whitespace) {
                Some((field, value)) => (field, value.trim()),
                None => (rest, ""),
            };
            if field.is_empty() {
                return Err("usage: set <field> <value>".to_string());
            }
            let path = parse_path(field)?;
            SessionCommand::Event(FormEvent::Change {
                path,
                value: value.to_string(),
            })
        }
        "gender" => {
            let choice = match rest {
                "" => return Err("usage: gender <male|female|other|none>".to_string()),
                raw if raw.eq_ignore_ascii_case("none") => None,
                raw => Some(raw.parse::<Gender>().map_err(|err| err.to_string())?),
            };
            SessionCommand::Event(FormEvent::SelectGender(choice))
        }
        "blur" => SessionCommand::Event(FormEvent::Blur(parse_path(rest)?)),
        "add" => SessionCommand::Event(FormEvent::AppendTechStack),
        "remove" => SessionCommand::Event(FormEvent::RemoveTechStack(parse_index(rest)?)),
        "move" => {
            let mut parts = rest.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(from), Some(to), None) => SessionCommand::Event(FormEvent::MoveTechStack {
                    from: parse_index(from)?,
                    to: parse_index(to)?,
                }),
                _ => return Err("usage: move <from> <to>".to_string()),
            }
        }
        "submit" => SessionCommand::Event(FormEvent::Submit),
        "reset" => SessionCommand::Event(FormEvent::Reset),
        "show" => SessionCommand::Show,
        "result" => SessionCommand::Result,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" => SessionCommand::Quit,
        other => return Err(format!("unknown command '{other}', type `help` for a list")),
    };

    Ok(Some(command))
}

fn parse_path(raw: &str) -> Result<FieldPath, String> {
    raw.parse::<FieldPath>().map_err(|err| err.to_string())
}

fn parse_index(raw: &str) -> Result<usize, String> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| format!("'{raw}' is not a tech stack index"))
}

pub(crate) async fn run(config: &FormConfig) -> Result<(), AppError> {
    let mut form = DetailsForm::new(config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let (done_tx, mut done_rx) = mpsc::channel::<()>(4);

    println!("Basic details form. Type `help` for commands.");
    println!("{}", render_form(&form));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_command(&line) {
                    Ok(None) => {}
                    Ok(Some(SessionCommand::Quit)) => break,
                    Ok(Some(command)) => handle(&mut form, command, &done_tx),
                    Err(message) => println!("{message}"),
                }
            }
            Some(()) = done_rx.recv() => {
                println!("\n{}", form.result_view());
            }
        }
    }

    Ok(())
}

fn handle(form: &mut DetailsForm, command: SessionCommand, done: &mpsc::Sender<()>) {
    match command {
        SessionCommand::Event(FormEvent::Submit) => match form.submit() {
            SubmitOutcome::Started(handle) => {
                println!("Submitting...");
                let done = done.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle.await {
                        warn!(error = %err, "submission task ended abnormally");
                    }
                    let _ = done.send(()).await;
                });
            }
            SubmitOutcome::Invalid(errors) => print!("{}", render_errors(&errors)),
            SubmitOutcome::Busy => println!("A submission is already in progress."),
        },
        SessionCommand::Event(event) => {
            let changed = match &event {
                FormEvent::Change { path, .. } | FormEvent::Blur(path) => Some(*path),
                FormEvent::SelectGender(_) => Some(FieldPath::Gender),
                _ => None,
            };
            match form.dispatch(event) {
                Ok(EventOutcome::Appended(id)) => {
                    let slots = form.controller().tech_stack().slot_count();
                    println!("Added tech stack entry {} ({id}).", slots - 1);
                }
                Ok(EventOutcome::Removed(None)) => {
                    println!("That tech stack entry cannot be removed.")
                }
                Ok(EventOutcome::Moved(false)) => println!("No such tech stack entries."),
                Ok(_) => {}
                Err(err) => println!("{err}"),
            }
            if let Some(error) = changed.and_then(|path| form.controller().error(&path)) {
                println!("  ! {}", error.message);
            }
        }
        SessionCommand::Show => println!("{}", render_form(form)),
        SessionCommand::Result => println!("{}", form.result_view()),
        SessionCommand::Help => println!("{HELP}"),
        SessionCommand::Quit => {}
    }
}

/// Renders the draft as the host shows it: labelled inputs, tech-stack slots and any
/// errors under the field they belong to.
pub(crate) fn render_form(form: &DetailsForm) -> String {
    let controller = form.controller();
    let values = controller.values();
    let errors = controller.errors();
    let mut out = String::new();

    let scalar = [
        ("First Name", FieldPath::FirstName, values.first_name.as_str()),
        ("Last Name", FieldPath::LastName, values.last_name.as_str()),
        (
            "Gender",
            FieldPath::Gender,
            values.gender.map(|gender| gender.label()).unwrap_or(""),
        ),
        (
            "Date of Birth",
            FieldPath::DateOfBirth,
            values.date_of_birth.as_str(),
        ),
        ("Email Address", FieldPath::Email, values.email.as_str()),
        (
            "Phone Number",
            FieldPath::PhoneNumber,
            values.phone_number.as_str(),
        ),
    ];

    for (label, path, value) in scalar {
        let _ = writeln!(out, "{label:<14} [{path}] {value}");
        if let Some(error) = errors.get(&path) {
            let _ = writeln!(out, "{:<14}   ! {}", "", error.message);
        }
    }

    let _ = writeln!(out, "Tech Stack");
    for slot in controller.tech_stack_slots() {
        let control = if slot.removable { " (x)" } else { "" };
        let _ = writeln!(out, "  {}: {}{control}", slot.index, slot.value);
        if let Some(error) = errors.get(&FieldPath::TechStackEntry(slot.index)) {
            let _ = writeln!(out, "     ! {}", error.message);
        }
    }

    if form.is_loading() {
        let _ = writeln!(out, "Submitting...");
    }
    out.trim_end().to_string()
}

pub(crate) fn render_errors(errors: &FieldErrors) -> String {
    let mut out = String::new();
    for (path, error) in errors {
        let _ = writeln!(out, "  {path}: {} ({})", error.message, error.kind);
    }
    out
}
