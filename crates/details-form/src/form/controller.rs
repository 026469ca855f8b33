use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::domain::{EntryId, FormValues, Gender, Submission, TechStackEntry};
use super::rules::{
    parse_iso_date, standard_rules, ErrorKind, FieldError, FieldErrors, FieldName, FieldPath,
    FieldRules, FieldValue, ValidationMode,
};
use super::tech_stack::{index_after_move, TechStack, TechStackSlot};

/// Handle returned by [`FormController::register_field`]; input elements use it to
/// address the values they push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldBinding {
    name: FieldName,
}

impl FieldBinding {
    pub fn name(&self) -> FieldName {
        self.name
    }

    /// Path of a scalar field, or of the first tech-stack slot.
    pub fn path(&self) -> FieldPath {
        self.name.path(0)
    }

    /// Path of the tech-stack slot at `index`.
    pub fn at(&self, index: usize) -> FieldPath {
        self.name.path(index)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormError {
    #[error("field '{0}' holds a choice, select a gender instead of typing text")]
    NotTextField(FieldPath),
    #[error("tech stack has no slot {index} ({slots} shown)")]
    UnknownSlot { index: usize, slots: usize },
}

/// Owns the draft, the registered rules and the current validation state.
#[derive(Debug, Clone)]
pub struct FormController {
    mode: ValidationMode,
    rules: BTreeMap<FieldName, FieldRules>,
    first_name: String,
    last_name: String,
    gender: Option<Gender>,
    date_of_birth: String,
    email: String,
    phone_number: String,
    tech_stack: TechStack,
    errors: FieldErrors,
    touched: BTreeSet<FieldPath>,
    submit_count: u32,
}

impl FormController {
    /// A controller with no registered fields.
    pub fn new(mode: ValidationMode) -> Self {
        Self {
            mode,
            rules: BTreeMap::new(),
            first_name: String::new(),
            last_name: String::new(),
            gender: None,
            date_of_birth: String::new(),
            email: String::new(),
            phone_number: String::new(),
            tech_stack: TechStack::new(),
            errors: FieldErrors::default(),
            touched: BTreeSet::new(),
            submit_count: 0,
        }
    }

    /// A controller with every basic-details field registered.
    pub fn with_standard_fields(mode: ValidationMode) -> Self {
        let mut controller = Self::new(mode);
        for (name, rules) in standard_rules() {
            controller.register_field(name, rules);
        }
        controller
    }

    /// Declares the rules for `name`. Rules are fixed for the session, so registering a
    /// name again keeps the original rules.
    pub fn register_field(&mut self, name: FieldName, rules: FieldRules) -> FieldBinding {
        if self.rules.contains_key(&name) {
            debug!(field = name.key(), "field already registered, keeping original rules");
        } else {
            self.rules.insert(name, rules);
        }
        FieldBinding { name }
    }

    pub fn is_registered(&self, name: FieldName) -> bool {
        self.rules.contains_key(&name)
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, path: &FieldPath) -> Option<&FieldError> {
        self.errors.get(path)
    }

    pub fn is_touched(&self, path: &FieldPath) -> bool {
        self.touched.contains(path)
    }

    pub fn submit_count(&self) -> u32 {
        self.submit_count
    }

    pub fn is_submitted(&self) -> bool {
        self.submit_count > 0
    }

    pub fn tech_stack(&self) -> &TechStack {
        &self.tech_stack
    }

    pub fn tech_stack_slots(&self) -> Vec<TechStackSlot> {
        self.tech_stack.slots()
    }

    /// Current value of `path`, or `None` for a tech-stack slot that is not shown.
    pub fn value(&self, path: &FieldPath) -> Option<FieldValue<'_>> {
        let text = match path {
            FieldPath::FirstName => &self.first_name,
            FieldPath::LastName => &self.last_name,
            FieldPath::Gender => return Some(FieldValue::Choice(self.gender)),
            FieldPath::DateOfBirth => &self.date_of_birth,
            FieldPath::Email => &self.email,
            FieldPath::PhoneNumber => &self.phone_number,
            FieldPath::TechStackEntry(index) => {
                return self.tech_stack.value_at(*index).map(FieldValue::Text)
            }
        };
        Some(FieldValue::Text(text))
    }

    /// Updates a text field from an input change.
    pub fn set_value(&mut self, path: FieldPath, value: impl Into<String>) -> Result<(), FormError> {
        let value = value.into();
        match path {
            FieldPath::FirstName => self.first_name = value,
            FieldPath::LastName => self.last_name = value,
            FieldPath::Gender => return Err(FormError::NotTextField(path)),
            FieldPath::DateOfBirth => self.date_of_birth = value,
            FieldPath::Email => self.email = value,
            FieldPath::PhoneNumber => self.phone_number = value,
            FieldPath::TechStackEntry(index) => {
                let slots = self.tech_stack.slot_count();
                self.tech_stack
                    .set_value(index, value)
                    .ok_or(FormError::UnknownSlot { index, slots })?;
            }
        }
        debug!(field = %path, "field changed");
        self.after_change(path);
        Ok(())
    }

    pub fn select_gender(&mut self, choice: Option<Gender>) {
        self.gender = choice;
        debug!(selected = choice.is_some(), "gender selected");
        self.after_change(FieldPath::Gender);
    }

    /// Marks the field touched; in on-blur mode this validates it.
    pub fn blur(&mut self, path: FieldPath) {
        self.touched.insert(path);
        if self.mode == ValidationMode::OnBlur {
            self.validate_field(path);
        }
    }

    fn after_change(&mut self, path: FieldPath) {
        if self.mode == ValidationMode::OnChange || self.is_submitted() {
            self.validate_field(path);
        }
    }

    /// Runs the registered rules for one field and records the outcome.
    pub fn validate_field(&mut self, path: FieldPath) -> Option<&FieldError> {
        let outcome = match (self.rules.get(&path.name()), self.value(&path)) {
            (Some(rules), Some(value)) => rules.check(value),
            _ => None,
        };
        self.errors.set(path, outcome);
        self.errors.get(&path)
    }

    fn registered_paths(&self) -> Vec<FieldPath> {
        let mut paths = Vec::new();
        for name in self.rules.keys() {
            match name {
                FieldName::TechStackEntry => {
                    paths.extend((0..self.tech_stack.slot_count()).map(FieldPath::TechStackEntry))
                }
                scalar => paths.push(scalar.path(0)),
            }
        }
        paths
    }

    /// Validates every registered field independently and returns the failures.
    pub fn validate_all(&mut self) -> FieldErrors {
        self.errors.clear();
        for path in self.registered_paths() {
            self.validate_field(path);
        }
        self.errors.clone()
    }

    /// Counts a submit attempt, validates everything and, if the draft is valid, freezes
    /// it into a [`Submission`].
    pub fn handle_submit(&mut self) -> Result<Submission, FieldErrors> {
        self.submit_count += 1;
        let errors = self.validate_all();
        if !errors.is_empty() {
            debug!(invalid = errors.len(), "submit blocked by validation errors");
            return Err(errors);
        }
        self.freeze()
    }

    /// Converts the draft into typed values. Gender and date of birth need a usable value
    /// even when no rule was registered for them.
    fn freeze(&mut self) -> Result<Submission, FieldErrors> {
        let gender = self.gender;
        let date_of_birth = parse_iso_date(&self.date_of_birth);

        if gender.is_none() {
            self.errors.set(
                FieldPath::Gender,
                Some(FieldError {
                    kind: ErrorKind::Required,
                    message: "Please select your gender".to_string(),
                }),
            );
        }
        if date_of_birth.is_none() {
            let kind = if self.date_of_birth.is_empty() {
                ErrorKind::Required
            } else {
                ErrorKind::Pattern
            };
            let message = match kind {
                ErrorKind::Required => "Date of birth is required",
                ErrorKind::Pattern => "Date of birth is invalid",
            };
            self.errors.set(
                FieldPath::DateOfBirth,
                Some(FieldError {
                    kind,
                    message: message.to_string(),
                }),
            );
        }

        match (gender, date_of_birth) {
            (Some(gender), Some(date_of_birth)) => Ok(Submission {
                first_name: self.first_name.clone(),
                last_name: self.last_name.clone(),
                gender,
                date_of_birth,
                email: self.email.clone(),
                phone_number: self.phone_number.clone(),
                tech_stack: self.tech_stack.submitted_entries(),
            }),
            _ => Err(self.errors.clone()),
        }
    }

    pub fn append_tech_stack_entry(&mut self) -> EntryId {
        let id = self.tech_stack.append();
        debug!(entry = %id, entries = self.tech_stack.len(), "tech stack entry appended");
        id
    }

    /// Removes the entry at `index`. The first slot is permanent, so index 0 is a no-op.
    pub fn remove_tech_stack_entry(&mut self, index: usize) -> Option<TechStackEntry> {
        let removed = self.tech_stack.remove(index)?;
        let shift = |position: usize| match position {
            p if p == index => None,
            p if p > index => Some(p - 1),
            p => Some(p),
        };
        self.errors.remap_tech_stack(shift);
        self.touched = remap_touched(&self.touched, shift);
        debug!(entry = %removed.id, index, "tech stack entry removed");
        Some(removed)
    }

    pub fn move_tech_stack_entry(&mut self, from: usize, to: usize) -> bool {
        if !self.tech_stack.move_entry(from, to) {
            return false;
        }
        let remap = |position: usize| Some(index_after_move(position, from, to));
        self.errors.remap_tech_stack(remap);
        self.touched = remap_touched(&self.touched, remap);
        debug!(from, to, "tech stack entry moved");
        true
    }

    /// Replaces the whole sequence, which may leave it empty.
    pub fn replace_tech_stack(&mut self, entries: Vec<TechStackEntry>) {
        self.tech_stack.replace(entries);
        self.errors.remap_tech_stack(|_| None);
        self.touched = remap_touched(&self.touched, |_| None);
    }

    /// Current draft in wire form.
    pub fn values(&self) -> FormValues {
        FormValues {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            gender: self.gender,
            date_of_birth: self.date_of_birth.clone(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            tech_stack: self.tech_stack.entries().to_vec(),
        }
    }

    /// Replaces the draft with `values` and clears validation state.
    pub fn load_values(&mut self, values: FormValues) {
        self.reset();
        self.first_name = values.first_name;
        self.last_name = values.last_name;
        self.gender = values.gender;
        self.date_of_birth = values.date_of_birth;
        self.email = values.email;
        self.phone_number = values.phone_number;
        self.tech_stack.replace(values.tech_stack);
    }

    /// Clears every value, restores the single blank tech-stack entry and drops all
    /// validation state. Registered rules stay.
    pub fn reset(&mut self) {
        self.first_name.clear();
        self.last_name.clear();
        self.gender = None;
        self.date_of_birth.clear();
        self.email.clear();
        self.phone_number.clear();
        self.tech_stack.reset();
        self.errors.clear();
        self.touched.clear();
        self.submit_count = 0;
        debug!("form reset");
    }
}

fn remap_touched(
    touched: &BTreeSet<FieldPath>,
    remap: impl Fn(usize) -> Option<usize>,
) -> BTreeSet<FieldPath> {
    touched
        .iter()
        .filter_map(|path| match path {
            FieldPath::TechStackEntry(index) => remap(*index).map(FieldPath::TechStackEntry),
            other => Some(*other),
        })
        .collect()
}
