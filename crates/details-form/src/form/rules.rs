use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};

use super::domain::Gender;

static LETTERS_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]+$").expect("Invalid name regex"));
static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\S+@\S+$").expect("Invalid email regex"));
static INDIAN_MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+91[1-9][0-9]{9}$").expect("Invalid phone regex"));

/// Registered field names. Every tech-stack slot shares the `TechStackEntry` rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldName {
    FirstName,
    LastName,
    Gender,
    DateOfBirth,
    Email,
    PhoneNumber,
    TechStackEntry,
}

impl FieldName {
    pub const ALL: [FieldName; 7] = [
        FieldName::FirstName,
        FieldName::LastName,
        FieldName::Gender,
        FieldName::DateOfBirth,
        FieldName::Email,
        FieldName::PhoneNumber,
        FieldName::TechStackEntry,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            FieldName::FirstName => "firstName",
            FieldName::LastName => "lastName",
            FieldName::Gender => "gender",
            FieldName::DateOfBirth => "dateOfBirth",
            FieldName::Email => "email",
            FieldName::PhoneNumber => "phoneNumber",
            FieldName::TechStackEntry => "techStack",
        }
    }

    /// Concrete path for this name. `index` only matters for tech-stack entries.
    pub fn path(&self, index: usize) -> FieldPath {
        match self {
            FieldName::FirstName => FieldPath::FirstName,
            FieldName::LastName => FieldPath::LastName,
            FieldName::Gender => FieldPath::Gender,
            FieldName::DateOfBirth => FieldPath::DateOfBirth,
            FieldName::Email => FieldPath::Email,
            FieldName::PhoneNumber => FieldPath::PhoneNumber,
            FieldName::TechStackEntry => FieldPath::TechStackEntry(index),
        }
    }
}

/// Address of a single input, e.g. `firstName` or `techStack.2.value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldPath {
    FirstName,
    LastName,
    Gender,
    DateOfBirth,
    Email,
    PhoneNumber,
    TechStackEntry(usize),
}

impl FieldPath {
    pub fn name(&self) -> FieldName {
        match self {
            FieldPath::FirstName => FieldName::FirstName,
            FieldPath::LastName => FieldName::LastName,
            FieldPath::Gender => FieldName::Gender,
            FieldPath::DateOfBirth => FieldName::DateOfBirth,
            FieldPath::Email => FieldName::Email,
            FieldPath::PhoneNumber => FieldName::PhoneNumber,
            FieldPath::TechStackEntry(_) => FieldName::TechStackEntry,
        }
    }

    pub fn tech_stack_index(&self) -> Option<usize> {
        match self {
            FieldPath::TechStackEntry(index) => Some(*index),
            _ => None,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::TechStackEntry(index) => write!(f, "techStack.{index}.value"),
            other => f.write_str(other.name().key()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field '{0}'")]
pub struct UnknownField(pub String);

impl FromStr for FieldPath {
    type Err = UnknownField;

    /// Accepts `techStack.N.value` and the shorter `techStack.N` for list slots.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if let Some(rest) = trimmed.strip_prefix("techStack.") {
            let index = rest.strip_suffix(".value").unwrap_or(rest);
            return index
                .parse::<usize>()
                .map(FieldPath::TechStackEntry)
                .map_err(|_| UnknownField(raw.to_string()));
        }

        FieldName::ALL
            .into_iter()
            .filter(|name| *name != FieldName::TechStackEntry)
            .find(|name| name.key().eq_ignore_ascii_case(trimmed))
            .map(|name| name.path(0))
            .ok_or_else(|| UnknownField(raw.to_string()))
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Kind of a failed check. A field carries at most one error at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Required,
    Pattern,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Required => f.write_str("required"),
            ErrorKind::Pattern => f.write_str("pattern"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Field errors keyed by path. Paths absent from the map are valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<FieldPath, FieldError>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, path: &FieldPath) -> Option<&FieldError> {
        self.0.get(path)
    }

    pub fn contains(&self, path: &FieldPath) -> bool {
        self.0.contains_key(path)
    }

    pub fn kind_of(&self, path: &FieldPath) -> Option<ErrorKind> {
        self.0.get(path).map(|error| error.kind)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, FieldPath, FieldError> {
        self.0.iter()
    }

    pub(crate) fn set(&mut self, path: FieldPath, outcome: Option<FieldError>) {
        match outcome {
            Some(error) => {
                self.0.insert(path, error);
            }
            None => {
                self.0.remove(&path);
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }

    /// Rewrites tech-stack paths through `remap`; entries mapped to `None` are dropped.
    pub(crate) fn remap_tech_stack(&mut self, remap: impl Fn(usize) -> Option<usize>) {
        let previous = std::mem::take(&mut self.0);
        self.0 = previous
            .into_iter()
            .filter_map(|(path, error)| match path {
                FieldPath::TechStackEntry(index) => {
                    remap(index).map(|next| (FieldPath::TechStackEntry(next), error))
                }
                other => Some((other, error)),
            })
            .collect();
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = (&'a FieldPath, &'a FieldError);
    type IntoIter = btree_map::Iter<'a, FieldPath, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// When individual fields are validated before the first submit.
///
/// After the first submit attempt every change re-validates the changed field,
/// whatever the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    #[default]
    OnSubmit,
    OnBlur,
    OnChange,
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "on_submit" | "submit" => Ok(Self::OnSubmit),
            "on_blur" | "blur" => Ok(Self::OnBlur),
            "on_change" | "change" => Ok(Self::OnChange),
            _ => Err(format!(
                "unknown validation mode '{raw}', expected on_submit, on_blur or on_change"
            )),
        }
    }
}

/// Shape check applied after the required check passes.
#[derive(Debug, Clone)]
pub enum FieldPattern {
    Regex(Regex),
    /// Zero-padded ISO `YYYY-MM-DD` that names a real calendar day.
    IsoDate,
}

impl FieldPattern {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            FieldPattern::Regex(regex) => regex.is_match(value),
            FieldPattern::IsoDate => parse_iso_date(value).is_some(),
        }
    }
}

pub(crate) fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    // chrono alone would also take unpadded `1990-5-4`.
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Borrowed view of a field's current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Choice(Option<Gender>),
}

impl FieldValue<'_> {
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::Choice(choice) => choice.is_none(),
        }
    }
}

/// Static validation rules for one field.
#[derive(Debug, Clone, Default)]
pub struct FieldRules {
    pub required: bool,
    pub pattern: Option<FieldPattern>,
    pub required_message: String,
    pub pattern_message: String,
}

impl FieldRules {
    pub fn required(message: impl Into<String>) -> Self {
        Self {
            required: true,
            required_message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_pattern(mut self, pattern: FieldPattern, message: impl Into<String>) -> Self {
        self.pattern = Some(pattern);
        self.pattern_message = message.into();
        self
    }

    /// Required check first, then the pattern. Patterns only apply to non-empty text.
    pub fn check(&self, value: FieldValue<'_>) -> Option<FieldError> {
        if value.is_empty() {
            return self.required.then(|| FieldError {
                kind: ErrorKind::Required,
                message: self.required_message.clone(),
            });
        }

        match (value, &self.pattern) {
            (FieldValue::Text(text), Some(pattern)) if !pattern.matches(text) => Some(FieldError {
                kind: ErrorKind::Pattern,
                message: self.pattern_message.clone(),
            }),
            _ => None,
        }
    }
}

/// The rule set the basic details form registers at mount.
pub fn standard_rules() -> Vec<(FieldName, FieldRules)> {
    vec![
        (
            FieldName::FirstName,
            FieldRules::required("Name is required").with_pattern(
                FieldPattern::Regex(LETTERS_ONLY.clone()),
                "Name is incorrect",
            ),
        ),
        (
            FieldName::LastName,
            FieldRules::required("Name is required").with_pattern(
                FieldPattern::Regex(LETTERS_ONLY.clone()),
                "Name is incorrect",
            ),
        ),
        (
            FieldName::Gender,
            FieldRules::required("Please select your gender"),
        ),
        (
            FieldName::DateOfBirth,
            FieldRules::required("Date of birth is required")
                .with_pattern(FieldPattern::IsoDate, "Date of birth is invalid"),
        ),
        (
            FieldName::Email,
            FieldRules::required("Email is required").with_pattern(
                FieldPattern::Regex(EMAIL_SHAPE.clone()),
                "Email format is incorrect",
            ),
        ),
        (
            FieldName::PhoneNumber,
            FieldRules::required("Phone number is required").with_pattern(
                FieldPattern::Regex(INDIAN_MOBILE.clone()),
                "Phone number format is incorrect",
            ),
        ),
        (
            FieldName::TechStackEntry,
            FieldRules::required("Tech stack entry is required"),
        ),
    ]
}
