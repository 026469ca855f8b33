use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Closed set of gender choices offered by the form.
///
/// The committed value is the whole choice, so the result view can show the label
/// without a reverse lookup. On the wire a choice is `{ "label": "Other", "value": "other" }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    /// Machine value submitted with the form.
    pub fn value(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    /// Label shown in the selector and in the result view.
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raised when a value names none of the gender choices.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown gender choice '{0}', expected one of male, female, other")]
pub struct UnknownGender(pub String);

impl FromStr for Gender {
    type Err = UnknownGender;

    /// Accepts either the machine value or the label, case-insensitively.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let needle = raw.trim();
        Gender::ALL
            .into_iter()
            .find(|choice| {
                choice.value().eq_ignore_ascii_case(needle)
                    || choice.label().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| UnknownGender(raw.to_string()))
    }
}

#[derive(Serialize)]
struct ChoiceRef<'a> {
    label: &'a str,
    value: &'a str,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ChoiceRepr {
    Choice { value: String },
    Value(String),
}

impl Serialize for Gender {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ChoiceRef {
            label: self.label(),
            value: self.value(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = match ChoiceRepr::deserialize(deserializer)? {
            ChoiceRepr::Choice { value } => value,
            ChoiceRepr::Value(value) => value,
        };
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Stable identity of a tech-stack entry. Generated once at append time and never reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub Uuid);

impl EntryId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One row of the tech-stack field array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechStackEntry {
    #[serde(default = "EntryId::generate")]
    pub id: EntryId,
    #[serde(default)]
    pub value: String,
}

impl TechStackEntry {
    pub fn blank() -> Self {
        Self {
            id: EntryId::generate(),
            value: String::new(),
        }
    }
}

/// Raw draft values as the host holds them, in the form's camelCase wire shape.
///
/// Missing keys deserialize as empty, which is how an untouched input reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormValues {
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<Gender>,
    pub date_of_birth: String,
    pub email: String,
    pub phone_number: String,
    pub tech_stack: Vec<TechStackEntry>,
}

/// Frozen copy of a draft that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub email: String,
    pub phone_number: String,
    pub tech_stack: Vec<TechStackEntry>,
}
