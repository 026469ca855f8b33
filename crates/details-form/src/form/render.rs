use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use super::domain::Submission;

/// Read-only projection of the last submitted snapshot.
///
/// Every field is empty until the first submission completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub date_of_birth: String,
    pub tech_stack: String,
}

impl ResultView {
    pub fn project(snapshot: Option<&Submission>) -> Self {
        let Some(submission) = snapshot else {
            return Self::default();
        };

        Self {
            first_name: submission.first_name.clone(),
            last_name: submission.last_name.clone(),
            gender: submission.gender.label().to_string(),
            date_of_birth: format_date_of_birth(submission.date_of_birth),
            tech_stack: submission
                .tech_stack
                .iter()
                .map(|entry| entry.value.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl fmt::Display for ResultView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "First Name: {}", self.first_name)?;
        writeln!(f, "Last Name: {}", self.last_name)?;
        writeln!(f, "Gender: {}", self.gender)?;
        writeln!(f, "Date of Birth: {}", self.date_of_birth)?;
        write!(f, "Tech Stack: {}", self.tech_stack)
    }
}

/// Two-digit day, abbreviated English month, four-digit year: `04-May-1990`.
pub fn format_date_of_birth(date: NaiveDate) -> String {
    date.format("%d-%b-%Y").to_string()
}
