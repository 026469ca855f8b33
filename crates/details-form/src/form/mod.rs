//! The basic details form: rules, field array, controller, submission and result view.

pub mod component;
pub mod controller;
pub mod domain;
pub mod render;
pub mod rules;
pub mod submission;
pub mod tech_stack;

pub use component::{DetailsForm, EventOutcome, FormEvent, SubmitOutcome};
pub use controller::{FieldBinding, FormController, FormError};
pub use domain::{EntryId, FormValues, Gender, Submission, TechStackEntry, UnknownGender};
pub use render::{format_date_of_birth, ResultView};
pub use rules::{
    standard_rules, ErrorKind, FieldError, FieldErrors, FieldName, FieldPath, FieldPattern,
    FieldRules, FieldValue, UnknownField, ValidationMode,
};
pub use submission::{
    DisplayState, LoadingGuard, SharedDisplay, SimulatedDelay, SubmissionHandler, SubmitEffect,
    SubmitError,
};
pub use tech_stack::{TechStack, TechStackSlot};
