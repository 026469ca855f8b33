//! Form-state, validation and submission engine for the basic details form.
//!
//! The [`form`] module holds the behavioral core: field registration and validation,
//! the tech-stack field array, the asynchronous submission lifecycle and the projection
//! of the last submitted snapshot. Configuration, telemetry and the application error
//! type are shared with the command-line host.

pub mod config;
pub mod error;
pub mod form;
pub mod telemetry;
