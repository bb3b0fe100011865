//! Multi-step lead forms.
//!
//! `FormSchema` declares the steps and field checks of each form variant,
//! `FormMachine` runs any schema as a wizard, and the same field checks are
//! reused by the server to re-validate submissions.

pub mod machine;
pub mod schema;
pub mod validation;

pub use machine::{FormMachine, FormStatus, SubmitOutcome};
pub use schema::{FormSchema, StepSchema};
pub use validation::{
    is_valid_email, validate_fields, Check, FieldErrors, FieldSpec, FieldValues, MissingMessage,
};
