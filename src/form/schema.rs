//! Declarative form definitions.
//!
//! Every lead form on the site is a `FormSchema`: an ordered list of steps,
//! each listing the fields it owns and their checks. The wizard logic lives
//! once in `FormMachine`.

use super::validation::{Check, FieldSpec, MissingMessage};

/// One wizard step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSchema {
    pub fields: Vec<FieldSpec>,
}

impl StepSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSchema {
    /// Stable identifier, also used in logs
    pub id: &'static str,
    /// Path the form posts to
    pub endpoint: &'static str,
    pub steps: Vec<StepSchema>,
    /// Fields kept after a successful submission (e.g. a prefilled service slug)
    pub retained: Vec<&'static str>,
}

pub const NAME_MAX: usize = 100;
pub const SHORT_TEXT_MAX: usize = 200;
pub const MESSAGE_MAX: usize = 5000;

fn contact_details() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("name", &[Check::Required, Check::MaxLength(NAME_MAX)]),
        FieldSpec::new("email", &[Check::Required, Check::Email]),
    ]
}

fn organisation_details() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("phone", &[Check::MaxLength(30)]),
        FieldSpec::new("company", &[Check::MaxLength(NAME_MAX)]),
        FieldSpec::new("website", &[Check::MaxLength(SHORT_TEXT_MAX)]),
    ]
}

impl FormSchema {
    /// Four-step "start a project" wizard.
    pub fn start_project() -> Self {
        let mut contact = contact_details();
        contact.push(FieldSpec::new("company", &[Check::MaxLength(NAME_MAX)]));

        Self {
            id: "start-project",
            endpoint: "/api/start-project",
            steps: vec![
                StepSchema::new(contact),
                StepSchema::new(vec![
                    FieldSpec::new(
                        "projectType",
                        &[Check::RequiredUnless("projectTypeOther", MissingMessage::ProjectType)],
                    ),
                    FieldSpec::new("projectTypeOther", &[Check::MaxLength(SHORT_TEXT_MAX)]),
                ]),
                StepSchema::new(vec![
                    FieldSpec::new("budget", &[Check::Required]),
                    FieldSpec::new("deadline", &[Check::MaxLength(SHORT_TEXT_MAX)]),
                ]),
                StepSchema::new(vec![FieldSpec::new(
                    "message",
                    &[Check::MaxLength(MESSAGE_MAX)],
                )]),
            ],
            retained: Vec::new(),
        }
    }

    /// Three-step general contact form.
    pub fn contact() -> Self {
        Self {
            id: "contact",
            endpoint: "/api/contact",
            steps: vec![
                StepSchema::new(contact_details()),
                StepSchema::new(organisation_details()),
                StepSchema::new(vec![FieldSpec::new(
                    "message",
                    &[Check::Required, Check::MaxLength(MESSAGE_MAX)],
                )]),
            ],
            retained: Vec::new(),
        }
    }

    /// Three-step inquiry opened from a service page; the service slug is
    /// prefilled from the page and survives a successful submission.
    pub fn service_inquiry() -> Self {
        let mut schema = Self::contact();
        schema.id = "service-inquiry";
        schema.retained = vec!["service"];
        schema
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// Step by 1-based index.
    pub fn step(&self, step: usize) -> Option<&StepSchema> {
        step.checked_sub(1).and_then(|i| self.steps.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_counts() {
        assert_eq!(FormSchema::start_project().total_steps(), 4);
        assert_eq!(FormSchema::contact().total_steps(), 3);
        assert_eq!(FormSchema::service_inquiry().total_steps(), 3);
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(FormSchema::start_project().endpoint, "/api/start-project");
        assert_eq!(FormSchema::service_inquiry().endpoint, "/api/contact");
    }

    #[test]
    fn test_step_lookup_is_one_based() {
        let schema = FormSchema::contact();
        assert!(schema.step(0).is_none());
        assert!(schema.step(1).is_some());
        assert!(schema.step(4).is_none());
    }

    #[test]
    fn test_field_names_are_unique_per_form() {
        for schema in [
            FormSchema::start_project(),
            FormSchema::contact(),
            FormSchema::service_inquiry(),
        ] {
            let mut names: Vec<_> = schema
                .steps
                .iter()
                .flat_map(|s| s.fields.iter().map(|f| f.name))
                .collect();
            let total = names.len();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), total, "duplicate field in {}", schema.id);
        }
    }

    #[test]
    fn test_service_inquiry_retains_service() {
        assert_eq!(FormSchema::service_inquiry().retained, vec!["service"]);
        assert!(FormSchema::contact().retained.is_empty());
    }
}
