use super::schema::FormSchema;
use super::validation::{validate_fields, FieldErrors, FieldValues};
use crate::dispatch::SubmissionDispatcher;
use crate::i18n::Language;
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Where the wizard is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStatus {
    Editing,
    Submitting,
    Succeeded,
    Failed(String),
}

/// Result of calling [`FormMachine::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Not on the final step, or the final step did not validate; nothing was sent
    Blocked,
    Succeeded(Option<String>),
    Failed(String),
}

/// Multi-step form wizard driven by a [`FormSchema`].
///
/// Steps are 1-based. Values survive navigation in both directions; errors
/// are scoped to the last validated step.
#[derive(Debug, Clone)]
pub struct FormMachine {
    schema: FormSchema,
    lang: Language,
    current_step: usize,
    values: FieldValues,
    errors: FieldErrors,
    status: FormStatus,
    source_url: Option<String>,
}

impl FormMachine {
    pub fn new(schema: FormSchema, lang: Language) -> Self {
        Self {
            schema,
            lang,
            current_step: 1,
            values: FieldValues::new(),
            errors: FieldErrors::new(),
            status: FormStatus::Editing,
            source_url: None,
        }
    }

    /// Prefill a value, typically from a query parameter.
    pub fn with_prefill(mut self, name: &str, value: &str) -> Self {
        self.values.insert(name.to_string(), value.to_string());
        self
    }

    /// Page the form was submitted from, sent as `url`.
    pub fn with_source_url(mut self, url: &str) -> Self {
        self.source_url = Some(url.to_string());
        self
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn lang(&self) -> Language {
        self.lang
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.schema.total_steps()
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step >= self.total_steps()
    }

    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    /// Completion fraction: 0.0 on the first step, 1.0 on the last.
    pub fn progress(&self) -> f32 {
        let total = self.total_steps();
        if total <= 1 {
            return 1.0;
        }
        (self.current_step - 1) as f32 / (total - 1) as f32
    }

    /// Update a value. Clears that field's error only; other errors stay until
    /// the step is validated again. A failed or finished form returns to editing.
    pub fn set_field(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.to_string());
        self.errors.remove(name);

        if matches!(self.status, FormStatus::Failed(_) | FormStatus::Succeeded) {
            self.status = FormStatus::Editing;
        }
    }

    /// Validate one step, replacing the error map with that step's failures.
    pub fn validate_step(&mut self, step: usize) -> bool {
        self.errors = match self.schema.step(step) {
            Some(schema) => validate_fields(&schema.fields, &self.values, self.lang),
            None => FieldErrors::new(),
        };
        self.errors.is_empty()
    }

    /// Move to the next step if the current one validates.
    ///
    /// Returns whether the step changed. On the last step this validates but
    /// never moves.
    pub fn advance(&mut self) -> bool {
        if !self.validate_step(self.current_step) {
            debug!(
                "{}: step {} blocked by {} error(s)",
                self.schema.id,
                self.current_step,
                self.errors.len()
            );
            return false;
        }

        if self.is_last_step() {
            return false;
        }

        self.current_step += 1;
        true
    }

    /// Go back one step without validating. No-op on the first step.
    pub fn retreat(&mut self) {
        if self.current_step > 1 {
            self.current_step -= 1;
        }
        self.errors.clear();
    }

    /// JSON body sent to the endpoint: every non-empty value plus locale and url.
    pub fn payload(&self) -> Value {
        let mut body = Map::new();
        for (name, value) in &self.values {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                body.insert(name.clone(), Value::String(trimmed.to_string()));
            }
        }
        body.insert("locale".to_string(), Value::String(self.lang.code().to_string()));
        if let Some(url) = &self.source_url {
            body.insert("url".to_string(), Value::String(url.clone()));
        }
        Value::Object(body)
    }

    /// Validate the final step and hand the payload to `dispatcher`.
    pub async fn submit<D>(&mut self, dispatcher: &D) -> SubmitOutcome
    where
        D: SubmissionDispatcher + ?Sized,
    {
        if !self.is_last_step() || !self.validate_step(self.current_step) {
            return SubmitOutcome::Blocked;
        }

        self.status = FormStatus::Submitting;
        let payload = self.payload();

        match dispatcher
            .submit(self.schema.endpoint, &payload, self.lang)
            .await
        {
            Ok(success) => {
                info!("{}: submission accepted", self.schema.id);
                let retained = &self.schema.retained;
                self.values.retain(|name, _| retained.contains(&name.as_str()));
                self.errors.clear();
                self.current_step = 1;
                self.status = FormStatus::Succeeded;
                SubmitOutcome::Succeeded(success.message)
            }
            Err(failure) => {
                info!("{}: submission failed", self.schema.id);
                self.errors = failure.errors;
                self.status = FormStatus::Failed(failure.message.clone());
                SubmitOutcome::Failed(failure.message)
            }
        }
    }
}
