//! Leads captured by the site's forms.
//!
//! Every wire field is optional; missing values surface as per-field
//! errors rather than a JSON rejection.

use crate::form::schema::{MESSAGE_MAX, NAME_MAX, SHORT_TEXT_MAX};
use crate::form::{validate_fields, Check, FieldErrors, FieldSpec, FieldValues, MissingMessage};
use crate::i18n::Language;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadKind {
    ProjectRequest,
    Contact,
}

impl LeadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectRequest => "project_request",
            Self::Contact => "contact",
        }
    }

    fn rules(&self) -> Vec<FieldSpec> {
        let mut rules = vec![
            FieldSpec::new("name", &[Check::Required, Check::MaxLength(NAME_MAX)]),
            FieldSpec::new("email", &[Check::Required, Check::Email]),
            FieldSpec::new("phone", &[Check::MaxLength(30)]),
            FieldSpec::new("company", &[Check::MaxLength(NAME_MAX)]),
            FieldSpec::new("website", &[Check::MaxLength(SHORT_TEXT_MAX)]),
        ];

        match self {
            Self::ProjectRequest => rules.extend([
                FieldSpec::new(
                    "projectType",
                    &[Check::RequiredUnless("projectTypeOther", MissingMessage::ProjectType)],
                ),
                FieldSpec::new("projectTypeOther", &[Check::MaxLength(SHORT_TEXT_MAX)]),
                FieldSpec::new("budget", &[Check::MaxLength(SHORT_TEXT_MAX)]),
                FieldSpec::new("deadline", &[Check::MaxLength(SHORT_TEXT_MAX)]),
                FieldSpec::new("message", &[Check::MaxLength(MESSAGE_MAX)]),
            ]),
            Self::Contact => rules.extend([
                FieldSpec::new("service", &[Check::MaxLength(SHORT_TEXT_MAX)]),
                FieldSpec::new("message", &[Check::Required, Check::MaxLength(MESSAGE_MAX)]),
            ]),
        }

        rules
    }
}

/// JSON body of `POST /api/start-project` and `POST /api/contact`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub website: Option<String>,
    pub project_type: Option<String>,
    pub project_type_other: Option<String>,
    pub budget: Option<String>,
    pub deadline: Option<String>,
    pub message: Option<String>,
    pub service: Option<String>,
    pub url: Option<String>,
    pub locale: Option<String>,
}

impl LeadSubmission {
    fn values(&self) -> FieldValues {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("company", &self.company),
            ("website", &self.website),
            ("projectType", &self.project_type),
            ("projectTypeOther", &self.project_type_other),
            ("budget", &self.budget),
            ("deadline", &self.deadline),
            ("message", &self.message),
            ("service", &self.service),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| (name.to_string(), v.clone())))
        .collect()
    }

    /// Check the submission and normalize it into a [`Lead`].
    pub fn validate(&self, kind: LeadKind, lang: Language) -> Result<Lead, FieldErrors> {
        let errors = validate_fields(&kind.rules(), &self.values(), lang);
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Lead {
            kind,
            name: clean(&self.name).unwrap_or_default(),
            email: clean(&self.email).unwrap_or_default().to_lowercase(),
            phone: clean(&self.phone),
            company: clean(&self.company),
            website: clean(&self.website),
            project_type: clean(&self.project_type),
            project_type_other: clean(&self.project_type_other),
            budget: clean(&self.budget),
            deadline: clean(&self.deadline),
            message: clean(&self.message),
            service: clean(&self.service),
            locale: lang,
            source_url: clean(&self.url),
            created_at: Utc::now(),
        })
    }
}

fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// A validated submission. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub kind: LeadKind,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub website: Option<String>,
    pub project_type: Option<String>,
    pub project_type_other: Option<String>,
    pub budget: Option<String>,
    pub deadline: Option<String>,
    pub message: Option<String>,
    pub service: Option<String>,
    pub locale: Language,
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    /// Project type label, preferring the free-text "other" description.
    pub fn project_type_label(&self, lang: Language) -> Option<String> {
        self.project_type_other.clone().or_else(|| {
            self.project_type
                .as_deref()
                .map(|v| option_label(project_types(lang), v).to_string())
        })
    }

    pub fn budget_label(&self, lang: Language) -> Option<String> {
        self.budget
            .as_deref()
            .map(|v| option_label(budget_options(lang), v).to_string())
    }
}

/// Somewhere leads are kept after a successful submission.
#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn save_lead(&self, lead: &Lead) -> anyhow::Result<i64>;
}

// ==================== Select Options ====================

/// A selectable value and its human label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

const fn opt(value: &'static str, label: &'static str) -> SelectOption {
    SelectOption { value, label }
}

static BUDGET_OPTIONS_EN: [SelectOption; 5] = [
    opt("under-1000", "Under $1,000"),
    opt("1000-2000", "$1,000 – $2,000"),
    opt("2000-5000", "$2,000 – $5,000"),
    opt("5000-10000", "$5,000 – $10,000"),
    opt("over-10000", "Over $10,000"),
];

static BUDGET_OPTIONS_FA: [SelectOption; 5] = [
    opt("under-50m", "کمتر از ۵۰ میلیون تومان"),
    opt("50m-150m", "۵۰ تا ۱۵۰ میلیون تومان"),
    opt("150m-300m", "۱۵۰ تا ۳۰۰ میلیون تومان"),
    opt("300m-500m", "۳۰۰ تا ۵۰۰ میلیون تومان"),
    opt("over-500m", "بیش از ۵۰۰ میلیون تومان"),
];

static PROJECT_TYPES_EN: [SelectOption; 7] = [
    opt("landing-page", "Landing page"),
    opt("corporate-website", "Corporate website"),
    opt("e-commerce", "Online store"),
    opt("web-app", "Web application"),
    opt("branding", "Brand identity"),
    opt("ui-ux", "UI/UX design"),
    opt("other", "Other"),
];

static PROJECT_TYPES_FA: [SelectOption; 7] = [
    opt("landing-page", "صفحه فرود"),
    opt("corporate-website", "وب‌سایت شرکتی"),
    opt("e-commerce", "فروشگاه اینترنتی"),
    opt("web-app", "اپلیکیشن تحت وب"),
    opt("branding", "هویت بصری"),
    opt("ui-ux", "طراحی رابط و تجربه کاربری"),
    opt("other", "سایر"),
];

/// Budget ranges offered in `lang`. Persian visitors are quoted in tomans.
pub fn budget_options(lang: Language) -> &'static [SelectOption] {
    if lang == Language::PERSIAN {
        &BUDGET_OPTIONS_FA
    } else {
        &BUDGET_OPTIONS_EN
    }
}

pub fn project_types(lang: Language) -> &'static [SelectOption] {
    if lang == Language::PERSIAN {
        &PROJECT_TYPES_FA
    } else {
        &PROJECT_TYPES_EN
    }
}

/// Label for `value`, or `value` itself when it is not a known option.
pub fn option_label<'a>(options: &'static [SelectOption], value: &'a str) -> &'a str {
    options
        .iter()
        .find(|o| o.value == value)
        .map(|o| o.label)
        .unwrap_or(value)
}
