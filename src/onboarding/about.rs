use crate::core::{StepData, StepHandler};
use crate::ui::span::{Span, SpanLine};
use crate::ui::theme::Theme;
use crate::validators::{self, Validator, run_validators};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const TITLE: &str = "Tell us about yourself";
pub const SUBTITLE: &str = "Help us personalize your experience";

const TOTAL_FIELDS: usize = 5;
const BAR_WIDTH: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AboutForm {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub organisation: String,
    pub job_role: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AboutField {
    FirstName,
    LastName,
    Phone,
    Organisation,
    JobRole,
}

impl AboutField {
    pub const ALL: [AboutField; TOTAL_FIELDS] = [
        AboutField::FirstName,
        AboutField::LastName,
        AboutField::Phone,
        AboutField::Organisation,
        AboutField::JobRole,
    ];

    /// Key used in the cached step data.
    pub fn key(self) -> &'static str {
        match self {
            AboutField::FirstName => "firstName",
            AboutField::LastName => "lastName",
            AboutField::Phone => "phone",
            AboutField::Organisation => "organisation",
            AboutField::JobRole => "jobRole",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AboutField::FirstName => "First Name",
            AboutField::LastName => "Last Name",
            AboutField::Phone => "Phone Number",
            AboutField::Organisation => "Organisation",
            AboutField::JobRole => "Job Role",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            AboutField::FirstName => "John",
            AboutField::LastName => "Doe",
            AboutField::Phone => "+1 (555) 123-4567",
            AboutField::Organisation => "Acme Inc.",
            AboutField::JobRole => "Software Engineer",
        }
    }

    pub fn hint(self) -> Option<&'static str> {
        match self {
            AboutField::Phone => Some("Optional: Your contact number"),
            _ => None,
        }
    }

    /// Accepts the data key or a loose spelling such as `first-name` or `role`.
    pub fn parse(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "firstname" | "first" => Some(AboutField::FirstName),
            "lastname" | "last" => Some(AboutField::LastName),
            "phone" | "phonenumber" => Some(AboutField::Phone),
            "organisation" | "organization" | "org" => Some(AboutField::Organisation),
            "jobrole" | "role" => Some(AboutField::JobRole),
            _ => None,
        }
    }

    fn validators(self) -> Vec<Validator> {
        match self {
            AboutField::FirstName => vec![validators::min_length(
                2,
                "First name must be at least 2 characters",
            )],
            AboutField::LastName => vec![validators::min_length(
                2,
                "Last name must be at least 2 characters",
            )],
            AboutField::Phone => Vec::new(),
            AboutField::Organisation => vec![validators::min_length(
                2,
                "Organisation must be at least 2 characters",
            )],
            AboutField::JobRole => vec![validators::min_length(1, "Job role is required")],
        }
    }
}

impl AboutForm {
    pub fn get(&self, field: AboutField) -> &str {
        match field {
            AboutField::FirstName => &self.first_name,
            AboutField::LastName => &self.last_name,
            AboutField::Phone => &self.phone,
            AboutField::Organisation => &self.organisation,
            AboutField::JobRole => &self.job_role,
        }
    }

    pub fn set(&mut self, field: AboutField, value: impl Into<String>) {
        let slot = match field {
            AboutField::FirstName => &mut self.first_name,
            AboutField::LastName => &mut self.last_name,
            AboutField::Phone => &mut self.phone,
            AboutField::Organisation => &mut self.organisation,
            AboutField::JobRole => &mut self.job_role,
        };
        *slot = value.into();
    }

    pub fn field_error(&self, field: AboutField) -> Option<String> {
        run_validators(&field.validators(), self.get(field)).err()
    }

    pub fn errors(&self) -> Vec<(AboutField, String)> {
        AboutField::ALL
            .into_iter()
            .filter_map(|field| self.field_error(field).map(|message| (field, message)))
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }

    /// Profile completion in percent. Phone is optional and always counts.
    pub fn progress(&self) -> u8 {
        let completed = AboutField::ALL
            .into_iter()
            .filter(|field| {
                *field == AboutField::Phone || self.get(*field).chars().count() >= 2
            })
            .count();
        ((completed * 100 + TOTAL_FIELDS / 2) / TOTAL_FIELDS) as u8
    }

    pub fn from_data(data: &StepData) -> Option<Self> {
        serde_json::from_value(data.clone()).ok()
    }
}

#[derive(Default)]
struct AboutState {
    form: AboutForm,
    errors: Vec<(AboutField, String)>,
}

/// Profile step content. Clones share the same form.
#[derive(Clone, Default)]
pub struct AboutStep {
    state: Arc<Mutex<AboutState>>,
}

impl AboutStep {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, AboutState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resets the form to previously cached data.
    pub fn restore(&self, data: &StepData) -> bool {
        let Some(form) = AboutForm::from_data(data) else {
            return false;
        };
        let mut state = self.lock();
        state.form = form;
        state.errors.clear();
        true
    }

    /// Sets a field and revalidates just that field.
    pub fn set_field(&self, field: AboutField, value: impl Into<String>) -> Option<String> {
        let mut state = self.lock();
        state.form.set(field, value);
        let error = state.form.field_error(field);
        state.errors.retain(|(f, _)| *f != field);
        if let Some(message) = &error {
            state.errors.push((field, message.clone()));
        }
        error
    }

    pub fn form(&self) -> AboutForm {
        self.lock().form.clone()
    }

    pub fn error(&self, field: AboutField) -> Option<String> {
        self.lock()
            .errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, message)| message.clone())
    }

    pub fn progress(&self) -> u8 {
        self.lock().form.progress()
    }

    pub fn render(&self, theme: &Theme) -> Vec<SpanLine> {
        let state = self.lock();
        let mut lines = vec![
            vec![Span::styled(TITLE, theme.heading)],
            vec![Span::styled(SUBTITLE, theme.muted)],
        ];

        for field in AboutField::ALL {
            lines.push(Vec::new());
            let value = state.form.get(field);
            let error = state.errors.iter().find(|(f, _)| *f == field);
            let marker = match error {
                Some(_) => Span::styled("✕ ", theme.error),
                None if !value.is_empty() && state.form.field_error(field).is_none() => {
                    Span::styled("✓ ", theme.success)
                }
                None => Span::new("  "),
            };
            let shown = if value.is_empty() {
                Span::styled(field.placeholder(), theme.disabled)
            } else {
                Span::styled(value, theme.text)
            };
            lines.push(vec![
                marker,
                Span::styled(format!("{}: ", field.label()), theme.heading),
                shown,
            ]);
            if let Some((_, message)) = error {
                lines.push(vec![Span::new("  "), Span::styled(message.as_str(), theme.error)]);
            } else if let Some(hint) = field.hint() {
                lines.push(vec![Span::new("  "), Span::styled(hint, theme.muted)]);
            }
        }

        let progress = state.form.progress();
        let filled = usize::from(progress) * BAR_WIDTH / 100;
        lines.push(Vec::new());
        lines.push(vec![
            Span::styled("Profile completion ", theme.muted),
            Span::styled(format!("{progress}%"), theme.accent),
        ]);
        lines.push(vec![
            Span::styled("█".repeat(filled), theme.accent),
            Span::styled("░".repeat(BAR_WIDTH - filled), theme.muted),
        ]);
        lines
    }
}

#[async_trait]
impl StepHandler for AboutStep {
    async fn validate(&self) -> bool {
        let mut state = self.lock();
        state.errors = state.form.errors();
        state.errors.is_empty()
    }

    fn data(&self) -> Option<StepData> {
        serde_json::to_value(&self.lock().form).ok()
    }
}
