use crate::core::{Flow, StepDescriptor, StepId, WizardOptions};
use crate::error::ConfigError;
use crate::onboarding;
use crate::ui::controls::Labels;
use crate::ui::progress::Orientation;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Wizard definition as read from YAML.
///
/// ```yaml
/// steps:
///   - id: welcome
///     title: Welcome
///   - id: about
///     title: Details
///     skippable: true
/// default_step: welcome
/// allow_step_click: true
/// orientation: vertical
/// labels:
///   complete: Finish
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    pub steps: Vec<StepDescriptor>,
    pub default_step: Option<StepId>,
    pub allow_step_click: bool,
    pub orientation: Orientation,
    pub labels: Labels,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            steps: onboarding::onboarding_steps(),
            default_step: None,
            allow_step_click: false,
            orientation: Orientation::Horizontal,
            labels: Labels::default(),
        }
    }
}

impl WizardConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks step ids and that the default step exists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let flow = Flow::new(self.steps.clone())?;
        if let Some(default_step) = &self.default_step {
            flow.resolve(default_step.as_str())?;
        }
        Ok(())
    }

    /// Options for a wizard over these steps; callbacks are added by the caller.
    pub fn into_options(self) -> WizardOptions {
        let mut options = WizardOptions::new(self.steps).with_step_click(self.allow_step_click);
        if let Some(default_step) = self.default_step {
            options = options.with_default_value(default_step);
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WizardError;
    use std::io::Write;

    #[test]
    fn default_is_onboarding() {
        let config = WizardConfig::default();
        let ids: Vec<&str> = config.steps.iter().map(|step| step.id.as_str()).collect();
        assert_eq!(ids, vec!["welcome", "about", "process", "guidelines", "start"]);
        assert_eq!(config.labels.next, "Next");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_partial_config() {
        let config = WizardConfig::from_yaml_str(
            "steps:\n  - value: a\n    title: A\n  - id: b\n    title: B\n    skippable: true\n\
             default_step: b\nallow_step_click: true\norientation: vertical\nlabels:\n  complete: Finish\n",
        )
        .expect("parse");
        assert_eq!(config.steps.len(), 2);
        assert!(config.steps[1].skippable);
        assert_eq!(config.orientation, Orientation::Vertical);
        assert_eq!(config.labels.complete, "Finish");
        assert_eq!(config.labels.prev, "Previous");

        let options = config.into_options();
        assert!(options.allow_step_click);
        assert_eq!(options.default_value, Some(StepId::from("b")));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = WizardConfig::from_yaml_str(
            "steps:\n  - id: a\n    title: A\n  - id: a\n    title: Again\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(WizardError::DuplicateStep(ref id)) if id == "a"
        ));
    }

    #[test]
    fn rejects_unknown_default_step() {
        let err = WizardConfig::from_yaml_str("steps:\n  - id: a\n    title: A\ndefault_step: z\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(WizardError::UnknownStep(_))));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "steps:\n  - id: only\n    title: Only").expect("write");
        let config = WizardConfig::load(file.path()).expect("load");
        assert_eq!(config.steps[0].id, "only");
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = WizardConfig::load(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
