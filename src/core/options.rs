use super::StepId;
use super::handler::CompletionHandler;
use super::step::StepDescriptor;
use std::sync::Arc;

pub type StepCallback = Arc<dyn Fn(&StepId) + Send + Sync>;

/// Host configuration supplied when a wizard is built.
#[derive(Clone, Default)]
pub struct WizardOptions {
    pub steps: Vec<StepDescriptor>,
    /// Externally controlled current step; wins over `default_value`.
    pub value: Option<StepId>,
    pub default_value: Option<StepId>,
    pub allow_step_click: bool,
    pub on_value_change: Option<StepCallback>,
    pub on_complete: Option<Arc<dyn CompletionHandler>>,
    pub on_skip: Option<StepCallback>,
}

impl WizardOptions {
    pub fn new(steps: Vec<StepDescriptor>) -> Self {
        Self {
            steps,
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<StepId>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_default_value(mut self, value: impl Into<StepId>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_step_click(mut self, allow: bool) -> Self {
        self.allow_step_click = allow;
        self
    }

    pub fn on_value_change(mut self, f: impl Fn(&StepId) + Send + Sync + 'static) -> Self {
        self.on_value_change = Some(Arc::new(f));
        self
    }

    pub fn on_complete(mut self, handler: impl CompletionHandler + 'static) -> Self {
        self.on_complete = Some(Arc::new(handler));
        self
    }

    pub fn on_skip(mut self, f: impl Fn(&StepId) + Send + Sync + 'static) -> Self {
        self.on_skip = Some(Arc::new(f));
        self
    }
}
