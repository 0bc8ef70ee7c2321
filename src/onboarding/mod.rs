pub mod about;
pub mod content;

pub use about::{AboutField, AboutForm, AboutStep};

use crate::core::{Registration, StepDescriptor, StepId, Transition, Wizard, WizardOptions};
use crate::error::Result;
use content::Section;
use std::sync::Arc;
use tracing::debug;

pub const WELCOME: &str = "welcome";
pub const ABOUT: &str = "about";
pub const PROCESS: &str = "process";
pub const GUIDELINES: &str = "guidelines";
pub const START: &str = "start";

pub fn onboarding_steps() -> Vec<StepDescriptor> {
    vec![
        StepDescriptor::new(WELCOME, "Welcome"),
        StepDescriptor::new(ABOUT, "Details"),
        StepDescriptor::new(PROCESS, "Workflow"),
        StepDescriptor::new(GUIDELINES, "Guidelines"),
        StepDescriptor::new(START, "Getting Started"),
    ]
}

/// Static copy for an informational step, if `id` is one.
pub fn section(id: &str) -> Option<&'static Section> {
    match id {
        WELCOME => Some(&content::WELCOME),
        PROCESS => Some(&content::PROCESS),
        GUIDELINES => Some(&content::GUIDELINES),
        START => Some(&content::START),
        _ => None,
    }
}

struct Mounted {
    about: AboutStep,
    _registration: Registration,
}

/// Drives a wizard over the onboarding steps. Step content is mounted while its
/// step is current and dropped when the step is left, so revisited forms are
/// restored from the wizard's cache.
pub struct Onboarding {
    wizard: Wizard,
    mounted: Option<Mounted>,
}

impl Onboarding {
    pub fn new(options: WizardOptions) -> Result<Self> {
        let mut onboarding = Self {
            wizard: Wizard::new(options)?,
            mounted: None,
        };
        onboarding.sync()?;
        Ok(onboarding)
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    /// The profile form, while the about step is current.
    pub fn about(&self) -> Option<&AboutStep> {
        self.mounted.as_ref().map(|mounted| &mounted.about)
    }

    fn sync(&mut self) -> Result<()> {
        let current: StepId = self.wizard.current_step();
        if current != ABOUT {
            if self.mounted.take().is_some() {
                debug!(step = ABOUT, "step content unmounted");
            }
            return Ok(());
        }
        if self.mounted.is_some() {
            return Ok(());
        }

        let context = self.wizard.context(ABOUT)?;
        let about = AboutStep::new();
        if let Some(data) = context.step_data()? {
            about.restore(&data);
        }
        let registration = context.mount(Arc::new(about.clone()))?;
        debug!(step = ABOUT, "step content mounted");
        self.mounted = Some(Mounted {
            about,
            _registration: registration,
        });
        Ok(())
    }

    fn settle(&mut self, transition: Transition) -> Result<Transition> {
        self.sync()?;
        Ok(transition)
    }

    pub async fn next(&mut self) -> Result<Transition> {
        let transition = self.wizard.next().await;
        self.settle(transition)
    }

    pub fn prev(&mut self) -> Result<Transition> {
        let transition = self.wizard.prev();
        self.settle(transition)
    }

    pub async fn go_to_step(&mut self, id: &str) -> Result<Transition> {
        let transition = self.wizard.go_to_step(id).await;
        self.settle(transition)
    }

    pub fn skip(&mut self) -> Result<Transition> {
        let transition = self.wizard.skip();
        self.settle(transition)
    }

    pub async fn complete(&mut self) -> Result<Transition> {
        let transition = self.wizard.complete().await;
        self.settle(transition)
    }
}
