use super::StepId;
use super::handler::{StepData, StepHandler};
use super::wizard::{Shared, Transition};
use crate::error::MisuseError;
use std::sync::{Arc, Weak};

/// Narrow capability lent to the content of one step.
///
/// It can register that step's handler, read that step's cached data and request
/// navigation. It holds no strong reference: once the wizard is dropped every call
/// fails with [`MisuseError::Detached`].
#[derive(Clone)]
pub struct StepContext {
    shared: Weak<Shared>,
    step_id: StepId,
}

impl StepContext {
    pub(crate) fn new(shared: Weak<Shared>, step_id: StepId) -> Self {
        Self { shared, step_id }
    }

    fn upgrade(&self, operation: &'static str) -> Result<Arc<Shared>, MisuseError> {
        self.shared
            .upgrade()
            .ok_or(MisuseError::Detached { operation })
    }

    pub fn step_id(&self) -> &StepId {
        &self.step_id
    }

    pub fn current_step(&self) -> Result<StepId, MisuseError> {
        Ok(self.upgrade("current_step")?.current_step())
    }

    pub fn is_current(&self) -> Result<bool, MisuseError> {
        Ok(self.current_step()? == self.step_id)
    }

    /// Previously cached data for this step, used to restore input on revisit.
    pub fn step_data(&self) -> Result<Option<StepData>, MisuseError> {
        Ok(self.upgrade("step_data")?.step_data(self.step_id.as_str()))
    }

    pub fn register(&self, handler: Arc<dyn StepHandler>) -> Result<(), MisuseError> {
        self.upgrade("register")?
            .register(self.step_id.as_str(), handler)
            .map(|_| ())
    }

    pub fn unregister(&self) -> Result<bool, MisuseError> {
        Ok(self.upgrade("unregister")?.unregister(self.step_id.as_str()))
    }

    /// Registers `handler` until the returned guard is dropped.
    pub fn mount(&self, handler: Arc<dyn StepHandler>) -> Result<Registration, MisuseError> {
        let generation = self
            .upgrade("mount")?
            .register(self.step_id.as_str(), handler)?;
        Ok(Registration {
            context: self.clone(),
            generation,
        })
    }

    pub async fn go_to_step(&self, id: &str) -> Result<Transition, MisuseError> {
        let shared = self.upgrade("go_to_step")?;
        Ok(shared.go_to_step(id).await)
    }
}

/// Mounted handler. Dropping it unregisters the handler unless a newer one replaced it.
pub struct Registration {
    context: StepContext,
    generation: u64,
}

impl Registration {
    pub fn step_id(&self) -> &StepId {
        &self.context.step_id
    }

    pub fn context(&self) -> &StepContext {
        &self.context
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Some(shared) = self.context.shared.upgrade() {
            shared.unregister_generation(self.context.step_id.as_str(), self.generation);
        }
    }
}
