use super::StepId;
use super::step::StepDescriptor;
use crate::error::WizardError;
use indexmap::IndexMap;

/// Ordered, validated step descriptors. The single source of truth for order.
#[derive(Debug, Clone)]
pub struct Flow {
    steps: IndexMap<StepId, StepDescriptor>,
}

impl Flow {
    pub fn new(steps: Vec<StepDescriptor>) -> Result<Self, WizardError> {
        if steps.is_empty() {
            return Err(WizardError::EmptyFlow);
        }

        let mut map = IndexMap::with_capacity(steps.len());
        for (position, step) in steps.into_iter().enumerate() {
            if step.id.is_empty() {
                return Err(WizardError::EmptyStepId { position });
            }
            if map.contains_key(step.id.as_str()) {
                return Err(WizardError::DuplicateStep(step.id));
            }
            map.insert(step.id.clone(), step);
        }

        Ok(Self { steps: map })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    pub fn is_last(&self, index: usize) -> bool {
        index == self.last_index()
    }

    pub fn has_next(&self, index: usize) -> bool {
        index + 1 < self.steps.len()
    }

    pub fn first(&self) -> &StepDescriptor {
        // Construction rejects empty flows.
        &self.steps[0]
    }

    pub fn step_at(&self, index: usize) -> Option<&StepDescriptor> {
        self.steps.get_index(index).map(|(_, step)| step)
    }

    pub fn id_at(&self, index: usize) -> Option<&StepId> {
        self.steps.get_index(index).map(|(id, _)| id)
    }

    pub fn get(&self, id: &str) -> Option<&StepDescriptor> {
        self.steps.get(id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.steps.get_index_of(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.steps.contains_key(id)
    }

    pub fn steps(&self) -> impl Iterator<Item = &StepDescriptor> {
        self.steps.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &StepId> {
        self.steps.keys()
    }

    pub fn resolve(&self, id: &str) -> Result<usize, WizardError> {
        self.position(id)
            .ok_or_else(|| WizardError::UnknownStep(StepId::from(id)))
    }
}
