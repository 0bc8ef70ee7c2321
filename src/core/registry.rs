use super::StepId;
use super::handler::StepHandler;
use std::collections::HashMap;
use std::sync::Arc;

struct Entry {
    generation: u64,
    handler: Arc<dyn StepHandler>,
}

/// Active handlers keyed by step id; at most one per step.
#[derive(Default)]
pub struct HandlerRegistry {
    entries: HashMap<StepId, Entry>,
    next_generation: u64,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any earlier handler for `id` and returns the new generation.
    pub fn register(&mut self, id: impl Into<StepId>, handler: Arc<dyn StepHandler>) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.entries.insert(id.into(), Entry { generation, handler });
        generation
    }

    pub fn unregister(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Removes the handler only if it is still the one registered as `generation`.
    pub fn unregister_generation(&mut self, id: &str, generation: u64) -> bool {
        let current = self
            .entries
            .get(id)
            .is_some_and(|entry| entry.generation == generation);
        if current {
            self.entries.remove(id);
        }
        current
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn StepHandler>> {
        self.entries.get(id).map(|entry| Arc::clone(&entry.handler))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
