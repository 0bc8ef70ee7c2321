use super::StepId;
use super::context::StepContext;
use super::flow::Flow;
use super::handler::{CompletionHandler, StepData, StepHandler};
use super::notice::Notice;
use super::options::{StepCallback, WizardOptions};
use super::registry::HandlerRegistry;
use super::step::{StepDescriptor, StepStatus};
use super::store::StepDataStore;
use crate::error::{MisuseError, WizardError};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// A validation or submission is already in flight.
    Busy,
    AtBoundary,
    NotLastStep,
    StepClickDisabled,
    UnknownStep,
    StepDisabled,
    NotSkippable,
    NoCompletionHandler,
    SameStep,
    /// The current step changed while validation was pending.
    Superseded,
}

/// Outcome of a navigation request. Rejections carry a notice for the user and leave
/// cached data untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Moved { from: StepId, to: StepId },
    Rejected(Notice),
    Completed,
    CompletionFailed(Notice),
    Ignored(IgnoreReason),
}

impl Transition {
    pub fn is_moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }

    pub fn notice(&self) -> Option<&Notice> {
        match self {
            Self::Rejected(notice) | Self::CompletionFailed(notice) => Some(notice),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardSnapshot {
    pub current_step: StepId,
    pub current_index: usize,
    pub total: usize,
    pub statuses: Vec<StepStatus>,
    pub completed: Vec<StepId>,
    pub is_validating: bool,
    pub is_submitting: bool,
    pub can_go_back: bool,
    pub can_skip: bool,
    pub is_last_step: bool,
}

impl WizardSnapshot {
    pub fn status_at(&self, index: usize) -> StepStatus {
        self.statuses
            .get(index)
            .copied()
            .unwrap_or(StepStatus::Pending)
    }

    pub fn is_busy(&self) -> bool {
        self.is_validating || self.is_submitting
    }
}

pub(crate) struct State {
    current: usize,
    handlers: HandlerRegistry,
    store: StepDataStore,
    completed: HashSet<StepId>,
    validating: bool,
    submitting: bool,
}

impl State {
    fn is_busy(&self) -> bool {
        self.validating || self.submitting
    }

    fn record(&mut self, id: &StepId, data: Option<StepData>) {
        if let Some(data) = data {
            self.store.set(id.clone(), data);
        }
        self.completed.insert(id.clone());
    }
}

#[derive(Debug, Clone, Copy)]
enum BusyFlag {
    Validating,
    Submitting,
}

/// Clears a busy flag when dropped, including when a navigation future is dropped mid-await.
struct BusyGuard<'a> {
    shared: &'a Shared,
    flag: BusyFlag,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        match self.flag {
            BusyFlag::Validating => state.validating = false,
            BusyFlag::Submitting => state.submitting = false,
        }
    }
}

struct Forward<'a> {
    from: usize,
    from_id: StepId,
    target: usize,
    handler: Option<Arc<dyn StepHandler>>,
    _busy: BusyGuard<'a>,
}

pub(crate) struct Shared {
    flow: Flow,
    allow_step_click: bool,
    on_value_change: Option<StepCallback>,
    on_complete: Option<Arc<dyn CompletionHandler>>,
    on_skip: Option<StepCallback>,
    state: Mutex<State>,
}

fn ignored(reason: IgnoreReason) -> Transition {
    debug!(?reason, "navigation ignored");
    Transition::Ignored(reason)
}

async fn run_validation(handler: Option<&dyn StepHandler>) -> bool {
    match handler {
        None => true,
        Some(handler) => handler.validate().await,
    }
}

impl Shared {
    // Never held while host code (validate, data, callbacks) runs.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn id_of(&self, index: usize) -> StepId {
        self.flow
            .id_at(index)
            .cloned()
            .unwrap_or_else(|| self.flow.first().id.clone())
    }

    pub(crate) fn current_step(&self) -> StepId {
        let index = self.lock().current;
        self.id_of(index)
    }

    pub(crate) fn step_data(&self, id: &str) -> Option<StepData> {
        self.lock().store.get(id).cloned()
    }

    pub(crate) fn register(
        &self,
        id: &str,
        handler: Arc<dyn StepHandler>,
    ) -> Result<u64, MisuseError> {
        if !self.flow.contains(id) {
            return Err(MisuseError::UnknownStep(StepId::from(id)));
        }
        let generation = self.lock().handlers.register(id, handler);
        debug!(step = id, generation, "step handler registered");
        Ok(generation)
    }

    pub(crate) fn unregister(&self, id: &str) -> bool {
        let removed = self.lock().handlers.unregister(id);
        if removed {
            debug!(step = id, "step handler unregistered");
        }
        removed
    }

    pub(crate) fn unregister_generation(&self, id: &str, generation: u64) -> bool {
        let removed = self.lock().handlers.unregister_generation(id, generation);
        if removed {
            debug!(step = id, generation, "step handler unmounted");
        }
        removed
    }

    fn notify_move(&self, transition: &Transition) {
        if let Transition::Moved { from, to } = transition {
            debug!(from = %from, to = %to, "step changed");
            if let Some(callback) = &self.on_value_change {
                callback(to);
            }
        }
    }

    fn begin_forward(
        &self,
        pick: impl FnOnce(usize) -> Result<usize, IgnoreReason>,
    ) -> Result<Forward<'_>, IgnoreReason> {
        let mut state = self.lock();
        if state.is_busy() {
            return Err(IgnoreReason::Busy);
        }
        let from = state.current;
        let target = pick(from)?;
        state.validating = true;
        let from_id = self.id_of(from);
        let handler = state.handlers.get(from_id.as_str());
        drop(state);

        Ok(Forward {
            from,
            from_id,
            target,
            handler,
            _busy: BusyGuard {
                shared: self,
                flag: BusyFlag::Validating,
            },
        })
    }

    async fn advance(&self, pick: impl FnOnce(usize) -> Result<usize, IgnoreReason>) -> Transition {
        let forward = match self.begin_forward(pick) {
            Ok(forward) => forward,
            Err(reason) => return ignored(reason),
        };

        if !run_validation(forward.handler.as_deref()).await {
            warn!(step = %forward.from_id, "step validation rejected");
            return Transition::Rejected(Notice::validation_rejected(forward.from_id.clone()));
        }

        // Extracted once; the same snapshot goes to the cache.
        let data = forward.handler.as_ref().and_then(|handler| handler.data());
        let transition = {
            let mut state = self.lock();
            if forward.handler.is_some() {
                state.record(&forward.from_id, data);
            }
            if state.current != forward.from {
                Transition::Ignored(IgnoreReason::Superseded)
            } else {
                state.current = forward.target;
                Transition::Moved {
                    from: forward.from_id.clone(),
                    to: self.id_of(forward.target),
                }
            }
        };
        drop(forward);

        self.notify_move(&transition);
        transition
    }

    fn retreat(
        &self,
        from: usize,
        from_id: StepId,
        target: usize,
        handler: Option<Arc<dyn StepHandler>>,
    ) -> Transition {
        // Keep edits made before leaving the step.
        let data = handler.and_then(|handler| handler.data());
        let transition = {
            let mut state = self.lock();
            if let Some(data) = data {
                state.store.set(from_id.clone(), data);
            }
            if state.current != from {
                Transition::Ignored(IgnoreReason::Superseded)
            } else {
                state.current = target;
                Transition::Moved {
                    from: from_id,
                    to: self.id_of(target),
                }
            }
        };

        self.notify_move(&transition);
        transition
    }

    pub(crate) async fn next(&self) -> Transition {
        self.advance(|current| {
            if self.flow.has_next(current) {
                Ok(current + 1)
            } else {
                Err(IgnoreReason::AtBoundary)
            }
        })
        .await
    }

    pub(crate) fn prev(&self) -> Transition {
        let (from, from_id, handler) = {
            let state = self.lock();
            if state.current == 0 {
                return ignored(IgnoreReason::AtBoundary);
            }
            let from_id = self.id_of(state.current);
            let handler = state.handlers.get(from_id.as_str());
            (state.current, from_id, handler)
        };
        self.retreat(from, from_id, from - 1, handler)
    }

    pub(crate) async fn go_to_step(&self, id: &str) -> Transition {
        if !self.allow_step_click {
            return ignored(IgnoreReason::StepClickDisabled);
        }
        let Some(target) = self.flow.position(id) else {
            return ignored(IgnoreReason::UnknownStep);
        };
        if self.flow.step_at(target).is_some_and(|step| step.disabled) {
            return ignored(IgnoreReason::StepDisabled);
        }

        let (current, current_id, handler) = {
            let state = self.lock();
            let current_id = self.id_of(state.current);
            let handler = state.handlers.get(current_id.as_str());
            (state.current, current_id, handler)
        };

        match target.cmp(&current) {
            std::cmp::Ordering::Equal => ignored(IgnoreReason::SameStep),
            std::cmp::Ordering::Less => self.retreat(current, current_id, target, handler),
            std::cmp::Ordering::Greater => {
                drop(handler);
                self.advance(|from| {
                    if target > from {
                        Ok(target)
                    } else {
                        Err(IgnoreReason::Superseded)
                    }
                })
                .await
            }
        }
    }

    pub(crate) fn skip(&self) -> Transition {
        let (from_id, to_id) = {
            let mut state = self.lock();
            let from = state.current;
            if !self.flow.has_next(from) {
                return ignored(IgnoreReason::AtBoundary);
            }
            if !self.flow.step_at(from).is_some_and(|step| step.skippable) {
                return ignored(IgnoreReason::NotSkippable);
            }
            state.current = from + 1;
            (self.id_of(from), self.id_of(from + 1))
        };

        info!(step = %from_id, "step skipped");
        if let Some(callback) = &self.on_skip {
            callback(&from_id);
        }
        let transition = Transition::Moved {
            from: from_id,
            to: to_id,
        };
        self.notify_move(&transition);
        transition
    }

    pub(crate) async fn complete(&self) -> Transition {
        let Some(on_complete) = self.on_complete.clone() else {
            return ignored(IgnoreReason::NoCompletionHandler);
        };

        let (from, step_id, handler) = {
            let mut state = self.lock();
            if state.is_busy() {
                return ignored(IgnoreReason::Busy);
            }
            if !self.flow.is_last(state.current) {
                return ignored(IgnoreReason::NotLastStep);
            }
            state.validating = true;
            state.submitting = true;
            let step_id = self.id_of(state.current);
            let handler = state.handlers.get(step_id.as_str());
            (state.current, step_id, handler)
        };
        let _submitting = BusyGuard {
            shared: self,
            flag: BusyFlag::Submitting,
        };
        let validating = BusyGuard {
            shared: self,
            flag: BusyFlag::Validating,
        };

        let valid = run_validation(handler.as_deref()).await;
        drop(validating);
        if !valid {
            warn!(step = %step_id, "final step validation rejected");
            return Transition::Rejected(Notice::validation_rejected(step_id));
        }

        let data = handler.as_ref().and_then(|handler| handler.data());
        let aggregate = {
            let mut state = self.lock();
            if handler.is_some() {
                state.record(&step_id, data);
            }
            // The user left the last step while it was validating.
            if state.current != from {
                None
            } else {
                Some(state.store.aggregate(self.flow.ids()))
            }
        };
        let Some(aggregate) = aggregate else {
            debug!(step = %step_id, "completion superseded by navigation");
            return ignored(IgnoreReason::Superseded);
        };

        info!(step = %step_id, entries = aggregate.len(), "submitting wizard data");
        match on_complete.complete(aggregate).await {
            Ok(()) => {
                info!("wizard completed");
                Transition::Completed
            }
            Err(err) => {
                error!(step = %step_id, error = %err, "wizard completion failed");
                Transition::CompletionFailed(Notice::completion_failed(step_id, format!("{err:#}")))
            }
        }
    }

    pub(crate) fn snapshot(&self) -> WizardSnapshot {
        let state = self.lock();
        let current = state.current;
        let statuses = self
            .flow
            .steps()
            .enumerate()
            .map(|(index, step)| {
                if index == current {
                    StepStatus::Active
                } else if state.completed.contains(&step.id) {
                    StepStatus::Done
                } else if step.disabled {
                    StepStatus::Disabled
                } else {
                    StepStatus::Pending
                }
            })
            .collect();
        let completed = self
            .flow
            .ids()
            .filter(|id| state.completed.contains(*id))
            .cloned()
            .collect();

        WizardSnapshot {
            current_step: self.id_of(current),
            current_index: current,
            total: self.flow.len(),
            statuses,
            completed,
            is_validating: state.validating,
            is_submitting: state.submitting,
            can_go_back: current > 0,
            can_skip: self.flow.has_next(current)
                && self.flow.step_at(current).is_some_and(|step| step.skippable),
            is_last_step: self.flow.is_last(current),
        }
    }
}

/// Step sequencer: ordered steps, per-step validation and caching, aggregation on completion.
pub struct Wizard {
    shared: Arc<Shared>,
}

impl Wizard {
    pub fn new(options: WizardOptions) -> Result<Self, WizardError> {
        let flow = Flow::new(options.steps)?;
        let current = match options.value.or(options.default_value) {
            Some(id) => flow.resolve(id.as_str())?,
            None => 0,
        };
        debug!(steps = flow.len(), current, "wizard created");

        Ok(Self {
            shared: Arc::new(Shared {
                flow,
                allow_step_click: options.allow_step_click,
                on_value_change: options.on_value_change,
                on_complete: options.on_complete,
                on_skip: options.on_skip,
                state: Mutex::new(State {
                    current,
                    handlers: HandlerRegistry::new(),
                    store: StepDataStore::new(),
                    completed: HashSet::new(),
                    validating: false,
                    submitting: false,
                }),
            }),
        })
    }

    pub fn steps(&self) -> &Flow {
        &self.shared.flow
    }

    pub fn allows_step_click(&self) -> bool {
        self.shared.allow_step_click
    }

    pub fn current_step(&self) -> StepId {
        self.shared.current_step()
    }

    pub fn current_index(&self) -> usize {
        self.shared.lock().current
    }

    pub fn current_descriptor(&self) -> &StepDescriptor {
        let index = self.current_index();
        self.shared
            .flow
            .step_at(index)
            .unwrap_or_else(|| self.shared.flow.first())
    }

    pub fn step_data(&self, id: &str) -> Option<StepData> {
        self.shared.step_data(id)
    }

    pub fn is_completed(&self, id: &str) -> bool {
        self.shared.lock().completed.contains(id)
    }

    pub fn completed_steps(&self) -> Vec<StepId> {
        self.shared.snapshot().completed
    }

    pub fn is_validating(&self) -> bool {
        self.shared.lock().validating
    }

    pub fn is_submitting(&self) -> bool {
        self.shared.lock().submitting
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        self.shared.snapshot()
    }

    /// Syncs an externally controlled current step without notifying `on_value_change`.
    pub fn set_value(&self, id: &str) -> Result<(), WizardError> {
        let index = self.shared.flow.resolve(id)?;
        self.shared.lock().current = index;
        debug!(step = id, "controlled step value applied");
        Ok(())
    }

    pub fn register_step(
        &self,
        id: &str,
        handler: impl StepHandler + 'static,
    ) -> Result<(), MisuseError> {
        self.shared.register(id, Arc::new(handler)).map(|_| ())
    }

    pub fn unregister_step(&self, id: &str) -> bool {
        self.shared.unregister(id)
    }

    /// Capability handed to the content of step `id`.
    pub fn context(&self, id: &str) -> Result<StepContext, WizardError> {
        let index = self.shared.flow.resolve(id)?;
        Ok(StepContext::new(
            Arc::downgrade(&self.shared),
            self.shared.id_of(index),
        ))
    }

    pub async fn next(&self) -> Transition {
        self.shared.next().await
    }

    pub fn prev(&self) -> Transition {
        self.shared.prev()
    }

    pub async fn go_to_step(&self, id: &str) -> Transition {
        self.shared.go_to_step(id).await
    }

    pub fn skip(&self) -> Transition {
        self.shared.skip()
    }

    pub async fn complete(&self) -> Transition {
        self.shared.complete().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::handler::{Aggregate, FnHandler};
    use crate::core::notice::NoticeKind;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn steps(ids: &[&str]) -> Vec<StepDescriptor> {
        ids.iter().map(|id| StepDescriptor::new(*id, *id)).collect()
    }

    fn wizard(ids: &[&str]) -> Wizard {
        Wizard::new(WizardOptions::new(steps(ids))).expect("wizard")
    }

    fn capture() -> (Arc<Mutex<Option<Aggregate>>>, impl CompletionHandler + 'static) {
        let slot = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&slot);
        let handler = move |data: Aggregate| {
            let sink = Arc::clone(&sink);
            async move {
                *sink.lock().expect("lock") = Some(data);
                Ok::<_, anyhow::Error>(())
            }
        };
        (slot, handler)
    }

    #[tokio::test]
    async fn next_and_prev_follow_descriptor_order() {
        let wizard = wizard(&["a", "b", "c", "d"]);
        let mut visited = vec![wizard.current_step()];
        for _ in 0..3 {
            assert!(wizard.next().await.is_moved());
            visited.push(wizard.current_step());
        }
        assert_eq!(visited, vec!["a", "b", "c", "d"]);
        assert_eq!(
            wizard.next().await,
            Transition::Ignored(IgnoreReason::AtBoundary)
        );

        let mut back = Vec::new();
        for _ in 0..3 {
            assert!(wizard.prev().is_moved());
            back.push(wizard.current_step());
        }
        assert_eq!(back, vec!["c", "b", "a"]);
        assert_eq!(wizard.prev(), Transition::Ignored(IgnoreReason::AtBoundary));
    }

    #[tokio::test]
    async fn steps_without_handlers_pass() {
        let (slot, handler) = capture();
        let wizard =
            Wizard::new(WizardOptions::new(steps(&["a", "b"])).on_complete(handler)).expect("wizard");

        assert_eq!(
            wizard.next().await,
            Transition::Moved {
                from: StepId::from("a"),
                to: StepId::from("b"),
            }
        );
        assert_eq!(wizard.complete().await, Transition::Completed);
        let aggregate = slot.lock().expect("lock").take().expect("completed");
        assert!(aggregate.is_empty());
        assert!(!wizard.is_completed("a"));
    }

    #[tokio::test]
    async fn failing_validation_blocks_next() {
        let wizard = wizard(&["a", "b"]);
        wizard
            .register_step("a", FnHandler::new(|| async { false }))
            .expect("register");

        for _ in 0..3 {
            let transition = wizard.next().await;
            let notice = transition.notice().expect("notice");
            assert_eq!(notice.kind, NoticeKind::ValidationRejected);
            assert_eq!(notice.step_id, "a");
            assert_eq!(wizard.current_step(), "a");
            assert!(!wizard.is_completed("a"));
        }
        assert!(!wizard.is_validating());
    }

    #[tokio::test]
    async fn cached_data_survives_prev_then_next() {
        let wizard = wizard(&["a", "b"]);
        wizard
            .register_step(
                "a",
                FnHandler::always_valid().with_data(|| json!({ "field": "value" })),
            )
            .expect("register");

        assert!(wizard.next().await.is_moved());
        assert_eq!(wizard.step_data("a"), Some(json!({ "field": "value" })));
        assert!(wizard.is_completed("a"));

        assert!(wizard.prev().is_moved());
        assert!(wizard.next().await.is_moved());
        assert_eq!(wizard.step_data("a"), Some(json!({ "field": "value" })));
        assert_eq!(wizard.shared.lock().store.len(), 1);
    }

    #[tokio::test]
    async fn prev_caches_current_edits_without_validating() {
        let validations = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&validations);
        let wizard = wizard(&["a", "b"]);
        wizard.set_value("b").expect("controlled value");
        wizard
            .register_step(
                "b",
                FnHandler::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async { false }
                })
                .with_data(|| json!({ "draft": true })),
            )
            .expect("register");

        assert!(wizard.prev().is_moved());
        assert_eq!(validations.load(Ordering::SeqCst), 0);
        assert_eq!(wizard.step_data("b"), Some(json!({ "draft": true })));
        assert!(!wizard.is_completed("b"));
    }

    #[tokio::test]
    async fn completion_aggregates_every_cached_step() {
        let (slot, handler) = capture();
        let wizard = Wizard::new(WizardOptions::new(steps(&["one", "two", "three"])).on_complete(handler))
            .expect("wizard");
        wizard
            .register_step("one", FnHandler::always_valid().with_data(|| json!({ "field": 1 })))
            .expect("register");
        wizard
            .register_step("two", FnHandler::always_valid().with_data(|| json!({ "field": 2 })))
            .expect("register");
        wizard
            .register_step("three", FnHandler::always_valid().with_data(|| json!({ "done": true })))
            .expect("register");

        assert!(wizard.next().await.is_moved());
        assert!(wizard.next().await.is_moved());
        assert_eq!(wizard.complete().await, Transition::Completed);

        let aggregate = slot.lock().expect("lock").take().expect("completed");
        assert_eq!(aggregate.len(), 3);
        assert_eq!(aggregate["one"], json!({ "field": 1 }));
        assert_eq!(aggregate["two"], json!({ "field": 2 }));
        assert_eq!(aggregate["three"], json!({ "done": true }));
        let keys: Vec<&str> = aggregate.keys().map(StepId::as_str).collect();
        assert_eq!(keys, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn completion_extracts_last_step_data_once() {
        let extractions = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&extractions);
        let (slot, handler) = capture();
        let wizard =
            Wizard::new(WizardOptions::new(steps(&["only"])).on_complete(handler)).expect("wizard");
        wizard
            .register_step(
                "only",
                FnHandler::always_valid().with_data(move || {
                    json!({ "n": counter.fetch_add(1, Ordering::SeqCst) + 1 })
                }),
            )
            .expect("register");

        assert_eq!(wizard.complete().await, Transition::Completed);
        assert_eq!(extractions.load(Ordering::SeqCst), 1);
        let aggregate = slot.lock().expect("lock").take().expect("completed");
        assert_eq!(aggregate["only"], json!({ "n": 1 }));
        assert_eq!(wizard.step_data("only"), Some(json!({ "n": 1 })));
    }

    #[tokio::test]
    async fn second_complete_while_pending_is_ignored() {
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());
        let handler = {
            let calls = Arc::clone(&calls);
            let gate = Arc::clone(&gate);
            move |_data: Aggregate| {
                let calls = Arc::clone(&calls);
                let gate = Arc::clone(&gate);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    gate.notified().await;
                    Ok(())
                }
            }
        };
        let wizard =
            Wizard::new(WizardOptions::new(steps(&["a"])).on_complete(handler)).expect("wizard");

        let (first, second, ()) = tokio::join!(wizard.complete(), wizard.complete(), async {
            gate.notify_one();
        });

        assert_eq!(first, Transition::Completed);
        assert_eq!(second, Transition::Ignored(IgnoreReason::Busy));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!wizard.is_submitting());
    }

    #[tokio::test]
    async fn leaving_last_step_during_validation_cancels_completion() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let on_complete = move |_data: Aggregate| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, anyhow::Error>(()) }
        };
        let wizard = Wizard::new(
            WizardOptions::new(steps(&["a", "b"]))
                .with_value("b")
                .on_complete(on_complete),
        )
        .expect("wizard");

        let gate = Arc::new(Notify::new());
        let validation_gate = Arc::clone(&gate);
        wizard
            .register_step(
                "b",
                FnHandler::new(move || {
                    let gate = Arc::clone(&validation_gate);
                    async move {
                        gate.notified().await;
                        true
                    }
                })
                .with_data(|| json!({ "b": 1 })),
            )
            .expect("register");

        let (completed, moved) = tokio::join!(wizard.complete(), async {
            let moved = wizard.prev();
            gate.notify_one();
            moved
        });

        assert!(moved.is_moved());
        assert_eq!(completed, Transition::Ignored(IgnoreReason::Superseded));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(wizard.current_step(), "a");
        assert_eq!(wizard.step_data("b"), Some(json!({ "b": 1 })));
        assert!(!wizard.is_submitting());
        assert!(!wizard.is_validating());
    }

    #[tokio::test]
    async fn next_while_validating_is_ignored() {
        let gate = Arc::new(Notify::new());
        let wizard = wizard(&["a", "b", "c"]);
        let validation_gate = Arc::clone(&gate);
        wizard
            .register_step(
                "a",
                FnHandler::new(move || {
                    let gate = Arc::clone(&validation_gate);
                    async move {
                        gate.notified().await;
                        true
                    }
                }),
            )
            .expect("register");

        let (first, second, ()) = tokio::join!(wizard.next(), wizard.next(), async {
            gate.notify_one();
        });

        assert!(first.is_moved());
        assert_eq!(second, Transition::Ignored(IgnoreReason::Busy));
        assert_eq!(wizard.current_step(), "b");
        assert!(!wizard.is_validating());
    }

    #[tokio::test]
    async fn skip_bypasses_validation_and_cache() {
        let validations = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&validations);
        let skipped = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&skipped);

        let mut descriptors = steps(&["a", "b"]);
        descriptors[0].skippable = true;
        let wizard = Wizard::new(
            WizardOptions::new(descriptors)
                .on_skip(move |id| sink.lock().expect("lock").push(id.clone())),
        )
        .expect("wizard");
        wizard
            .register_step(
                "a",
                FnHandler::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async { true }
                })
                .with_data(|| json!({ "x": 1 })),
            )
            .expect("register");

        assert!(wizard.skip().is_moved());
        assert_eq!(wizard.current_step(), "b");
        assert_eq!(validations.load(Ordering::SeqCst), 0);
        assert!(wizard.step_data("a").is_none());
        assert!(!wizard.is_completed("a"));
        assert_eq!(*skipped.lock().expect("lock"), vec![StepId::from("a")]);
    }

    #[tokio::test]
    async fn skip_requires_skippable_step_before_last() {
        let mut descriptors = steps(&["a", "b"]);
        descriptors[1].skippable = true;
        let wizard = Wizard::new(WizardOptions::new(descriptors)).expect("wizard");

        assert_eq!(wizard.skip(), Transition::Ignored(IgnoreReason::NotSkippable));
        assert!(wizard.next().await.is_moved());
        assert_eq!(wizard.skip(), Transition::Ignored(IgnoreReason::AtBoundary));
    }

    #[tokio::test]
    async fn jump_to_disabled_step_is_rejected() {
        let mut descriptors = steps(&["a", "b", "c"]);
        descriptors[2].disabled = true;
        let wizard =
            Wizard::new(WizardOptions::new(descriptors).with_step_click(true)).expect("wizard");

        assert_eq!(
            wizard.go_to_step("c").await,
            Transition::Ignored(IgnoreReason::StepDisabled)
        );
        assert_eq!(wizard.current_step(), "a");
        assert_eq!(wizard.snapshot().status_at(2), StepStatus::Disabled);
    }

    #[tokio::test]
    async fn jump_requires_step_click() {
        let wizard = wizard(&["a", "b"]);
        assert_eq!(
            wizard.go_to_step("b").await,
            Transition::Ignored(IgnoreReason::StepClickDisabled)
        );
        assert_eq!(wizard.current_step(), "a");
    }

    #[tokio::test]
    async fn jump_forward_validates_and_backward_caches() {
        let wizard = Wizard::new(WizardOptions::new(steps(&["a", "b", "c"])).with_step_click(true))
            .expect("wizard");
        wizard
            .register_step("a", FnHandler::new(|| async { false }))
            .expect("register");

        let rejected = wizard.go_to_step("c").await;
        assert!(matches!(rejected, Transition::Rejected(_)));
        assert_eq!(wizard.current_step(), "a");

        wizard
            .register_step("a", FnHandler::always_valid().with_data(|| json!("a")))
            .expect("register");
        assert!(wizard.go_to_step("c").await.is_moved());
        assert_eq!(wizard.current_step(), "c");
        assert!(wizard.is_completed("a"));

        wizard
            .register_step("c", FnHandler::new(|| async { false }).with_data(|| json!("c")))
            .expect("register");
        assert!(wizard.go_to_step("a").await.is_moved());
        assert_eq!(wizard.step_data("c"), Some(json!("c")));
        assert_eq!(
            wizard.go_to_step("a").await,
            Transition::Ignored(IgnoreReason::SameStep)
        );
        assert_eq!(
            wizard.go_to_step("nope").await,
            Transition::Ignored(IgnoreReason::UnknownStep)
        );
    }

    #[tokio::test]
    async fn failed_completion_keeps_state_and_allows_retry() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let handler = move |_data: Aggregate| {
            let attempt = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                anyhow::ensure!(attempt > 0, "backend unavailable");
                Ok(())
            }
        };
        let wizard =
            Wizard::new(WizardOptions::new(steps(&["a", "b"])).on_complete(handler)).expect("wizard");
        wizard
            .register_step("a", FnHandler::always_valid().with_data(|| json!({ "kept": true })))
            .expect("register");
        assert!(wizard.next().await.is_moved());

        let failed = wizard.complete().await;
        let notice = failed.notice().expect("notice").clone();
        assert_eq!(notice.kind, NoticeKind::CompletionFailed);
        assert_eq!(notice.detail.as_deref(), Some("backend unavailable"));
        assert_eq!(wizard.current_step(), "b");
        assert!(!wizard.is_submitting());
        assert_eq!(wizard.step_data("a"), Some(json!({ "kept": true })));

        assert_eq!(wizard.complete().await, Transition::Completed);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn complete_requires_last_step_and_handler() {
        let wizard = wizard(&["a", "b"]);
        assert_eq!(
            wizard.complete().await,
            Transition::Ignored(IgnoreReason::NoCompletionHandler)
        );

        let (_slot, handler) = capture();
        let wizard =
            Wizard::new(WizardOptions::new(steps(&["a", "b"])).on_complete(handler)).expect("wizard");
        assert_eq!(
            wizard.complete().await,
            Transition::Ignored(IgnoreReason::NotLastStep)
        );
    }

    #[tokio::test]
    async fn rejected_final_validation_does_not_submit() {
        let (slot, handler) = capture();
        let wizard =
            Wizard::new(WizardOptions::new(steps(&["a"])).on_complete(handler)).expect("wizard");
        wizard
            .register_step("a", FnHandler::new(|| async { false }))
            .expect("register");

        assert!(matches!(wizard.complete().await, Transition::Rejected(_)));
        assert!(slot.lock().expect("lock").is_none());
        assert!(!wizard.is_submitting());
    }

    #[tokio::test]
    async fn value_change_is_notified_on_committed_moves() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let wizard = Wizard::new(
            WizardOptions::new(steps(&["a", "b"]))
                .on_value_change(move |id| sink.lock().expect("lock").push(id.to_string())),
        )
        .expect("wizard");

        wizard.next().await;
        wizard.next().await;
        wizard.prev();
        wizard.set_value("b").expect("controlled");
        assert_eq!(*seen.lock().expect("lock"), vec!["b", "a"]);
    }

    #[test]
    fn initial_step_prefers_value_then_default() {
        let options = WizardOptions::new(steps(&["a", "b", "c"]))
            .with_value("c")
            .with_default_value("b");
        assert_eq!(Wizard::new(options).expect("wizard").current_step(), "c");

        let options = WizardOptions::new(steps(&["a", "b", "c"])).with_default_value("b");
        assert_eq!(Wizard::new(options).expect("wizard").current_step(), "b");

        let options = WizardOptions::new(steps(&["a", "b"])).with_value("zzz");
        assert_eq!(
            Wizard::new(options).err(),
            Some(WizardError::UnknownStep(StepId::from("zzz")))
        );
    }

    #[test]
    fn registering_unknown_step_is_misuse() {
        let wizard = wizard(&["a"]);
        assert_eq!(
            wizard.register_step("ghost", FnHandler::always_valid()),
            Err(MisuseError::UnknownStep(StepId::from("ghost")))
        );
    }

    #[tokio::test]
    async fn reregistering_keeps_cached_data() {
        let wizard = wizard(&["a", "b"]);
        wizard
            .register_step("a", FnHandler::always_valid().with_data(|| json!(1)))
            .expect("register");
        wizard.next().await;
        wizard.prev();
        wizard
            .register_step("a", FnHandler::always_valid())
            .expect("register");
        assert_eq!(wizard.step_data("a"), Some(json!(1)));
    }

    #[tokio::test]
    async fn snapshot_reports_progress() {
        let mut descriptors = steps(&["a", "b", "c"]);
        descriptors[1].skippable = true;
        let wizard = Wizard::new(WizardOptions::new(descriptors)).expect("wizard");
        wizard
            .register_step("a", FnHandler::always_valid())
            .expect("register");
        wizard.next().await;

        let snapshot = wizard.snapshot();
        assert_eq!(snapshot.current_step, "b");
        assert_eq!(snapshot.current_index, 1);
        assert_eq!(snapshot.total, 3);
        assert_eq!(
            snapshot.statuses,
            vec![StepStatus::Done, StepStatus::Active, StepStatus::Pending]
        );
        assert_eq!(snapshot.completed, vec![StepId::from("a")]);
        assert!(snapshot.can_go_back);
        assert!(snapshot.can_skip);
        assert!(!snapshot.is_last_step);
        assert!(!snapshot.is_busy());
    }
}
