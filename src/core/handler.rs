use super::StepId;
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use std::future::Future;

/// Snapshot of whatever a step contributes. Its shape is host-defined.
pub type StepData = serde_json::Value;

/// Step id to last cached data, in flow order.
pub type Aggregate = IndexMap<StepId, StepData>;

/// Validate/extract contract that mounted step content contributes.
#[async_trait]
pub trait StepHandler: Send + Sync {
    async fn validate(&self) -> bool;

    /// Called at most once per successful transition.
    fn data(&self) -> Option<StepData> {
        None
    }
}

type ValidateFn = Box<dyn Fn() -> BoxFuture<'static, bool> + Send + Sync>;
type DataFn = Box<dyn Fn() -> StepData + Send + Sync>;

/// Closure-backed handler for content that doesn't warrant its own type.
pub struct FnHandler {
    validate: ValidateFn,
    data: Option<DataFn>,
}

impl FnHandler {
    pub fn new<F, Fut>(validate: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Self {
            validate: Box::new(move || validate().boxed()),
            data: None,
        }
    }

    pub fn always_valid() -> Self {
        Self::new(|| async { true })
    }

    pub fn with_data(mut self, data: impl Fn() -> StepData + Send + Sync + 'static) -> Self {
        self.data = Some(Box::new(data));
        self
    }
}

#[async_trait]
impl StepHandler for FnHandler {
    async fn validate(&self) -> bool {
        (self.validate)().await
    }

    fn data(&self) -> Option<StepData> {
        self.data.as_ref().map(|data| data())
    }
}

/// Receives the aggregate once the last step validates.
#[async_trait]
pub trait CompletionHandler: Send + Sync {
    async fn complete(&self, data: Aggregate) -> anyhow::Result<()>;
}

#[async_trait]
impl<F, Fut> CompletionHandler for F
where
    F: Fn(Aggregate) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn complete(&self, data: Aggregate) -> anyhow::Result<()> {
        (self)(data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn fn_handler_runs_closures() {
        let handler = FnHandler::new(|| async { false }).with_data(|| json!({ "a": 1 }));
        assert!(!handler.validate().await);
        assert_eq!(handler.data(), Some(json!({ "a": 1 })));
    }

    #[tokio::test]
    async fn fn_handler_without_data_extractor() {
        let handler = FnHandler::always_valid();
        assert!(handler.validate().await);
        assert!(handler.data().is_none());
    }

    #[tokio::test]
    async fn closures_are_completion_handlers() {
        let handler = |data: Aggregate| async move {
            anyhow::ensure!(!data.is_empty(), "nothing to submit");
            Ok(())
        };
        assert!(handler.complete(Aggregate::new()).await.is_err());

        let mut data = Aggregate::new();
        data.insert(StepId::from("about"), json!({}));
        assert!(handler.complete(data).await.is_ok());
    }
}
