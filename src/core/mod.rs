pub mod context;
pub mod flow;
pub mod handler;
pub mod notice;
pub mod options;
pub mod registry;
pub mod step;
pub mod store;
pub mod wizard;

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

pub use context::{Registration, StepContext};
pub use flow::Flow;
pub use handler::{Aggregate, CompletionHandler, FnHandler, StepData, StepHandler};
pub use notice::{Notice, NoticeKind};
pub use options::WizardOptions;
pub use step::{StepDescriptor, StepStatus};
pub use wizard::{IgnoreReason, Transition, Wizard, WizardSnapshot};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Borrow<str> for StepId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for StepId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for StepId {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for StepId {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl From<String> for StepId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for StepId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&String> for StepId {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}
