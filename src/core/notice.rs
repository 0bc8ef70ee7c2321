use super::StepId;
use std::time::Duration;

pub const VALIDATION_REJECTED_MESSAGE: &str = "Please complete all required fields to continue";
pub const COMPLETION_FAILED_MESSAGE: &str = "An error occurred while completing the wizard";

const VALIDATION_REJECTED_DURATION: Duration = Duration::from_millis(4000);
const COMPLETION_FAILED_DURATION: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    ValidationRejected,
    CompletionFailed,
}

/// Transient, recoverable message for the user. Never blocks further interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub step_id: StepId,
    pub message: String,
    pub detail: Option<String>,
    pub duration: Duration,
}

impl Notice {
    pub fn validation_rejected(step_id: impl Into<StepId>) -> Self {
        Self {
            kind: NoticeKind::ValidationRejected,
            step_id: step_id.into(),
            message: VALIDATION_REJECTED_MESSAGE.to_string(),
            detail: None,
            duration: VALIDATION_REJECTED_DURATION,
        }
    }

    pub fn completion_failed(step_id: impl Into<StepId>, detail: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::CompletionFailed,
            step_id: step_id.into(),
            message: COMPLETION_FAILED_MESSAGE.to_string(),
            detail: Some(detail.into()),
            duration: COMPLETION_FAILED_DURATION,
        }
    }
}
