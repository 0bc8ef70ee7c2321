use crate::core::WizardSnapshot;
use crate::ui::progress::{Viewport, counter};
use crate::ui::span::{Span, SpanLine};
use crate::ui::theme::Theme;
use serde::{Deserialize, Serialize};

pub const VALIDATING_LABEL: &str = "Validating...";
pub const COMPLETING_LABEL: &str = "Completing...";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub prev: String,
    pub next: String,
    pub complete: String,
    pub skip: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            prev: "Previous".to_string(),
            next: "Next".to_string(),
            complete: "Complete".to_string(),
            skip: "Skip".to_string(),
        }
    }
}

/// Label of the forward button for the current state.
pub fn primary_label<'a>(snapshot: &WizardSnapshot, labels: &'a Labels) -> &'a str {
    if snapshot.is_last_step {
        if snapshot.is_submitting {
            COMPLETING_LABEL
        } else {
            &labels.complete
        }
    } else if snapshot.is_validating {
        VALIDATING_LABEL
    } else {
        &labels.next
    }
}

fn button(label: &str, enabled: bool, theme: &Theme) -> Span {
    let style = if enabled { theme.button } else { theme.disabled };
    Span::styled(format!("[{label}]"), style)
}

/// Navigation controls: previous, counter on wide terminals, skip, next or complete.
pub fn controls(
    snapshot: &WizardSnapshot,
    labels: &Labels,
    viewport: Viewport,
    theme: &Theme,
) -> SpanLine {
    let mut line = vec![button(&labels.prev, snapshot.can_go_back, theme)];
    if viewport == Viewport::Wide {
        line.push(Span::new("  "));
        line.push(Span::styled(counter(snapshot), theme.muted));
    }
    line.push(Span::new("  "));
    if snapshot.can_skip {
        line.push(button(&labels.skip, true, theme));
        line.push(Span::new(" "));
    }
    let busy = if snapshot.is_last_step {
        snapshot.is_submitting
    } else {
        snapshot.is_validating
    };
    line.push(button(primary_label(snapshot, labels), !busy, theme));
    line
}
