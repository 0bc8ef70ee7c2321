use crate::core::{Flow, StepStatus, WizardSnapshot};
use crate::ui::span::{Span, SpanLine};
use crate::ui::style::Style;
use crate::ui::theme::Theme;
use serde::{Deserialize, Serialize};

/// Terminals narrower than this render the compact header instead of the step list.
pub const COMPACT_BREAKPOINT: u16 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewport {
    Compact,
    Wide,
}

impl Viewport {
    pub fn from_width(width: u16) -> Self {
        if width < COMPACT_BREAKPOINT {
            Viewport::Compact
        } else {
            Viewport::Wide
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

pub fn counter(snapshot: &WizardSnapshot) -> String {
    format!("Step {} of {}", snapshot.current_index + 1, snapshot.total)
}

/// Accessible label of the progress dot at `index`.
pub fn dot_label(flow: &Flow, snapshot: &WizardSnapshot, index: usize) -> String {
    let mut label = format!("Step {}", index + 1);
    if index == snapshot.current_index {
        label.push_str(" (current)");
    }
    let completed = flow
        .id_at(index)
        .is_some_and(|id| snapshot.completed.contains(id));
    if completed {
        label.push_str(" (completed)");
    }
    label
}

pub fn dots(snapshot: &WizardSnapshot, theme: &Theme) -> SpanLine {
    let mut line = Vec::with_capacity(snapshot.total * 2);
    for index in 0..snapshot.total {
        if index > 0 {
            line.push(Span::new(" "));
        }
        let span = match snapshot.status_at(index) {
            StepStatus::Active => Span::styled("●", theme.accent),
            StepStatus::Done => Span::styled("●", theme.accent_dim),
            StepStatus::Pending | StepStatus::Disabled => Span::styled("○", theme.muted),
        };
        line.push(span);
    }
    line
}

/// Compact header: counter, current title and description, progress dots and
/// the current dot's label.
pub fn header(flow: &Flow, snapshot: &WizardSnapshot, theme: &Theme) -> Vec<SpanLine> {
    let mut lines = vec![vec![Span::styled(counter(snapshot), theme.muted)]];
    if let Some(step) = flow.step_at(snapshot.current_index) {
        lines.push(vec![Span::styled(step.title.clone(), theme.heading)]);
        if let Some(description) = &step.description {
            lines.push(vec![Span::styled(description.clone(), theme.muted)]);
        }
    }
    lines.push(dots(snapshot, theme));
    lines.push(vec![Span::styled(
        dot_label(flow, snapshot, snapshot.current_index),
        theme.muted,
    )]);
    lines
}

fn indicator(index: usize, status: StepStatus, theme: &Theme) -> Span {
    match status {
        StepStatus::Done => Span::styled("✓", theme.success),
        StepStatus::Disabled => Span::styled("✕", theme.disabled),
        StepStatus::Active => Span::styled((index + 1).to_string(), theme.accent),
        StepStatus::Pending => Span::styled((index + 1).to_string(), theme.muted),
    }
}

fn title_style(status: StepStatus, theme: &Theme) -> Style {
    match status {
        StepStatus::Active => theme.heading,
        StepStatus::Disabled => theme.disabled,
        StepStatus::Done | StepStatus::Pending => theme.text,
    }
}

/// Wide step list with indicators and separators.
pub fn step_list(
    flow: &Flow,
    snapshot: &WizardSnapshot,
    orientation: Orientation,
    theme: &Theme,
) -> Vec<SpanLine> {
    match orientation {
        Orientation::Horizontal => {
            let mut line = Vec::new();
            for (index, step) in flow.steps().enumerate() {
                let status = snapshot.status_at(index);
                if index > 0 {
                    line.push(Span::styled(" ── ", theme.muted));
                }
                line.push(indicator(index, status, theme));
                line.push(Span::new(" "));
                line.push(Span::styled(step.title.clone(), title_style(status, theme)));
            }
            vec![line]
        }
        Orientation::Vertical => {
            let mut lines = Vec::new();
            for (index, step) in flow.steps().enumerate() {
                let status = snapshot.status_at(index);
                if index > 0 {
                    lines.push(vec![Span::styled("│", theme.muted)]);
                }
                lines.push(vec![
                    indicator(index, status, theme),
                    Span::new(" "),
                    Span::styled(step.title.clone(), title_style(status, theme)),
                ]);
                if let Some(description) = &step.description {
                    lines.push(vec![
                        Span::new("  "),
                        Span::styled(description.clone(), theme.muted),
                    ]);
                }
            }
            lines
        }
    }
}

/// Step list on wide terminals, compact header otherwise.
pub fn progress(
    flow: &Flow,
    snapshot: &WizardSnapshot,
    viewport: Viewport,
    orientation: Orientation,
    theme: &Theme,
) -> Vec<SpanLine> {
    match viewport {
        Viewport::Compact => header(flow, snapshot, theme),
        Viewport::Wide => step_list(flow, snapshot, orientation, theme),
    }
}
