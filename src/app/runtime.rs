use crate::app::command::{Command, HELP, parse_command};
use crate::auth::{AuthFlow, AuthSession, AuthStage};
use crate::config::WizardConfig;
use crate::core::{Aggregate, Flow, IgnoreReason, Transition};
use crate::error::Result;
use crate::onboarding::{self, AboutField, Onboarding};
use crate::terminal::Terminal;
use crate::ui::controls::controls;
use crate::ui::progress::{Viewport, progress};
use crate::ui::span::{Span, SpanLine, wrap};
use crate::ui::style::Style;
use crate::ui::theme::Theme;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::info;

const MAX_CONTENT_WIDTH: usize = 100;
const RESENT_MESSAGE: &str = "A new code is on its way.";
const SIGNED_OUT_MESSAGE: &str = "Signed out.";

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed(Aggregate),
    /// Input ended or the user quit.
    Aborted,
}

fn ignored_message(reason: IgnoreReason) -> Option<&'static str> {
    match reason {
        IgnoreReason::Busy => Some("Still working on the previous request"),
        IgnoreReason::AtBoundary => Some("There is no step in that direction"),
        IgnoreReason::NotLastStep => Some("Complete is only available on the last step"),
        IgnoreReason::StepClickDisabled => Some("Jumping between steps is disabled"),
        IgnoreReason::UnknownStep => Some("No such step"),
        IgnoreReason::StepDisabled => Some("That step is disabled"),
        IgnoreReason::NotSkippable => Some("This step cannot be skipped"),
        IgnoreReason::NoCompletionHandler => Some("Nothing to complete"),
        IgnoreReason::SameStep | IgnoreReason::Superseded => None,
    }
}

/// A step id, or a 1-based position resolved against `flow`.
fn resolve_target(flow: &Flow, target: &str) -> String {
    target
        .parse::<usize>()
        .ok()
        .and_then(|position| position.checked_sub(1))
        .and_then(|index| flow.id_at(index))
        .map(|id| id.to_string())
        .unwrap_or_else(|| target.to_string())
}

/// Line-driven session: login, then the onboarding wizard.
pub struct Session<R, W: Write> {
    input: Lines<R>,
    terminal: Terminal<W>,
    config: WizardConfig,
    theme: Theme,
}

impl<R, W> Session<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(input: R, terminal: Terminal<W>, config: WizardConfig) -> Self {
        let theme = if terminal.is_interactive() {
            Theme::default_theme()
        } else {
            Theme::plain()
        };
        Self {
            input: input.lines(),
            terminal,
            config,
            theme,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn into_terminal(self) -> Terminal<W> {
        self.terminal
    }

    async fn read_command(&mut self) -> Result<Option<Command>> {
        Ok(self
            .input
            .next_line()
            .await?
            .map(|line| parse_command(&line)))
    }

    fn content_width(&self) -> usize {
        usize::from(self.terminal.size().width).clamp(20, MAX_CONTENT_WIDTH)
    }

    fn help_lines(&self) -> Vec<SpanLine> {
        HELP.iter()
            .map(|(usage, text)| {
                vec![
                    Span::styled(format!("  {usage:<22}"), self.theme.accent),
                    Span::styled(*text, self.theme.muted),
                ]
            })
            .collect()
    }

    fn render_login(&mut self, flow: &AuthFlow, notes: Vec<SpanLine>) -> Result<()> {
        self.terminal.refresh_size();
        self.terminal.clear_screen()?;
        let width = self.content_width();
        let mut lines = vec![
            vec![Span::styled(flow.copy().name.clone(), self.theme.accent)],
            Vec::new(),
            vec![Span::styled(flow.heading(), self.theme.heading)],
        ];
        lines.extend(wrap(flow.subheading(), width, self.theme.muted));
        lines.push(Vec::new());

        if let Some(error) = flow.error() {
            lines.push(vec![Span::styled(error, self.theme.error)]);
        }
        lines.extend(notes);
        match flow.stage() {
            AuthStage::Email => {
                lines.push(vec![Span::styled("Enter your email address:", self.theme.text)]);
            }
            AuthStage::Otp { email } => {
                lines.push(vec![
                    Span::styled("Code sent to ", self.theme.muted),
                    Span::styled(email.as_str(), self.theme.text),
                ]);
                lines.push(vec![Span::styled(
                    "Enter the code, `resend` for a new one or `back` to change email:",
                    self.theme.text,
                )]);
            }
        }
        self.terminal.render_lines(&lines)?;
        self.terminal.flush()?;
        Ok(())
    }

    /// Runs the email and code prompts. `None` when the user quits or input ends.
    pub async fn login(
        &mut self,
        flow: &mut AuthFlow,
        email: Option<&str>,
    ) -> Result<Option<AuthSession>> {
        if let Some(session) = flow.current_session().await? {
            info!(user_id = %session.user_id, "already signed in");
            return Ok(Some(session));
        }
        if let Some(email) = email {
            // Errors are shown on the next render.
            let _ = flow.submit_email(email).await;
        }

        let mut notes: Vec<SpanLine> = Vec::new();
        loop {
            self.render_login(flow, std::mem::take(&mut notes))?;
            let Some(command) = self.read_command().await? else {
                return Ok(None);
            };

            match (flow.stage().clone(), command) {
                (_, Command::Quit) => return Ok(None),
                (_, Command::Help) => notes = self.help_lines(),
                (AuthStage::Email, Command::Input(email)) => {
                    let _ = flow.submit_email(&email).await;
                }
                (AuthStage::Otp { .. }, Command::Input(code)) => {
                    if let Ok(session) = flow.verify(&code).await {
                        return Ok(Some(session));
                    }
                }
                (AuthStage::Otp { .. }, Command::Resend) => {
                    if flow.resend().await.is_ok() {
                        notes.push(vec![Span::styled(RESENT_MESSAGE, self.theme.success)]);
                    }
                }
                (AuthStage::Otp { .. }, Command::Back) => flow.back(),
                _ => {}
            }
        }
    }

    /// Ends the signed-in session, e.g. when the user quits onboarding.
    pub async fn sign_out(&mut self, flow: &mut AuthFlow) -> Result<()> {
        flow.sign_out().await?;
        self.terminal
            .render_line(&vec![Span::styled(SIGNED_OUT_MESSAGE, self.theme.muted)])?;
        self.terminal.flush()?;
        Ok(())
    }

    fn render_onboarding(
        &mut self,
        onboarding: &Onboarding,
        notes: Vec<SpanLine>,
    ) -> Result<()> {
        self.terminal.refresh_size();
        self.terminal.clear_screen()?;
        let viewport = Viewport::from_width(self.terminal.size().width);
        let width = self.content_width();
        let wizard = onboarding.wizard();
        let snapshot = wizard.snapshot();
        let theme = &self.theme;

        let mut lines = progress(
            wizard.steps(),
            &snapshot,
            viewport,
            self.config.orientation,
            theme,
        );
        lines.push(Vec::new());

        if let Some(about) = onboarding.about() {
            lines.extend(about.render(theme));
        } else if let Some(section) = onboarding::section(snapshot.current_step.as_str()) {
            lines.extend(section.render(width, theme));
        } else {
            let step = wizard.current_descriptor();
            lines.push(vec![Span::styled(step.title.clone(), theme.heading)]);
            if let Some(description) = &step.description {
                lines.extend(wrap(description, width, theme.muted));
            }
        }

        lines.push(Vec::new());
        lines.extend(notes);
        lines.push(controls(&snapshot, &self.config.labels, viewport, theme));
        lines.push(vec![Span::styled("Type `help` for commands.", theme.muted)]);

        self.terminal.render_lines(&lines)?;
        self.terminal.flush()?;
        Ok(())
    }

    fn render_completed(&mut self, aggregate: &Aggregate) -> Result<()> {
        let json = serde_json::to_string_pretty(aggregate)?;
        let mut lines = vec![
            Vec::new(),
            vec![Span::styled("Onboarding Complete!", self.theme.success)],
        ];
        lines.extend(json.lines().map(|line| vec![Span::styled(line, self.theme.muted)]));
        self.terminal.render_lines(&lines)?;
        self.terminal.flush()?;
        Ok(())
    }

    fn set_field(&self, onboarding: &Onboarding, field: &str, value: &str) -> SpanLine {
        let Some(about) = onboarding.about() else {
            return vec![Span::styled("This step has no form", self.theme.error)];
        };
        let Some(field) = AboutField::parse(field) else {
            let known: Vec<&str> = AboutField::ALL.iter().map(|field| field.key()).collect();
            return vec![Span::styled(
                format!("Unknown field; use one of {}", known.join(", ")),
                self.theme.error,
            )];
        };
        match about.set_field(field, value) {
            Some(error) => vec![Span::styled(error, self.theme.error)],
            None => vec![Span::styled(format!("{} saved", field.label()), self.theme.success)],
        }
    }

    fn notice_line(&self, style: Style, message: &str, detail: Option<&str>) -> SpanLine {
        let mut line = vec![Span::styled(message, style)];
        if let Some(detail) = detail {
            line.push(Span::styled(format!(" ({detail})"), self.theme.muted));
        }
        line
    }

    /// Runs the wizard until completion, quit or end of input.
    pub async fn onboard(&mut self) -> Result<Outcome> {
        let slot: Arc<Mutex<Option<Aggregate>>> = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&slot);
        let options = self
            .config
            .clone()
            .into_options()
            .on_complete(move |data: Aggregate| {
                let sink = Arc::clone(&sink);
                async move {
                    *sink.lock().unwrap_or_else(PoisonError::into_inner) = Some(data);
                    Ok::<_, anyhow::Error>(())
                }
            })
            .on_skip(|step| info!(step = %step, "step skipped"));
        let mut onboarding = Onboarding::new(options)?;

        let mut notes: Vec<SpanLine> = Vec::new();
        loop {
            self.render_onboarding(&onboarding, std::mem::take(&mut notes))?;
            let Some(command) = self.read_command().await? else {
                return Ok(Outcome::Aborted);
            };

            let transition = match command {
                Command::Next if onboarding.wizard().snapshot().is_last_step => {
                    onboarding.complete().await?
                }
                Command::Next => onboarding.next().await?,
                Command::Back => onboarding.prev()?,
                Command::Skip => onboarding.skip()?,
                Command::Complete => onboarding.complete().await?,
                Command::Jump(target) => {
                    let id = resolve_target(onboarding.wizard().steps(), &target);
                    onboarding.go_to_step(&id).await?
                }
                Command::Set { field, value } => {
                    notes.push(self.set_field(&onboarding, &field, &value));
                    continue;
                }
                Command::Help => {
                    notes = self.help_lines();
                    continue;
                }
                Command::Quit => return Ok(Outcome::Aborted),
                Command::Resend | Command::Input(_) => {
                    notes.push(vec![Span::styled(
                        "Unknown command; type `help` for a list",
                        self.theme.error,
                    )]);
                    continue;
                }
            };

            match transition {
                Transition::Completed => {
                    let aggregate = slot
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .take()
                        .unwrap_or_default();
                    self.render_completed(&aggregate)?;
                    return Ok(Outcome::Completed(aggregate));
                }
                Transition::Rejected(notice) | Transition::CompletionFailed(notice) => {
                    notes.push(self.notice_line(
                        self.theme.error,
                        &notice.message,
                        notice.detail.as_deref(),
                    ));
                }
                Transition::Ignored(reason) => {
                    if let Some(text) = ignored_message(reason) {
                        notes.push(vec![Span::styled(text, self.theme.muted)]);
                    }
                }
                Transition::Moved { .. } => {}
            }
        }
    }
}
