use crate::ui::style::{Color, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    pub heading: Style,
    pub text: Style,
    pub muted: Style,
    pub accent: Style,
    /// Completed progress dots and step indicators.
    pub accent_dim: Style,
    pub success: Style,
    pub error: Style,
    pub disabled: Style,
    pub button: Style,
}

impl Theme {
    pub fn default_theme() -> Self {
        Self {
            heading: Style::new().with_bold(),
            text: Style::new(),
            muted: Style::new().with_color(Color::DarkGrey),
            accent: Style::new().with_color(Color::Cyan).with_bold(),
            accent_dim: Style::new().with_color(Color::Cyan).with_dim(),
            success: Style::new().with_color(Color::Green),
            error: Style::new().with_color(Color::Red).with_bold(),
            disabled: Style::new().with_color(Color::DarkGrey).with_dim(),
            button: Style::new().with_bold(),
        }
    }

    /// No colours or attributes, for non-interactive output.
    pub fn plain() -> Self {
        Self {
            heading: Style::new(),
            text: Style::new(),
            muted: Style::new(),
            accent: Style::new(),
            accent_dim: Style::new(),
            success: Style::new(),
            error: Style::new(),
            disabled: Style::new(),
            button: Style::new(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}
