pub mod app;
pub mod auth;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod onboarding;
pub mod terminal;
pub mod ui;
pub mod validators;

pub use crate::core::context;
pub use crate::core::flow;
pub use crate::core::step;
pub use crate::core::wizard;

pub use ui::controls;
pub use ui::progress;
pub use ui::span;
pub use ui::style;
pub use ui::theme;

pub use error::{Error, Result};
