pub mod command;
pub mod runtime;

pub use command::{Command, parse_command};
pub use runtime::{Outcome, Session};
