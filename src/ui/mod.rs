pub mod controls;
pub mod progress;
pub mod span;
pub mod style;
pub mod theme;
