pub mod terminal;

pub use terminal::{Size, Terminal};
