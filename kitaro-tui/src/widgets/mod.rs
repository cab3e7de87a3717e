//! Reusable widgets.

pub mod progress;
pub mod search;

pub use progress::ProgressBar;
pub use search::SearchBar;
