mod progress;
mod string_utils;

pub use progress::create_progress_bar;
pub use string_utils::*;
