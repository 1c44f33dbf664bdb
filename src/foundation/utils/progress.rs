use indicatif::{ProgressBar, ProgressStyle};

/// Creates a stylized progress bar for the long batch loops.
///
/// # Arguments
///
/// * `total` - The total number of items to track.
/// * `unit` - A label for the counted items (e.g. "tracks" or "covers").
pub fn create_progress_bar(total: u64, unit: &str) -> ProgressBar {
    let progress = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template(&format!(
        "{{elapsed_precise}} [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {unit} {{msg}}"
    )) {
        progress.set_style(style.progress_chars("##-"));
    }
    progress
}
