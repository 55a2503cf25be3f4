use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})";

/// Progress bar over a batch of `len` inputs.
pub(crate) fn batch_progress(len: usize) -> ProgressBar {
    let progress_bar = ProgressBar::new(len as u64);
    let style = ProgressStyle::with_template(TEMPLATE)
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(style);
    progress_bar
}
