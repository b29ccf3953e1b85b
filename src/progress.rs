use std::sync::{Arc, Mutex, PoisonError};

use indicatif::{ProgressBar, ProgressStyle};

use crate::downloader::ProgressFn;

const TEMPLATE: &str =
    "{msg} [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({binary_bytes_per_sec}, {eta})";

/// Returns the default progress function that draws a progress bar on stderr.
///
/// One bar is created per transfer and finished when the transfer completes.
pub fn default_progress_fn() -> ProgressFn {
    let bar: Mutex<Option<ProgressBar>> = Mutex::new(None);

    Arc::new(move |src: &str, current: u64, total: u64, _mib_per_sec: f64, complete: bool| {
        let mut guard = bar.lock().unwrap_or_else(PoisonError::into_inner);
        let pb = guard.get_or_insert_with(|| new_bar(src, total));
        pb.set_position(current);
        if complete {
            pb.finish();
            *guard = None;
        }
    })
}

fn new_bar(src: &str, total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
        pb.set_style(style.progress_chars("=> "));
    }
    let name = src.rsplit('/').next().unwrap_or(src).to_owned();
    pb.set_message(format!("downloading {name}"));
    pb
}
