//! Progress indicators shown while waiting on AWS.

use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner for a single in-flight request.
///
/// Hidden when stdout is not a terminal so piped output stays clean.
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = if Term::stdout().is_term() {
        ProgressBar::new_spinner()
    } else {
        ProgressBar::hidden()
    };

    pb.set_style(
        ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
