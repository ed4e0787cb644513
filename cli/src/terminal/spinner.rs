use std::sync::OnceLock;
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use ztpinv_common::error::PipelineError;
use ztpinv_core::pipeline::RetryObserver;

use crate::terminal::colors;

const TICK_STRINGS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

fn new_spinner() -> ProgressBar {
    let pb: ProgressBar = ProgressBar::new_spinner();
    let style: ProgressStyle = ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICK_STRINGS);
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Shows a spinner while the pipeline waits for devices to request leases.
///
/// The spinner is created lazily on the first wait, so a run that succeeds
/// first time never draws one.
#[derive(Default)]
pub struct RetrySpinner {
    bar: OnceLock<ProgressBar>,
}

impl RetrySpinner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(&self) {
        if let Some(bar) = self.bar.get() {
            bar.finish_and_clear();
        }
    }
}

impl RetryObserver for RetrySpinner {
    fn waiting(&self, next_attempt: u32, max_attempts: u32, delay: Duration, cause: &PipelineError) {
        let bar = self.bar.get_or_init(new_spinner);
        bar.println(format!("{} {cause}", "[*]".yellow().bold()));
        bar.set_message(
            format!(
                "Waiting {:.0}s for leases (attempt {}/{max_attempts})...",
                delay.as_secs_f64(),
                next_attempt.to_string().green().bold()
            )
            .color(colors::TEXT_DEFAULT)
            .to_string(),
        );
    }
}

impl Drop for RetrySpinner {
    fn drop(&mut self) {
        self.finish();
    }
}
