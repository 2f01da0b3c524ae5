//! Progress indicators with CI fallback

use super::context::UiContext;
use crate::transfer::{ProgressEvent, ProgressSink};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// A task spinner with CI fallback
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    /// Create a new spinner (shows on `start` in interactive mode)
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    /// Start the spinner with a message
    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            println!("{} {}", style("...").dim(), message);
        }
    }

    /// Stop with success message
    pub fn stop(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        } else if self.interactive {
            println!("{} {}", style("✓").green(), message);
        } else {
            println!("{} {}", style("[OK]").green(), message);
        }
    }

    /// Stop with error message
    pub fn stop_error(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.error(message);
        } else if self.interactive {
            println!("{} {}", style("✗").red(), message);
        } else {
            println!("{} {}", style("[FAIL]").red(), message);
        }
    }

    /// Clear the spinner without any message
    pub fn clear(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.clear();
        }
    }
}

/// Percentage bar for downloads and uploads.
///
/// Renders an indicatif bar in interactive mode and prints each throttled
/// event as a plain line otherwise.
pub struct TransferProgress {
    bar: Option<ProgressBar>,
    label: String,
}

impl TransferProgress {
    pub fn new(ctx: &UiContext, label: &str) -> Self {
        let bar = if ctx.use_fancy_output() {
            let bar = ProgressBar::new(10_000);
            if let Ok(bar_style) = ProgressStyle::default_bar()
                .template("  {spinner:.cyan} {prefix}  {bar:30.cyan/dim} {msg}  {elapsed:.dim}")
            {
                bar.set_style(
                    bar_style
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                        .progress_chars("━╸─"),
                );
            }
            bar.set_prefix(label.to_string());
            bar.enable_steady_tick(std::time::Duration::from_millis(120));
            Some(bar)
        } else {
            println!("{}...", label);
            None
        };
        Self {
            bar,
            label: label.to_string(),
        }
    }

    /// Finish and clear the progress bar.
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}

impl ProgressSink for TransferProgress {
    fn on_progress(&self, event: &ProgressEvent) {
        match self.bar {
            Some(ref bar) => {
                bar.set_position(bar_position(event.percentage));
                bar.set_message(format!("{}%", event.percentage_string()));
            }
            None => println!("  {} {}%", self.label, event.percentage_string()),
        }
    }
}

/// Bar positions are hundredths of a percent
fn bar_position(percentage: f64) -> u64 {
    (percentage.clamp(0.0, 100.0) * 100.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::title::TitleId;
    use std::time::Instant;

    #[test]
    fn spinner_non_interactive() {
        let ctx = UiContext::non_interactive();
        let mut spinner = TaskSpinner::new(&ctx);
        spinner.start("Testing...");
        spinner.stop("Done");
    }

    #[test]
    fn bar_position_scales_and_clamps() {
        assert_eq!(bar_position(0.0), 0);
        assert_eq!(bar_position(12.345), 1235);
        assert_eq!(bar_position(100.0), 10_000);
        assert_eq!(bar_position(250.0), 10_000);
    }

    #[test]
    fn transfer_progress_non_interactive() {
        let ctx = UiContext::non_interactive();
        let progress = TransferProgress::new(&ctx, "Downloading");
        progress.on_progress(&ProgressEvent {
            title: TitleId::new("0100ABCD").unwrap(),
            percentage: 42.0,
            emitted_at: Instant::now(),
        });
        progress.finish();
    }
}
