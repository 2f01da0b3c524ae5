//! Terminal UI
//!
//! Uses `cliclack` for prompts and boxed output and `indicatif` for transfer
//! bars, with plain line output in CI and other non-interactive environments.
//!
//! ```rust,ignore
//! use shaderkit::ui::{self, TransferProgress, UiContext};
//!
//! let ctx = UiContext::detect();
//! ui::intro(&ctx, "Installing shaders");
//!
//! let progress = TransferProgress::new(&ctx, "Downloading");
//! let outcome = downloader.install(&title, &data_root, &progress).await;
//! progress.finish();
//! ```

mod context;
mod output;
mod progress;
mod prompts;

pub use context::UiContext;
pub use output::{
    intro, key_value, key_value_status, note, outro_success, outro_warn, remark, section,
    step_error_detail, step_info, step_ok_detail, step_warn_hint,
};
pub use progress::{TaskSpinner, TransferProgress};
pub use prompts::{confirm, input_path};

use cliclack::ThemeState;
use console::Style;

/// Prompt bars in cyan while active, muted once answered
struct CacheTheme;

impl cliclack::Theme for CacheTheme {
    fn bar_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().cyan(),
            ThemeState::Submit => Style::new().cyan().dim(),
            ThemeState::Error(_) => Style::new().red().bold(),
            ThemeState::Cancel => Style::new().dim(),
        }
    }
}

/// Install the prompt theme for the whole process
pub fn init_theme() {
    cliclack::set_theme(CacheTheme);
}
