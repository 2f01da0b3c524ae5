//! Interactive prompts with CI/non-interactive fallback

use super::context::UiContext;
use crate::error::{ShaderkitError, ShaderkitResult};
use std::path::PathBuf;

/// Prompt for confirmation, returns default if non-interactive or auto-yes
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> ShaderkitResult<bool> {
    if ctx.auto_yes() {
        println!("  {} (auto-approved)", message);
        return Ok(true);
    }

    if !ctx.is_interactive() {
        return Ok(default);
    }

    // cliclack blocks on the terminal
    let message = message.to_string();
    let result = tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message)
            .initial_value(default)
            .interact()
    })
    .await
    .map_err(|e| ShaderkitError::User(format!("Prompt task failed: {}", e)))?;

    result.map_err(|e| ShaderkitError::User(format!("Prompt failed: {}", e)))
}

/// Ask for an existing file path.
///
/// Returns `None` when non-interactive or when the user cancels the prompt.
pub async fn input_path(ctx: &UiContext, message: &str) -> Option<PathBuf> {
    if !ctx.is_interactive() {
        return None;
    }

    let message = message.to_string();
    let result = tokio::task::spawn_blocking(move || {
        cliclack::input(&message)
            .placeholder("/path/to/Ryujinx")
            .validate(|value: &String| {
                if PathBuf::from(value.trim()).is_file() {
                    Ok(())
                } else {
                    Err("No file at this path")
                }
            })
            .interact::<String>()
    })
    .await;

    match result {
        Ok(Ok(value)) => Some(PathBuf::from(value.trim())),
        _ => None,
    }
}
