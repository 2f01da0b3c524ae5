//! Status command - compare local and shared shader counts

use super::target;
use crate::cli::args::TitleArgs;
use crate::config::Config;
use crate::error::ShaderkitResult;
use crate::remote::{HttpRemote, MetadataResolver, ShaderRemote, TitleMetadata};
use crate::shaders::count_shaders;
use crate::title::CachePaths;
use crate::ui::{self, TaskSpinner, UiContext};
use tracing::debug;

/// Execute the status command
pub async fn execute(args: TitleArgs, config: &Config) -> ShaderkitResult<()> {
    let ctx = UiContext::detect();
    let (title, data_root) = target(&args, config)?;
    let remote = HttpRemote::new(&config.remote)?;

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start("Asking the shader service");
    let metadata = remote.resolve(&title).await.unwrap_or_else(|e| {
        debug!("No metadata for {}: {}", title, e);
        TitleMetadata::fallback(&title)
    });
    let shared = remote.fetch_shader_count(&title).await;
    match &shared {
        Ok(_) => spinner.clear(),
        Err(_) => spinner.stop_error("Shader service unreachable"),
    }

    ui::section(&ctx, &format!("{} ({})", metadata.display_name(), title.upper()));

    let local = count_shaders(&title, &data_root).await;
    ui::key_value(&ctx, "Local shaders", &local.to_string());
    ui::key_value(
        &ctx,
        "Cache",
        &CachePaths::new(&data_root, &title).archive().display().to_string(),
    );

    match shared {
        Ok(Some(shared)) => {
            ui::key_value(&ctx, "Shared shaders", &shared.to_string());
            if shared > local {
                ui::remark(&ctx, "The shared cache is larger, run `shaderkit install` to get it");
            } else if local > shared {
                ui::remark(&ctx, "Your cache is larger, consider `shaderkit share`");
            }
        }
        Ok(None) => ui::key_value_status(&ctx, "Shared shaders", "none published", false),
        Err(e) => ui::step_error_detail(&ctx, "Could not reach the shader service", &e.to_string()),
    }

    Ok(())
}
