//! Share command - validate the local cache with a real run and publish it

use super::target;
use crate::cli::args::ShareArgs;
use crate::config::Config;
use crate::error::{ShaderkitError, ShaderkitResult};
use crate::remote::{HttpRemote, ShaderRemote};
use crate::shaders::count_shaders;
use crate::share::{BinaryPicker, ShareFailure, ShareOrchestrator, ShareRequest};
use crate::transfer::HttpUploader;
use crate::ui::{self, TransferProgress, UiContext};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// Uses `--emulator` when given, otherwise asks
struct CliPicker {
    ctx: UiContext,
    preset: Option<PathBuf>,
}

#[async_trait]
impl BinaryPicker for CliPicker {
    async fn pick_binary(&self) -> Option<PathBuf> {
        if let Some(ref path) = self.preset {
            return Some(path.clone());
        }
        ui::input_path(&self.ctx, "Path to the emulator binary").await
    }
}

/// Execute the share command
pub async fn execute(args: ShareArgs, config: &Config) -> ShaderkitResult<()> {
    let ctx = UiContext::detect();
    let (title, data_root) = target(&args.title, config)?;
    let remote = Arc::new(HttpRemote::new(&config.remote)?);

    ui::intro(&ctx, &format!("Sharing shaders of {}", title.upper()));

    let local_count = count_shaders(&title, &data_root).await;
    let remote_count = match args.remote_count {
        Some(count) => count,
        None => match remote.fetch_shader_count(&title).await {
            Ok(count) => count.unwrap_or(0),
            Err(e) => {
                warn!("Could not fetch shared shader count: {}", e);
                0
            }
        },
    };
    ui::key_value(&ctx, "Local shaders", &local_count.to_string());
    ui::key_value(&ctx, "Shared shaders", &remote_count.to_string());

    let picker = CliPicker {
        ctx: ctx.clone(),
        preset: args.emulator,
    };
    let orchestrator = ShareOrchestrator::new(
        Arc::new(picker),
        remote.clone(),
        remote,
        Arc::new(HttpUploader::new(&config.remote)?),
    )
    .with_emulator_name(&config.emulator.binary_name);

    let request = ShareRequest {
        title: title.clone(),
        data_root,
        local_count,
        remote_count,
    };

    ui::step_info(
        &ctx,
        "The emulator will start. Launch the game and wait for its shaders to load.",
    );
    let progress = TransferProgress::new(&ctx, "Uploading");
    let result = orchestrator.share(&request, &progress).await;
    progress.finish();

    match result {
        Ok(receipt) => {
            ui::step_ok_detail(
                &ctx,
                "Emulator run validated",
                &format!("{} shaders", receipt.report.compiled_shaders),
            );
            ui::note(&ctx, "Download link", &receipt.short_link);
            ui::outro_success(&ctx, "Shaders shared, thank you!");
            Ok(())
        }
        Err(ShareFailure::OperationCanceled) => {
            ui::outro_warn(&ctx, "Operation cancelled");
            Ok(())
        }
        Err(ShareFailure::Failed(e)) => Err(e),
        Err(failure) => Err(ShaderkitError::User(format!(
            "{} [{}]",
            failure,
            failure.code()
        ))),
    }
}
