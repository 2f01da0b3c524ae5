//! Install command - download the shared cache of a title

use super::target;
use crate::cli::args::InstallArgs;
use crate::config::Config;
use crate::error::{ShaderkitError, ShaderkitResult};
use crate::remote::HttpRemote;
use crate::shaders::count_shaders;
use crate::transfer::{Downloader, TransferOutcome};
use crate::ui::{self, TransferProgress, UiContext};
use std::sync::Arc;
use tracing::debug;

/// Execute the install command
pub async fn execute(args: InstallArgs, config: &Config) -> ShaderkitResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);
    let (title, data_root) = target(&args.title, config)?;

    let local = count_shaders(&title, &data_root).await;
    if local > 0 {
        let replace = ui::confirm(
            &ctx,
            &format!("Replace your local cache of {} shaders?", local),
            true,
        )
        .await?;
        if !replace {
            ui::outro_warn(&ctx, "Install skipped");
            return Ok(());
        }
    }

    let remote = Arc::new(HttpRemote::new(&config.remote)?);
    let downloader = Downloader::new(remote);

    // Ctrl-C cancels this title's transfer through the registry
    let registry = downloader.registry().clone();
    let watched = title.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupted, cancelling {}", watched);
            registry.cancel(&watched);
        }
    });

    let progress = TransferProgress::new(&ctx, &format!("Downloading {}", title.upper()));
    let outcome = downloader.install(&title, &data_root, &progress).await;
    progress.finish();
    interrupt.abort();

    match outcome {
        TransferOutcome::Success => {
            let installed = count_shaders(&title, &data_root).await;
            ui::outro_success(&ctx, &format!("Installed {} shaders", installed));
            Ok(())
        }
        TransferOutcome::Cancelled => {
            ui::outro_warn(&ctx, "Download cancelled");
            Ok(())
        }
        TransferOutcome::Failed(reason) => {
            Err(ShaderkitError::User(format!("Install failed: {}", reason)))
        }
    }
}
