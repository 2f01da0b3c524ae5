//! CLI command implementations

pub mod config;
pub mod count;
pub mod install;
pub mod share;
pub mod status;

pub use config::execute as config;
pub use count::execute as count;
pub use install::execute as install;
pub use share::execute as share;
pub use status::execute as status;

use crate::cli::args::TitleArgs;
use crate::config::Config;
use crate::error::ShaderkitResult;
use crate::title::TitleId;
use std::path::PathBuf;

/// Title and data root a per-title command works on
fn target(args: &TitleArgs, config: &Config) -> ShaderkitResult<(TitleId, PathBuf)> {
    let title = TitleId::new(&args.title_id)?;
    let data_root = args
        .data_root
        .clone()
        .unwrap_or_else(|| config.paths.data_root());
    Ok((title, data_root))
}
