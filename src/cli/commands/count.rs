//! Count command - print the local shader count of a title

use super::target;
use crate::cli::args::TitleArgs;
use crate::config::Config;
use crate::error::ShaderkitResult;
use crate::shaders::count_shaders;

/// Execute the count command
pub async fn execute(args: TitleArgs, config: &Config) -> ShaderkitResult<()> {
    let (title, data_root) = target(&args, config)?;
    let count = count_shaders(&title, &data_root).await;
    println!("{}", count);
    Ok(())
}
