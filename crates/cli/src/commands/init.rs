use crate::{error::CliError, util::bold};
use std::path::Path;
use teabot_botfile::BotConfig;

/// Writes the default bot file to `out`.
pub fn init(out: &Path, force: bool) -> Result<(), CliError> {
    if out.exists() && !force {
        return Err(CliError::BotFileExists {
            path: out.to_path_buf(),
        });
    }
    BotConfig::default().save_toml(out)?;
    println!("{} {}", bold("wrote"), out.display());
    Ok(())
}
