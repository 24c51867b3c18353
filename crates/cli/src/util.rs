use crate::error::CliError;
use alloy::signers::local::PrivateKeySigner;
use nu_ansi_term::{AnsiGenericString, Style};
use std::{path::Path, str::FromStr};
use teabot_botfile::BotConfig;

pub fn bold<'a>(msg: impl AsRef<str> + 'a) -> AnsiGenericString<'a, str> {
    Style::new().bold().paint(msg.as_ref().to_owned())
}

/// Parses the signing key, with or without a `0x` prefix.
pub fn load_signer(private_key: Option<&str>) -> Result<PrivateKeySigner, CliError> {
    let key = private_key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(CliError::PrivateKeyMissing)?;
    PrivateKeySigner::from_str(key).map_err(CliError::PrivateKeyInvalid)
}

/// Reads the bot file at `path`, falling back to defaults if it does not exist.
/// Returns whether the file was found.
pub fn load_bot_config(path: &Path) -> Result<(BotConfig, bool), CliError> {
    if path.exists() {
        Ok((BotConfig::from_file(path)?, true))
    } else {
        Ok((BotConfig::default(), false))
    }
}
