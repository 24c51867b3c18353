use crate::util::bold;
use alloy::signers::local::LocalSignerError;
use miette::Diagnostic;
use std::path::PathBuf;
use teabot_core::adapters::QueryFailure;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("{} is not set", bold("PRIVATE_KEY"))]
    #[diagnostic(help("export PRIVATE_KEY or add it to a .env file"))]
    PrivateKeyMissing,

    #[error("{} is not a valid signing key", bold("PRIVATE_KEY"))]
    PrivateKeyInvalid(#[source] LocalSignerError),

    #[error("{} already exists", path.display())]
    #[diagnostic(help("pass --force to overwrite it"))]
    BotFileExists { path: PathBuf },

    #[error("action failed: {0}")]
    ActionFailed(String),

    #[error("query failed: {0}")]
    Query(#[from] QueryFailure),

    #[error(transparent)]
    Core(#[from] teabot_core::Error),

    #[error(transparent)]
    BotFile(#[from] teabot_botfile::Error),
}
