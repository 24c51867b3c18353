use alloy::{
    contract,
    primitives::utils::UnitsError,
    providers::PendingTransactionError,
    transports::{RpcError, TransportErrorKind},
};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("interface description for {name} not found at {}", path.display())]
    AbiMissing { name: String, path: PathBuf },

    #[error("interface description for {name} is malformed: {reason}")]
    AbiMalformed { name: String, reason: String },

    #[error("contract call failed: {0}")]
    Contract(#[from] contract::Error),

    #[error("rpc error: {0}")]
    Rpc(#[from] RpcError<TransportErrorKind>),

    #[error("failed to confirm transaction: {0}")]
    PendingTx(#[from] PendingTransactionError),

    #[error("{0} timed out after {1} seconds")]
    Timeout(&'static str, u64),

    #[error("unit conversion failed: {0}")]
    Units(#[from] UnitsError),

    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    #[error("unexpected return value from {method}: {reason}")]
    Decode {
        method: &'static str,
        reason: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to initialize logger: {0}")]
    LoggerInit(String),

    #[error("cancelled")]
    Cancelled,
}

impl Error {
    pub fn decode(method: &'static str, reason: impl Into<String>) -> Self {
        Self::Decode {
            method,
            reason: reason.into(),
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    /// Configuration errors stop the process, including when an action returns one mid-run;
    /// everything else is handled by the loop.
    pub fn is_fatal(&self) -> bool {
        use Error::*;
        matches!(
            self,
            AbiMissing { .. } | AbiMalformed { .. } | Config(_) | LoggerInit(_)
        )
    }
}
