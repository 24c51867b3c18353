//! Adapters wrap one on-chain contract each. Every operation returns a normalized outcome;
//! contract and network errors are converted at this boundary and never propagate.

pub mod chat;
pub mod tea_game;
pub mod transfer;
pub mod voting;

pub use chat::{ChatMessage, SimpleChat};
pub use tea_game::{TeaAction, TeaCatalog, TeaGame};
pub use transfer::{TokenAmount, TokenInfo, TransferToken};
pub use voting::{VoteOption, VotingSystem};

use crate::{error::Error, Result};
use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, TxHash, U256},
};
use async_trait::async_trait;
use rand::RngCore;
use std::fmt;
use thiserror::Error;

/// Parameters echoed back by a successful action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionParams {
    Tea { action: TeaAction, value: u64 },
    Vote { option: VoteOption },
    Chat { message: String },
    Transfer { recipient: Address, amount: TokenAmount },
}

impl fmt::Display for ActionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionParams::Tea { action, value } => write!(f, "{} ({value})", action.name),
            ActionParams::Vote { option } => write!(f, "vote for {option}"),
            ActionParams::Chat { message } => write!(f, "message \"{message}\""),
            ActionParams::Transfer { recipient, amount } => {
                write!(f, "{amount} tokens to {recipient}")
            }
        }
    }
}

/// Outcome of one adapter operation.
///
/// `Skipped` means a business rule prevented the on-chain call. It is not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    Success {
        tx_hash: TxHash,
        params: ActionParams,
    },
    Failed {
        reason: String,
    },
    Skipped {
        reason: String,
    },
}

impl ExecutionResult {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            Self::Success { tx_hash, .. } => Some(*tx_hash),
            _ => None,
        }
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { tx_hash, params } => write!(f, "success: {params} - TX: {tx_hash}"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
            Self::Skipped { reason } => write!(f, "skipped: {reason}"),
        }
    }
}

/// Error side of a read-only adapter query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct QueryFailure {
    pub reason: String,
}

impl From<Error> for QueryFailure {
    fn from(err: Error) -> Self {
        Self {
            reason: err.to_string(),
        }
    }
}

pub type QueryResult<T> = std::result::Result<T, QueryFailure>;

/// A zero-argument operation the scheduler can pick.
#[async_trait]
pub trait BotAction: Send + Sync {
    /// Draws any random parameters from `rng` and runs the operation.
    ///
    /// Adapters report every expected outcome in the `Ok` value; an `Err` is an unexpected error
    /// and is handled by the loop with an extended backoff.
    async fn execute(&self, rng: &mut (dyn RngCore + Send)) -> Result<ExecutionResult>;
}

// -- return value decoding

pub(crate) fn first<'a>(method: &'static str, values: &'a [DynSolValue]) -> Result<&'a DynSolValue> {
    values
        .first()
        .ok_or_else(|| Error::decode(method, "no return values"))
}

pub(crate) fn as_bool(method: &'static str, value: &DynSolValue) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| Error::decode(method, format!("expected bool, got {value:?}")))
}

pub(crate) fn as_uint(method: &'static str, value: &DynSolValue) -> Result<U256> {
    value
        .as_uint()
        .map(|(n, _)| n)
        .ok_or_else(|| Error::decode(method, format!("expected uint, got {value:?}")))
}

pub(crate) fn as_string(method: &'static str, value: &DynSolValue) -> Result<String> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| Error::decode(method, format!("expected string, got {value:?}")))
}

pub(crate) fn as_address(method: &'static str, value: &DynSolValue) -> Result<Address> {
    value
        .as_address()
        .ok_or_else(|| Error::decode(method, format!("expected address, got {value:?}")))
}

pub(crate) fn uint(n: u64) -> DynSolValue {
    DynSolValue::Uint(U256::from(n), 256)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skipped_is_neither_success_nor_failure() {
        let res = ExecutionResult::skipped("Already voted");
        assert!(res.is_skipped());
        assert!(!res.is_failed());
        assert!(!res.is_success());
        assert_eq!(res.tx_hash(), None);
        assert_eq!(res.to_string(), "skipped: Already voted");
    }

    #[test]
    fn decodes_first_value() {
        let values = vec![DynSolValue::Bool(true), uint(3)];
        assert!(as_bool("hasVoted", first("hasVoted", &values).unwrap()).unwrap());
        assert_eq!(as_uint("getVotes", &values[1]).unwrap(), U256::from(3));
        assert!(as_string("symbol", &values[0]).is_err());
        assert!(first("symbol", &[]).is_err());
    }
}
