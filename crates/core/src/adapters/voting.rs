use super::{as_bool, as_uint, first, uint, ActionParams, BotAction, ExecutionResult, QueryResult};
use crate::{contract::ContractClient, Result};
use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, U256},
};
use async_trait::async_trait;
use rand::{Rng, RngCore};
use std::sync::Arc;
use strum::{Display, EnumIter, FromRepr, IntoEnumIterator};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, FromRepr)]
#[repr(u8)]
pub enum VoteOption {
    #[strum(to_string = "Green Tea")]
    GreenTea = 0,
    #[strum(to_string = "Black Tea")]
    BlackTea = 1,
    #[strum(to_string = "Herbal Tea")]
    HerbalTea = 2,
    #[strum(to_string = "Oolong Tea")]
    OolongTea = 3,
}

impl VoteOption {
    pub fn id(&self) -> u8 {
        *self as u8
    }

    /// `None` unless `id` is in 0..=3.
    pub fn from_id(id: i64) -> Option<Self> {
        u8::try_from(id).ok().and_then(Self::from_repr)
    }
}

/// Adapter for the voting contract.
pub struct VotingSystem {
    contract: Arc<dyn ContractClient>,
    check_already_voted: bool,
}

impl VotingSystem {
    pub fn new(contract: Arc<dyn ContractClient>, check_already_voted: bool) -> Self {
        Self {
            contract,
            check_already_voted,
        }
    }

    pub fn random_option<R: Rng + ?Sized>(rng: &mut R) -> VoteOption {
        VoteOption::from_repr(rng.gen_range(0..=3)).unwrap_or(VoteOption::GreenTea)
    }

    /// Votes for `option_id`. Ids outside 0..=3 fail without contacting the node.
    /// If the signer has already voted the call is skipped.
    pub async fn vote(&self, option_id: i64) -> ExecutionResult {
        let Some(option) = VoteOption::from_id(option_id) else {
            let reason = format!("Invalid option ID: {option_id}. Must be between 0-3");
            error!("{reason}");
            return ExecutionResult::failed(reason);
        };

        match self.submit_vote(option).await {
            Ok(res) => res,
            Err(e) => {
                error!("Vote failed for {option}: {e}");
                ExecutionResult::failed(e.to_string())
            }
        }
    }

    async fn submit_vote(&self, option: VoteOption) -> Result<ExecutionResult> {
        if self.check_already_voted && self.query_has_voted(self.contract.signer()).await? {
            info!("Skipping vote for {option} - already voted");
            return Ok(ExecutionResult::skipped("Already voted"));
        }

        let tx_hash = self
            .contract
            .submit("vote", &[uint(option.id() as u64)])
            .await?;
        info!("Voting for {option} - TX: {tx_hash}");
        Ok(ExecutionResult::Success {
            tx_hash,
            params: ActionParams::Vote { option },
        })
    }

    async fn query_has_voted(&self, voter: Address) -> Result<bool> {
        let out = self
            .contract
            .read("hasVoted", &[DynSolValue::Address(voter)])
            .await?;
        as_bool("hasVoted", first("hasVoted", &out)?)
    }

    pub async fn has_voted(&self, voter: Address) -> QueryResult<bool> {
        self.query_has_voted(voter).await.map_err(|e| {
            error!("Failed to check vote status of {voter}: {e}");
            e.into()
        })
    }

    /// Vote totals for every option, in option order.
    pub async fn results(&self) -> QueryResult<Vec<(VoteOption, U256)>> {
        let res = async {
            let mut results = vec![];
            for option in VoteOption::iter() {
                let out = self
                    .contract
                    .read("getVotes", &[uint(option.id() as u64)])
                    .await?;
                results.push((option, as_uint("getVotes", first("getVotes", &out)?)?));
            }
            Ok::<_, crate::Error>(results)
        }
        .await;

        match res {
            Ok(results) => {
                let summary = results
                    .iter()
                    .map(|(option, votes)| format!("{option}: {votes}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                info!("Current voting results: {summary}");
                Ok(results)
            }
            Err(e) => {
                error!("Failed to get voting results: {e}");
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl BotAction for VotingSystem {
    async fn execute(&self, rng: &mut (dyn RngCore + Send)) -> Result<ExecutionResult> {
        let option = Self::random_option(rng);
        Ok(self.vote(option.id() as i64).await)
    }
}
