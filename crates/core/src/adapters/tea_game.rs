use super::{as_uint, first, uint, ActionParams, BotAction, ExecutionResult, QueryResult};
use crate::{contract::ContractClient, Result};
use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, U256},
};
use async_trait::async_trait;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TeaAction {
    pub id: &'static str,
    pub name: &'static str,
}

const fn action(id: &'static str, name: &'static str) -> TeaAction {
    TeaAction { id, name }
}

/// Every action the game accepts. The first 15 form the classic catalog.
pub const TEA_ACTIONS: [TeaAction; 30] = [
    action("brew_tea", "Brew Tea"),
    action("drink_tea", "Drink Tea"),
    action("gift_tea", "Gift Tea"),
    action("share_tea", "Share Tea"),
    action("trade_tea", "Trade Tea"),
    action("collect_tea", "Collect Tea"),
    action("sell_tea", "Sell Tea"),
    action("steep_tea", "Steep Tea"),
    action("blend_tea", "Blend Tea"),
    action("taste_tea", "Taste Tea"),
    action("store_tea", "Store Tea"),
    action("offer_tea", "Offer Tea"),
    action("heat_water", "Heat Water"),
    action("pour_tea", "Pour Tea"),
    action("sip_tea", "Sip Tea"),
    action("stir_tea", "Stir Tea"),
    action("infuse_tea", "Infuse Tea"),
    action("pack_tea", "Pack Tea"),
    action("dry_tea", "Dry Tea"),
    action("ferment_tea", "Ferment Tea"),
    action("grind_tea", "Grind Tea"),
    action("weigh_tea", "Weigh Tea"),
    action("filter_tea", "Filter Tea"),
    action("boil_water", "Boil Water"),
    action("strain_tea", "Strain Tea"),
    action("smell_tea", "Smell Tea"),
    action("inspect_leaves", "Inspect Leaves"),
    action("cup_tea", "Cup Tea"),
    action("sweeten_tea", "Sweeten Tea"),
    action("cool_tea", "Cool Tea"),
];

const CLASSIC_LEN: usize = 15;

/// Which slice of [`TEA_ACTIONS`] the bot draws from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TeaCatalog {
    Classic,
    #[default]
    Extended,
}

impl TeaCatalog {
    pub fn actions(&self) -> &'static [TeaAction] {
        match self {
            TeaCatalog::Classic => &TEA_ACTIONS[..CLASSIC_LEN],
            TeaCatalog::Extended => &TEA_ACTIONS,
        }
    }

    pub fn find(&self, id: &str) -> Option<TeaAction> {
        self.actions().iter().find(|a| a.id == id).copied()
    }
}

/// Adapter for the tea action game.
pub struct TeaGame {
    contract: Arc<dyn ContractClient>,
    catalog: TeaCatalog,
}

impl TeaGame {
    pub fn new(contract: Arc<dyn ContractClient>, catalog: TeaCatalog) -> Self {
        Self { contract, catalog }
    }

    pub fn actions(&self) -> &'static [TeaAction] {
        self.catalog.actions()
    }

    pub fn random_action<R: Rng + ?Sized>(&self, rng: &mut R) -> TeaAction {
        let actions = self.actions();
        actions[rng.gen_range(0..actions.len())]
    }

    /// Performs `action_id` with `value`. Missing parameters are drawn at random:
    /// the action uniformly from the catalog, the value uniformly from 1..=10.
    /// An unknown action id also falls back to a random action.
    pub async fn perform<R: Rng + Send + ?Sized>(
        &self,
        action_id: Option<&str>,
        value: Option<u64>,
        rng: &mut R,
    ) -> ExecutionResult {
        let action = match action_id {
            Some(id) => self.catalog.find(id).unwrap_or_else(|| {
                warn!("unknown tea action '{id}', picking a random one");
                self.random_action(rng)
            }),
            None => self.random_action(rng),
        };
        let value = value.unwrap_or_else(|| rng.gen_range(1..=10));

        match self.interact(action, value).await {
            Ok(res) => res,
            Err(e) => {
                error!("Failed to perform {}: {e}", action.name);
                ExecutionResult::failed(e.to_string())
            }
        }
    }

    async fn interact(&self, action: TeaAction, value: u64) -> Result<ExecutionResult> {
        let args = [DynSolValue::String(action.id.to_owned()), uint(value)];
        let tx_hash = self.contract.submit("interact", &args).await?;
        info!("Tea action: {} - TX: {tx_hash}", action.name);

        let confirmation = self.contract.confirm(tx_hash).await?;
        if !confirmation.succeeded {
            error!("Tea action {} reverted - TX: {tx_hash}", action.name);
            return Ok(ExecutionResult::failed(format!(
                "transaction {tx_hash} reverted"
            )));
        }
        info!(
            "Tea action confirmed in block {} - gas used: {}",
            confirmation.block_number.unwrap_or_default(),
            confirmation.gas_used
        );
        Ok(ExecutionResult::Success {
            tx_hash,
            params: ActionParams::Tea { action, value },
        })
    }

    /// Score of `player`.
    pub async fn score(&self, player: Address) -> QueryResult<U256> {
        let res = async {
            let out = self
                .contract
                .read("getScore", &[DynSolValue::Address(player)])
                .await?;
            as_uint("getScore", first("getScore", &out)?)
        }
        .await;
        res.map_err(|e| {
            error!("Failed to get score for {player}: {e}");
            e.into()
        })
    }
}

#[async_trait]
impl BotAction for TeaGame {
    async fn execute(&self, rng: &mut (dyn RngCore + Send)) -> Result<ExecutionResult> {
        Ok(self.perform(None, None, rng).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::MockContract;
    use rand::{rngs::StdRng, SeedableRng};

    fn setup(mock: MockContract, catalog: TeaCatalog) -> (TeaGame, Arc<MockContract>) {
        let mock = Arc::new(mock);
        (TeaGame::new(mock.clone(), catalog), mock)
    }

    #[test]
    fn catalogs_have_expected_sizes() {
        assert_eq!(TeaCatalog::Classic.actions().len(), 15);
        assert_eq!(TeaCatalog::Extended.actions().len(), 30);
        assert_eq!(TeaCatalog::Classic.find("sip_tea").unwrap().name, "Sip Tea");
        assert!(TeaCatalog::Classic.find("cool_tea").is_none());
        assert!(TeaCatalog::Extended.find("cool_tea").is_some());
    }

    #[tokio::test]
    async fn submits_given_action_and_value() {
        let (game, mock) = setup(MockContract::new("TeaGame"), TeaCatalog::Extended);
        let mut rng = StdRng::seed_from_u64(1);
        let res = game.perform(Some("brew_tea"), Some(3), &mut rng).await;

        assert!(res.is_success());
        match res {
            ExecutionResult::Success { params, .. } => assert_eq!(
                params,
                ActionParams::Tea {
                    action: TeaCatalog::Extended.find("brew_tea").unwrap(),
                    value: 3
                }
            ),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(
            mock.call_args("interact"),
            vec![vec![DynSolValue::String("brew_tea".to_owned()), uint(3)]]
        );
    }

    #[tokio::test]
    async fn random_parameters_stay_in_range() {
        let (game, _mock) = setup(MockContract::new("TeaGame"), TeaCatalog::Classic);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            match game.perform(None, None, &mut rng).await {
                ExecutionResult::Success {
                    params: ActionParams::Tea { action, value },
                    ..
                } => {
                    assert!((1..=10).contains(&value));
                    assert!(TeaCatalog::Classic.find(action.id).is_some());
                }
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn unknown_action_falls_back_to_catalog() {
        let (game, mock) = setup(MockContract::new("TeaGame"), TeaCatalog::Classic);
        let mut rng = StdRng::seed_from_u64(3);
        let res = game.perform(Some("juggle_tea"), Some(5), &mut rng).await;
        assert!(res.is_success());
        let args = &mock.call_args("interact")[0];
        let id = args[0].as_str().unwrap();
        assert!(TeaCatalog::Classic.find(id).is_some());
    }

    #[tokio::test]
    async fn submission_error_becomes_failure() {
        let (game, mock) = setup(
            MockContract::new("TeaGame").with_submit_failure("interact", "nonce too low"),
            TeaCatalog::Extended,
        );
        let mut rng = StdRng::seed_from_u64(1);
        let res = game.perform(Some("sip_tea"), Some(1), &mut rng).await;
        match res {
            ExecutionResult::Failed { reason } => assert!(reason.contains("nonce too low")),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(mock.call_count("interact"), 1);
    }

    #[tokio::test]
    async fn confirmation_error_becomes_failure() {
        let (game, _mock) = setup(
            MockContract::new("TeaGame").with_confirm_failure("receipt timed out"),
            TeaCatalog::Extended,
        );
        let mut rng = StdRng::seed_from_u64(1);
        let res = game.perform(None, None, &mut rng).await;
        assert!(res.is_failed());
    }

    #[tokio::test]
    async fn reads_score() {
        let player = Address::repeat_byte(0x11);
        let (game, _mock) = setup(
            MockContract::new("TeaGame").with_read("getScore", vec![uint(42)]),
            TeaCatalog::Extended,
        );
        assert_eq!(game.score(player).await.unwrap(), U256::from(42));

        let (game, _mock) = setup(
            MockContract::new("TeaGame").with_read_failure("getScore", "execution reverted"),
            TeaCatalog::Extended,
        );
        let err = game.score(player).await.unwrap_err();
        assert!(err.reason.contains("execution reverted"));
    }
}
