use crate::{
    adapters::{SimpleChat, TeaCatalog, TeaGame, TransferToken, VotingSystem},
    contract::{AbiStore, ContractClient, ContractFactory},
    provider::connect_signer,
    recipients::RecipientBook,
    scheduler::{ScheduleSettings, WeightedAction, WeightedTable},
    Result,
};
use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::info;
use url::Url;

pub const TEA_GAME: &str = "TeaGame";
pub const VOTING_SYSTEM: &str = "VotingSystem";
pub const SIMPLE_CHAT: &str = "SimpleChat";
pub const TOKEN: &str = "Teazard";

/// A deployed contract and the interface description to load for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractRef {
    pub abi: String,
    pub address: Address,
}

impl ContractRef {
    pub fn new(abi: impl Into<String>, address: Address) -> Self {
        Self {
            abi: abi.into(),
            address,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractRefs {
    pub tea_game: ContractRef,
    pub voting: ContractRef,
    pub chat: ContractRef,
    pub token: ContractRef,
}

/// Relative selection weight per action. Zero disables an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionWeights {
    pub tea_game: u32,
    pub voting: u32,
    pub chat: u32,
    pub transfer: u32,
}

impl Default for ActionWeights {
    fn default() -> Self {
        Self {
            tea_game: 2,
            voting: 2,
            chat: 2,
            transfer: 5,
        }
    }
}

/// Everything needed to connect and run, already validated.
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub rpc_url: Url,
    pub rpc_timeout: Duration,
    pub abi_dir: PathBuf,
    pub recipients_file: PathBuf,
    pub contracts: ContractRefs,
    pub token_decimals: u8,
    pub weights: ActionWeights,
    pub schedule: ScheduleSettings,
    pub tea_catalog: TeaCatalog,
    pub check_already_voted: bool,
}

/// One client per contract.
#[derive(Clone)]
pub struct ContractClients {
    pub tea_game: Arc<dyn ContractClient>,
    pub voting: Arc<dyn ContractClient>,
    pub chat: Arc<dyn ContractClient>,
    pub token: Arc<dyn ContractClient>,
}

/// The four adapters, bound to one signer.
#[derive(Clone)]
pub struct AppContext {
    pub tea_game: Arc<TeaGame>,
    pub voting: Arc<VotingSystem>,
    pub chat: Arc<SimpleChat>,
    pub transfer: Arc<TransferToken>,
    pub signer: Address,
}

impl AppContext {
    /// Connects to the node and loads every contract interface.
    /// A missing or malformed interface description fails here, before any action runs.
    pub fn connect(settings: &BotSettings, signer: PrivateKeySigner) -> Result<Self> {
        let address = signer.address();
        let provider = connect_signer(&settings.rpc_url, signer, settings.rpc_timeout);
        let factory = ContractFactory::new(
            AbiStore::new(&settings.abi_dir),
            provider,
            address,
            settings.rpc_timeout,
        );
        let load = |c: &ContractRef| factory.load(&c.abi, c.address);
        let refs = &settings.contracts;
        let clients = ContractClients {
            tea_game: load(&refs.tea_game)?,
            voting: load(&refs.voting)?,
            chat: load(&refs.chat)?,
            token: load(&refs.token)?,
        };
        info!(
            "Connected to {} as {}",
            settings.rpc_url,
            address.to_checksum(None)
        );
        Ok(Self::from_clients(settings, address, clients))
    }

    pub fn from_clients(settings: &BotSettings, signer: Address, clients: ContractClients) -> Self {
        Self {
            tea_game: Arc::new(TeaGame::new(clients.tea_game, settings.tea_catalog)),
            voting: Arc::new(VotingSystem::new(
                clients.voting,
                settings.check_already_voted,
            )),
            chat: Arc::new(SimpleChat::new(clients.chat)),
            transfer: Arc::new(TransferToken::new(
                clients.token,
                RecipientBook::new(&settings.recipients_file),
                settings.token_decimals,
            )),
            signer,
        }
    }

    /// Selection table over the four adapters. Fails if every weight is zero.
    pub fn action_table(&self, weights: &ActionWeights) -> Result<WeightedTable> {
        WeightedTable::new(vec![
            WeightedAction::new(TEA_GAME, weights.tea_game, self.tea_game.clone()),
            WeightedAction::new(VOTING_SYSTEM, weights.voting, self.voting.clone()),
            WeightedAction::new(SIMPLE_CHAT, weights.chat, self.chat.clone()),
            WeightedAction::new("TransferToken", weights.transfer, self.transfer.clone()),
        ])
    }
}
