use crate::{error::Error, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::read,
    path::{Path, PathBuf},
    time::Duration,
};
use teabot_core::{
    adapters::{transfer::DEFAULT_DECIMALS, TeaCatalog},
    context::{
        ActionWeights, BotSettings, ContractRef, ContractRefs, SIMPLE_CHAT, TEA_GAME, TOKEN,
        VOTING_SYSTEM,
    },
    recipients::parse_address,
    scheduler::ScheduleSettings,
};
use url::Url;

pub const DEFAULT_RPC_URL: &str = "https://tea-sepolia.g.alchemy.com/public";

/// Bot settings; defines the TOML schema for bot files.
/// Every key is optional and falls back to the public testnet deployment.
#[derive(Clone, Deserialize, Debug, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct BotConfig {
    pub rpc_url: String,

    /// Append-only log file.
    pub log_file: PathBuf,

    /// Directory holding one `<Contract>.json` interface description per contract.
    pub abi_dir: PathBuf,

    /// Newline-delimited list of transfer recipients.
    pub recipients_file: PathBuf,

    /// Bound on every RPC request and receipt wait.
    pub rpc_timeout_secs: u64,

    pub token_decimals: u8,

    /// `extended` (30 actions) or `classic` (the first 15).
    pub tea_catalog: TeaCatalog,

    /// Query `hasVoted` before voting and skip if it returns true.
    pub check_already_voted: bool,

    pub contracts: ContractsConfig,

    pub weights: WeightsConfig,

    pub schedule: ScheduleConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_owned(),
            log_file: PathBuf::from("bot.log"),
            abi_dir: PathBuf::from("abis"),
            recipients_file: PathBuf::from("kyc_address.txt"),
            rpc_timeout_secs: 45,
            token_decimals: DEFAULT_DECIMALS,
            tea_catalog: TeaCatalog::default(),
            check_already_voted: true,
            contracts: ContractsConfig::default(),
            weights: WeightsConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

/// A deployed contract: the interface description name under `abi_dir` and its address.
#[derive(Clone, Deserialize, Debug, Serialize, PartialEq, Eq)]
pub struct ContractEntry {
    pub abi: String,
    pub address: String,
}

impl ContractEntry {
    pub fn new(abi: &str, address: &str) -> Self {
        Self {
            abi: abi.to_owned(),
            address: address.to_owned(),
        }
    }

    fn to_ref(&self, field: &'static str) -> Result<ContractRef> {
        if self.abi.trim().is_empty() {
            return Err(Error::invalid(field, "abi name is empty"));
        }
        let address = parse_address(self.address.trim()).ok_or_else(|| {
            Error::invalid(field, format!("'{}' is not an address", self.address))
        })?;
        Ok(ContractRef::new(self.abi.trim(), address))
    }
}

#[derive(Clone, Deserialize, Debug, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ContractsConfig {
    pub tea_game: ContractEntry,
    pub voting: ContractEntry,
    pub chat: ContractEntry,
    pub token: ContractEntry,
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            tea_game: ContractEntry::new(TEA_GAME, "0xcd77Fa493532Af747769A2dc0dd6111a8C3C1E84"),
            voting: ContractEntry::new(VOTING_SYSTEM, "0xae5fd1bdc856fB43151D6b9c09A489d6DDcD751d"),
            chat: ContractEntry::new(SIMPLE_CHAT, "0x24f8D6a25F756c7239F978b30b3EEa4Ac6aa1642"),
            token: ContractEntry::new(TOKEN, "0x89a4C0f4F0E4023ef8B8106DDc9f64681FFd57CD"),
        }
    }
}

/// Relative selection weights. Zero disables an action.
#[derive(Clone, Copy, Deserialize, Debug, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct WeightsConfig {
    pub tea_game: u32,
    pub voting: u32,
    pub chat: u32,
    pub transfer: u32,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        let ActionWeights {
            tea_game,
            voting,
            chat,
            transfer,
        } = ActionWeights::default();
        Self {
            tea_game,
            voting,
            chat,
            transfer,
        }
    }
}

#[derive(Clone, Copy, Deserialize, Debug, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScheduleConfig {
    pub min_wait_secs: u64,
    pub max_wait_secs: u64,
    /// Log a summary line and reset counters every this many actions.
    pub summary_every: u64,
    pub error_backoff_secs: u64,
    /// Length of each operational window.
    pub window_hours: u64,
    /// Windows start on multiples of this many hours since the Unix epoch.
    pub period_hours: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_actions_per_window: Option<u64>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            min_wait_secs: 15,
            max_wait_secs: 60,
            summary_every: 500,
            error_backoff_secs: 60,
            window_hours: 12,
            period_hours: 12,
            max_actions_per_window: None,
        }
    }
}

fn hours(field: &'static str, hours: u64) -> Result<Duration> {
    hours
        .checked_mul(3600)
        .map(Duration::from_secs)
        .ok_or_else(|| Error::invalid(field, format!("{hours} hours is out of range")))
}

impl ScheduleConfig {
    pub fn to_settings(&self) -> Result<ScheduleSettings> {
        let settings = ScheduleSettings {
            min_wait: Duration::from_secs(self.min_wait_secs),
            max_wait: Duration::from_secs(self.max_wait_secs),
            summary_every: self.summary_every,
            error_backoff: Duration::from_secs(self.error_backoff_secs),
            window: hours("schedule.window_hours", self.window_hours)?,
            period: hours("schedule.period_hours", self.period_hours)?,
            max_actions_per_window: self.max_actions_per_window,
        };
        settings.validate()?;
        Ok(settings)
    }
}

impl BotConfig {
    pub fn from_file(file_path: impl AsRef<Path>) -> Result<BotConfig> {
        let file_contents_str = String::from_utf8_lossy(&read(file_path)?).to_string();
        let bot_file: BotConfig = toml::from_str(&file_contents_str)?;
        Ok(bot_file)
    }

    pub fn encode_toml(&self) -> Result<String> {
        let encoded = toml::to_string(self)?;
        Ok(encoded)
    }

    pub fn save_toml(&self, file_path: impl AsRef<Path>) -> Result<()> {
        let encoded = self.encode_toml()?;
        std::fs::write(file_path, encoded)?;
        Ok(())
    }

    /// Validates the file and converts it into runtime settings.
    pub fn to_settings(&self) -> Result<BotSettings> {
        let rpc_url = Url::parse(&self.rpc_url)
            .map_err(|e| Error::invalid("rpc_url", format!("'{}': {e}", self.rpc_url)))?;
        if self.rpc_timeout_secs == 0 {
            return Err(Error::invalid("rpc_timeout_secs", "must be positive"));
        }
        if self.token_decimals > 77 {
            return Err(Error::invalid(
                "token_decimals",
                format!("{} exceeds the 77 decimals a uint256 can hold", self.token_decimals),
            ));
        }

        let WeightsConfig {
            tea_game,
            voting,
            chat,
            transfer,
        } = self.weights;
        if tea_game == 0 && voting == 0 && chat == 0 && transfer == 0 {
            return Err(Error::invalid(
                "weights",
                "at least one action needs a positive weight",
            ));
        }

        Ok(BotSettings {
            rpc_url,
            rpc_timeout: Duration::from_secs(self.rpc_timeout_secs),
            abi_dir: self.abi_dir.clone(),
            recipients_file: self.recipients_file.clone(),
            contracts: ContractRefs {
                tea_game: self.contracts.tea_game.to_ref("contracts.tea_game")?,
                voting: self.contracts.voting.to_ref("contracts.voting")?,
                chat: self.contracts.chat.to_ref("contracts.chat")?,
                token: self.contracts.token.to_ref("contracts.token")?,
            },
            token_decimals: self.token_decimals,
            weights: ActionWeights {
                tea_game,
                voting,
                chat,
                transfer,
            },
            schedule: self.schedule.to_settings()?,
            tea_catalog: self.tea_catalog,
            check_already_voted: self.check_already_voted,
        })
    }
}
