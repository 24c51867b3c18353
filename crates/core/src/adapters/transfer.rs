use super::{as_string, as_uint, first, ActionParams, BotAction, ExecutionResult, QueryResult};
use crate::{
    contract::ContractClient,
    error::Error,
    recipients::{Recipient, RecipientBook},
    Result,
};
use alloy::{
    dyn_abi::DynSolValue,
    primitives::{
        utils::{format_units, parse_units},
        Address, U256,
    },
};
use async_trait::async_trait;
use rand::{Rng, RngCore};
use std::{fmt, sync::Arc};
use tracing::{error, info};

/// Default ERC-20 precision.
pub const DEFAULT_DECIMALS: u8 = 18;

/// A transfer amount with four decimal places, stored as ten-thousandths of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAmount(u32);

impl TokenAmount {
    const SCALE: u32 = 10_000;

    pub const fn from_ten_thousandths(n: u32) -> Self {
        Self(n)
    }

    pub fn ten_thousandths(&self) -> u32 {
        self.0
    }

    /// Uniform in [0.1, 1.0), rounded to four decimals.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(Self::SCALE / 10..Self::SCALE))
    }

    /// Scales the amount to integer token units.
    pub fn to_units(&self, decimals: u8) -> Result<U256> {
        Ok(parse_units(&self.to_string(), decimals)?.get_absolute())
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:04}", self.0 / Self::SCALE, self.0 % Self::SCALE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: U256,
}

/// Adapter for the token contract; sends small amounts to addresses from the recipient book.
pub struct TransferToken {
    contract: Arc<dyn ContractClient>,
    recipients: RecipientBook,
    decimals: u8,
}

impl TransferToken {
    pub fn new(contract: Arc<dyn ContractClient>, recipients: RecipientBook, decimals: u8) -> Self {
        Self {
            contract,
            recipients,
            decimals,
        }
    }

    pub fn recipients(&self) -> &RecipientBook {
        &self.recipients
    }

    pub fn format(&self, units: U256) -> String {
        format_units(units, self.decimals).unwrap_or_else(|_| units.to_string())
    }

    /// Sends a random amount to a random recipient.
    ///
    /// Skips when there are no recipients, when the sender balance cannot be read, or when the
    /// balance does not cover the amount.
    pub async fn transfer_token<R: Rng + Send + ?Sized>(&self, rng: &mut R) -> ExecutionResult {
        let recipients = self.recipients.load();
        if recipients.is_empty() {
            return ExecutionResult::skipped(format!(
                "No recipients available in {}",
                self.recipients.path().display()
            ));
        }

        let sender = self.contract.signer();
        let balance = match self.query_balance(sender).await {
            Ok(balance) => balance,
            Err(e) => {
                error!("Balance check failed for {sender}: {e}");
                return ExecutionResult::skipped("Failed to check sender balance");
            }
        };

        let Recipient { address: recipient } = recipients[rng.gen_range(0..recipients.len())];
        let amount = TokenAmount::random(rng);

        match self.send(balance, recipient, amount).await {
            Ok(res) => res,
            Err(e) => {
                error!("Transfer failed: {e}");
                ExecutionResult::failed(e.to_string())
            }
        }
    }

    async fn send(
        &self,
        balance: U256,
        recipient: Address,
        amount: TokenAmount,
    ) -> Result<ExecutionResult> {
        let units = amount.to_units(self.decimals)?;
        if balance < units {
            return Ok(ExecutionResult::skipped(format!(
                "Insufficient balance (has {}, needs {amount})",
                self.format(balance)
            )));
        }

        let args = [
            DynSolValue::Address(recipient),
            DynSolValue::Uint(units, 256),
        ];
        let tx_hash = self.contract.submit("transfer", &args).await?;
        info!("Transferring {amount} tokens to {recipient} - TX: {tx_hash}");

        let confirmation = self.contract.confirm(tx_hash).await?;
        if !confirmation.succeeded {
            return Ok(ExecutionResult::failed(format!(
                "transfer {tx_hash} reverted"
            )));
        }
        info!(
            "Transfer confirmed in block {} - gas used: {}",
            confirmation.block_number.unwrap_or_default(),
            confirmation.gas_used
        );
        Ok(ExecutionResult::Success {
            tx_hash,
            params: ActionParams::Transfer { recipient, amount },
        })
    }

    async fn query_balance(&self, holder: Address) -> Result<U256> {
        let out = self
            .contract
            .read("balanceOf", &[DynSolValue::Address(holder)])
            .await?;
        as_uint("balanceOf", first("balanceOf", &out)?)
    }

    /// Token balance of `holder`, in raw units.
    pub async fn balance_of(&self, holder: Address) -> QueryResult<U256> {
        self.query_balance(holder).await.map_err(|e| {
            error!("Balance check failed for {holder}: {e}");
            e.into()
        })
    }

    pub async fn token_info(&self) -> QueryResult<TokenInfo> {
        let res = async {
            let symbol = self.contract.read("symbol", &[]).await?;
            let decimals = self.contract.read("decimals", &[]).await?;
            let supply = self.contract.read("totalSupply", &[]).await?;
            let decimals = as_uint("decimals", first("decimals", &decimals)?)?;
            Ok::<_, Error>(TokenInfo {
                symbol: as_string("symbol", first("symbol", &symbol)?)?,
                decimals: u8::try_from(decimals)
                    .map_err(|e| Error::decode("decimals", e.to_string()))?,
                total_supply: as_uint("totalSupply", first("totalSupply", &supply)?)?,
            })
        }
        .await;
        res.map_err(|e| {
            error!("Failed to get token info: {e}");
            e.into()
        })
    }
}

#[async_trait]
impl BotAction for TransferToken {
    async fn execute(&self, rng: &mut (dyn RngCore + Send)) -> Result<ExecutionResult> {
        Ok(self.transfer_token(rng).await)
    }
}
