use crate::{error::Error, Result};
use alloy::{
    contract::{ContractInstance, Interface},
    dyn_abi::DynSolValue,
    json_abi::JsonAbi,
    network::ReceiptResponse,
    primitives::{Address, TxHash},
    providers::{DynProvider, PendingTransactionBuilder, Provider},
};
use async_trait::async_trait;
use std::{future::IntoFuture, time::Duration};

/// Result of waiting for a submitted transaction to be mined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub succeeded: bool,
}

/// Callable surface of one deployed contract, bound to the bot's signer.
#[async_trait]
pub trait ContractClient: Send + Sync {
    /// Name of the interface description this client was built from.
    fn name(&self) -> &str;

    fn address(&self) -> Address;

    /// Address of the signer that authorizes submitted calls.
    fn signer(&self) -> Address;

    /// Executes a read-only call and returns the decoded outputs.
    async fn read(&self, method: &str, args: &[DynSolValue]) -> Result<Vec<DynSolValue>>;

    /// Signs and broadcasts a state-changing call.
    async fn submit(&self, method: &str, args: &[DynSolValue]) -> Result<TxHash>;

    /// Waits for `tx_hash` to be included.
    async fn confirm(&self, tx_hash: TxHash) -> Result<Confirmation>;
}

async fn bounded<F, T, E>(timeout: Duration, what: &'static str, fut: F) -> Result<T>
where
    F: IntoFuture<Output = std::result::Result<T, E>>,
    Error: From<E>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| Error::Timeout(what, timeout.as_secs()))?
        .map_err(Error::from)
}

/// [`ContractClient`] backed by a live provider.
pub struct AlloyContract {
    name: String,
    instance: ContractInstance<DynProvider>,
    signer: Address,
    timeout: Duration,
}

impl AlloyContract {
    pub fn new(
        name: impl Into<String>,
        address: Address,
        abi: JsonAbi,
        provider: DynProvider,
        signer: Address,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            instance: ContractInstance::new(address, provider, Interface::new(abi)),
            signer,
            timeout,
        }
    }
}

#[async_trait]
impl ContractClient for AlloyContract {
    fn name(&self) -> &str {
        &self.name
    }

    fn address(&self) -> Address {
        *self.instance.address()
    }

    fn signer(&self) -> Address {
        self.signer
    }

    async fn read(&self, method: &str, args: &[DynSolValue]) -> Result<Vec<DynSolValue>> {
        let call = self.instance.function(method, args)?;
        bounded(self.timeout, "contract read", call.call()).await
    }

    async fn submit(&self, method: &str, args: &[DynSolValue]) -> Result<TxHash> {
        let call = self.instance.function(method, args)?.from(self.signer);
        let pending = bounded(self.timeout, "transaction submission", call.send()).await?;
        Ok(*pending.tx_hash())
    }

    async fn confirm(&self, tx_hash: TxHash) -> Result<Confirmation> {
        let pending =
            PendingTransactionBuilder::new(self.instance.provider().root().clone(), tx_hash)
                .with_timeout(Some(self.timeout));
        let receipt = pending.get_receipt().await?;
        Ok(Confirmation {
            tx_hash,
            block_number: receipt.block_number(),
            gas_used: receipt.gas_used(),
            succeeded: receipt.status(),
        })
    }
}
