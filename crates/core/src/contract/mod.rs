mod abi;
mod client;
mod mock;

pub use abi::AbiStore;
pub use client::{AlloyContract, Confirmation, ContractClient};
pub use mock::MockContract;

use crate::Result;
use alloy::{primitives::Address, providers::DynProvider};
use std::{sync::Arc, time::Duration};
use tracing::debug;

/// Builds contract clients bound to one provider and signer.
pub struct ContractFactory {
    abis: AbiStore,
    provider: DynProvider,
    signer: Address,
    timeout: Duration,
}

impl ContractFactory {
    pub fn new(abis: AbiStore, provider: DynProvider, signer: Address, timeout: Duration) -> Self {
        Self {
            abis,
            provider,
            signer,
            timeout,
        }
    }

    /// Loads the interface description for `name` and binds it to `address`.
    /// A missing or malformed description is a startup error.
    pub fn load(&self, name: &str, address: Address) -> Result<Arc<dyn ContractClient>> {
        let abi = self.abis.load(name)?;
        debug!(
            "loaded {name} interface ({} functions) from {}",
            abi.functions.len(),
            self.abis.dir().display()
        );
        Ok(Arc::new(AlloyContract::new(
            name,
            address,
            abi,
            self.provider.clone(),
            self.signer,
            self.timeout,
        )))
    }

    pub fn signer(&self) -> Address {
        self.signer
    }
}
