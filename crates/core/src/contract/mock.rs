use super::{Confirmation, ContractClient};
use crate::{error::Error, Result};
use alloy::{
    contract,
    dyn_abi::DynSolValue,
    primitives::{keccak256, Address, TxHash},
    transports::TransportErrorKind,
};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

type Reply = Arc<dyn Fn(&[DynSolValue]) -> std::result::Result<Vec<DynSolValue>, String> + Send + Sync>;

/// Scripted stand-in for a deployed contract. Records every call it receives.
pub struct MockContract {
    name: String,
    address: Address,
    signer: Address,
    reads: HashMap<String, Reply>,
    submit_failures: HashMap<String, String>,
    confirm_failure: Option<String>,
    calls: Mutex<Vec<(String, Vec<DynSolValue>)>>,
}

impl MockContract {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: Address::repeat_byte(0xc0),
            signer: Address::repeat_byte(0x5e),
            reads: HashMap::new(),
            submit_failures: HashMap::new(),
            confirm_failure: None,
            calls: Mutex::new(vec![]),
        }
    }

    pub fn with_signer(mut self, signer: Address) -> Self {
        self.signer = signer;
        self
    }

    /// `method` always returns `outputs`.
    pub fn with_read(self, method: &str, outputs: Vec<DynSolValue>) -> Self {
        self.with_read_fn(method, move |_| Ok(outputs.clone()))
    }

    /// `method` returns whatever `reply` computes from the call arguments.
    pub fn with_read_fn<F>(mut self, method: &str, reply: F) -> Self
    where
        F: Fn(&[DynSolValue]) -> std::result::Result<Vec<DynSolValue>, String> + Send + Sync + 'static,
    {
        self.reads.insert(method.to_owned(), Arc::new(reply));
        self
    }

    /// `method` fails with `reason` when read.
    pub fn with_read_failure(self, method: &str, reason: &str) -> Self {
        let reason = reason.to_owned();
        self.with_read_fn(method, move |_| Err(reason.clone()))
    }

    /// Submitting `method` fails with `reason`.
    pub fn with_submit_failure(mut self, method: &str, reason: &str) -> Self {
        self.submit_failures
            .insert(method.to_owned(), reason.to_owned());
        self
    }

    pub fn with_confirm_failure(mut self, reason: &str) -> Self {
        self.confirm_failure = Some(reason.to_owned());
        self
    }

    /// Number of reads and submissions of `method`.
    pub fn call_count(&self, method: &str) -> usize {
        self.lock_calls().iter().filter(|(m, _)| m == method).count()
    }

    pub fn total_calls(&self) -> usize {
        self.lock_calls().len()
    }

    /// Arguments of every call to `method`, in order.
    pub fn call_args(&self, method: &str) -> Vec<Vec<DynSolValue>> {
        self.lock_calls()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, args)| args.to_owned())
            .collect()
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<(String, Vec<DynSolValue>)>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, method: &str, args: &[DynSolValue]) -> usize {
        let mut calls = self.lock_calls();
        calls.push((method.to_owned(), args.to_vec()));
        calls.len()
    }
}

fn rpc_failure(reason: &str) -> Error {
    Error::Rpc(TransportErrorKind::custom_str(reason))
}

#[async_trait]
impl ContractClient for MockContract {
    fn name(&self) -> &str {
        &self.name
    }

    fn address(&self) -> Address {
        self.address
    }

    fn signer(&self) -> Address {
        self.signer
    }

    async fn read(&self, method: &str, args: &[DynSolValue]) -> Result<Vec<DynSolValue>> {
        self.record(method, args);
        let reply = self
            .reads
            .get(method)
            .ok_or_else(|| contract::Error::UnknownFunction(method.to_owned()))?;
        reply(args).map_err(|reason| rpc_failure(&reason))
    }

    async fn submit(&self, method: &str, args: &[DynSolValue]) -> Result<TxHash> {
        let nth = self.record(method, args);
        if let Some(reason) = self.submit_failures.get(method) {
            return Err(rpc_failure(reason));
        }
        Ok(keccak256(format!("{}:{method}:{nth}", self.name)))
    }

    async fn confirm(&self, tx_hash: TxHash) -> Result<Confirmation> {
        if let Some(reason) = &self.confirm_failure {
            return Err(rpc_failure(reason));
        }
        Ok(Confirmation {
            tx_hash,
            block_number: Some(1),
            gas_used: 21_000,
            succeeded: true,
        })
    }
}
