//! Chain Engine Module
//!
//! This module implements the simulated chain: transaction execution with
//! all-or-nothing semantics, contract deployment, read-only views, and a
//! bincode command interface used by the executor.

pub use super::contracts::{CallContext, ContractManager};
pub use super::entry::{Address, Call, Deployment, Receipt, Revert, Tx, View, ViewResult};

use crate::error::ChainError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Represents the different types of commands that can be processed by the chain engine
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub enum ChainCmdType {
    /// Execute a transaction
    #[default]
    Transact,
    /// Answer a read-only view call
    View,
    /// Report chain status
    Status,
}

/// Command structure for interacting with the chain engine
/// Contains the command type and the payload it needs
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ChainCmd {
    pub cmd: ChainCmdType,
    /// Transaction for `Transact`
    pub tx: Option<Tx>,
    /// Target contract and view for `View`
    pub view: Option<(Address, View)>,
}

impl ChainCmd {
    pub fn transact(tx: Tx) -> Self {
        ChainCmd {
            cmd: ChainCmdType::Transact,
            tx: Some(tx),
            view: None,
        }
    }

    pub fn view(to: Address, view: View) -> Self {
        ChainCmd {
            cmd: ChainCmdType::View,
            tx: None,
            view: Some((to, view)),
        }
    }

    pub fn status() -> Self {
        ChainCmd {
            cmd: ChainCmdType::Status,
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChainStatus {
    pub block_number: u64,
    pub contracts: usize,
}

/// Reply to a `ChainCmd`
#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum ChainReply {
    Receipt(Receipt),
    View(Result<ViewResult, Revert>),
    Status(ChainStatus),
    /// The command could not be decoded or was incomplete
    Invalid(String),
}

/// The chain engine
/// Holds all contract state plus the block height and sender nonces
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ChainEngine {
    /// Current block number; one transaction per block
    index: u64,
    nonces: HashMap<Address, u64>,
    contracts: ContractManager,
}

impl ChainEngine {
    pub fn new() -> ChainEngine {
        ChainEngine {
            index: 0,
            nonces: HashMap::new(),
            contracts: ContractManager::new(),
        }
    }

    pub fn block_number(&self) -> u64 {
        self.index
    }

    pub fn nonce(&self, account: &Address) -> u64 {
        self.nonces.get(account).copied().unwrap_or(0)
    }

    pub fn contracts(&self) -> &ContractManager {
        &self.contracts
    }

    pub fn status(&self) -> ChainStatus {
        ChainStatus {
            block_number: self.index,
            contracts: self.contracts.len(),
        }
    }

    /// Executes `tx` in the next block.
    ///
    /// The block number and the sender nonce always advance; contract state
    /// only changes when the whole transaction succeeds.
    pub fn execute(&mut self, tx: &Tx) -> Receipt {
        self.index += 1;
        let nonce = self.nonce(&tx.from);
        let tx_hash = tx.hash(nonce);

        if tx.from.is_zero() {
            return Receipt::reverted(tx_hash, self.index, tx.from, tx.to, Revert::ZeroSender);
        }
        self.nonces.insert(tx.from, nonce + 1);

        let target = match (&tx.call, tx.to) {
            (Call::Deploy(_), _) => Address::create(&tx.from, nonce),
            (_, to) => to.unwrap_or(Address::ZERO),
        };
        let checkpoint = self.contracts.checkpoint(&target);
        let mut ctx = CallContext::new(tx.from, target);
        let result = match (&tx.call, tx.to) {
            (Call::Deploy(deployment), _) => {
                self.contracts.deploy(&mut ctx, deployment.clone());
                Ok(Some(target))
            }
            (call, Some(_)) => self.contracts.invoke(&mut ctx, call).map(|_| None),
            (_, None) => Err(Revert::NoContract(Address::ZERO)),
        };

        match result {
            Ok(contract_address) => Receipt::success(
                tx_hash,
                self.index,
                tx.from,
                tx.to,
                contract_address,
                ctx.into_logs(),
            ),
            Err(revert) => {
                log::debug!(
                    "tx {} from {} reverted: {}",
                    tx.call.method(),
                    tx.from,
                    revert
                );
                self.contracts.restore(checkpoint);
                Receipt::reverted(tx_hash, self.index, tx.from, tx.to, revert)
            }
        }
    }

    /// Executes `tx`, turning a reverted receipt into its reason
    pub fn transact(&mut self, tx: Tx) -> Result<Receipt, Revert> {
        let receipt = self.execute(&tx);
        match receipt.revert() {
            Some(revert) => Err(revert.clone()),
            None => Ok(receipt),
        }
    }

    /// Deploys a contract and returns its address
    pub fn deploy(&mut self, from: Address, deployment: Deployment) -> Result<Address, Revert> {
        let receipt = self.transact(Tx::deploy(from, deployment))?;
        receipt
            .contract_address()
            .ok_or(Revert::NoContract(Address::ZERO))
    }

    /// Answers a read-only view
    pub fn call(&self, to: &Address, view: &View) -> Result<ViewResult, Revert> {
        self.contracts.view(to, view)
    }

    /// Processes a write command
    ///
    /// # Arguments
    /// * `index` - Journal index of the command
    /// * `data` - Serialized `ChainCmd`
    ///
    /// # Returns
    /// Serialized `ChainReply`
    pub fn on_message(&mut self, index: u64, data: &[u8]) -> Vec<u8> {
        log::debug!("on_message: index {} len {}", index, data.len());
        let reply = match bincode::deserialize::<ChainCmd>(data) {
            Ok(ChainCmd {
                cmd: ChainCmdType::Transact,
                tx: Some(tx),
                ..
            }) => ChainReply::Receipt(self.execute(&tx)),
            Ok(cmd) => self.answer(cmd),
            Err(e) => {
                log::error!("failed to deserialize chain cmd: {}", e);
                ChainReply::Invalid(e.to_string())
            }
        };
        encode_reply(&reply)
    }

    /// Processes a read-only command; transactions are refused here
    pub fn on_query(&self, data: &[u8]) -> Vec<u8> {
        let reply = match bincode::deserialize::<ChainCmd>(data) {
            Ok(cmd) => self.answer(cmd),
            Err(e) => {
                log::error!("failed to deserialize chain query: {}", e);
                ChainReply::Invalid(e.to_string())
            }
        };
        encode_reply(&reply)
    }

    fn answer(&self, cmd: ChainCmd) -> ChainReply {
        match cmd.cmd {
            ChainCmdType::View => match cmd.view {
                Some((to, view)) => ChainReply::View(self.call(&to, &view)),
                None => ChainReply::Invalid("view command without view".to_string()),
            },
            ChainCmdType::Status => ChainReply::Status(self.status()),
            ChainCmdType::Transact => {
                ChainReply::Invalid("transaction not accepted here".to_string())
            }
        }
    }

    /// Restores engine state from a snapshot
    pub fn on_snapshot(&mut self, data: &[u8]) -> Result<(), ChainError> {
        *self = bincode::deserialize(data)?;
        Ok(())
    }

    /// Creates a snapshot of the current engine state
    pub fn snapshot(&self) -> Result<Vec<u8>, ChainError> {
        Ok(bincode::serialize(&self)?)
    }
}

fn encode_reply(reply: &ChainReply) -> Vec<u8> {
    bincode::serialize(reply).unwrap_or_else(|e| {
        log::error!("failed to serialize chain reply: {}", e);
        Vec::new()
    })
}
