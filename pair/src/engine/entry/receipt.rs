//! Receipt Types
//!
//! The outcome of an executed transaction.

use super::{Address, Event, Log, Revert};
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TxStatus {
    Success,
    Reverted(Revert),
}

/// Represents an executed transaction
/// Reverted transactions carry their reason and no logs
#[derive(Debug, Clone, Serialize, Deserialize, Getters, CopyGetters)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    #[getset(get = "pub")]
    tx_hash: String,
    #[getset(get_copy = "pub")]
    block_number: u64,
    #[getset(get_copy = "pub")]
    from: Address,
    #[getset(get_copy = "pub")]
    to: Option<Address>,
    /// Address of the deployed contract, for deployments
    #[getset(get_copy = "pub")]
    contract_address: Option<Address>,
    #[getset(get = "pub")]
    status: TxStatus,
    #[getset(get = "pub")]
    reason: Option<String>,
    #[getset(get = "pub")]
    logs: Vec<Log>,
}

impl Receipt {
    pub fn success(
        tx_hash: String,
        block_number: u64,
        from: Address,
        to: Option<Address>,
        contract_address: Option<Address>,
        logs: Vec<Log>,
    ) -> Self {
        Self {
            tx_hash,
            block_number,
            from,
            to,
            contract_address,
            status: TxStatus::Success,
            reason: None,
            logs,
        }
    }

    pub fn reverted(
        tx_hash: String,
        block_number: u64,
        from: Address,
        to: Option<Address>,
        revert: Revert,
    ) -> Self {
        Self {
            tx_hash,
            block_number,
            from,
            to,
            contract_address: None,
            reason: Some(revert.to_string()),
            status: TxStatus::Reverted(revert),
            logs: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TxStatus::Success
    }

    pub fn revert(&self) -> Option<&Revert> {
        match &self.status {
            TxStatus::Success => None,
            TxStatus::Reverted(revert) => Some(revert),
        }
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.logs.iter().map(|log| &log.event)
    }

    /// True if `emitter` logged `event` in this transaction
    pub fn emitted(&self, emitter: &Address, event: &Event) -> bool {
        self.logs
            .iter()
            .any(|log| log.address == *emitter && log.event == *event)
    }
}
