//! Event Types
//!
//! Notifications emitted by contracts while executing a transaction.
//! A log pairs an event with the address of the contract that emitted it.

use super::{Address, TokenId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Event {
    Transfer {
        from: Address,
        to: Address,
        token_id: TokenId,
    },
    Approval {
        owner: Address,
        approved: Address,
        token_id: TokenId,
    },
    ApprovalForAll {
        owner: Address,
        operator: Address,
        approved: bool,
    },
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },
    /// Two callers were matched; `first` had been waiting
    PairFound { first: Address, second: Address },
    /// A matched pair was settled by `resolver`
    PairResolved {
        resolver: Address,
        partner: Address,
        outcome: Address,
    },
    Staked { staker: Address, token_id: TokenId },
    Unstaked { staker: Address, token_id: TokenId },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Transfer { .. } => "Transfer",
            Event::Approval { .. } => "Approval",
            Event::ApprovalForAll { .. } => "ApprovalForAll",
            Event::OwnershipTransferred { .. } => "OwnershipTransferred",
            Event::PairFound { .. } => "PairFound",
            Event::PairResolved { .. } => "PairResolved",
            Event::Staked { .. } => "Staked",
            Event::Unstaked { .. } => "Unstaked",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// Contract that emitted the event
    pub address: Address,
    pub event: Event,
}
