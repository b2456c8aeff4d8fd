//! Contracts Module
//!
//! This module provides the contracts hosted by the chain engine:
//! - `basic_nft`: owner-mintable NFT collection
//! - `pair`: the pairing contracts, plain and NFT-aware
//! - `staking`: single-token NFT staking
//! - `contract_manager`: deployment and call dispatch by address
//!
//! Contracts reach each other through the `NftRegistry` trait and receive a
//! `CallContext` describing the current call.

pub mod basic_nft;
pub mod context;
pub mod contract_manager;
pub mod pair;
pub mod staking;

pub use basic_nft::BasicNft;
pub use context::{CallContext, NftRegistry};
pub use contract_manager::{Checkpoint, ContractKind, ContractManager};
pub use pair::{NftPair, Pair};
pub use staking::NftSingleStaking;
