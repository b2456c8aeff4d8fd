//! Data Structures Module
//!
//! Storage structures shared by the contracts. Currently holds the token
//! ledger that backs the NFT registry.

pub mod token_ledger;

pub use token_ledger::TokenLedger;
