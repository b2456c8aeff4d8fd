//! Chain Engine Module
//!
//! This module contains the core components of the simulated chain:
//! - `data`: Storage structures used by the contracts
//! - `entry`: Addresses, transactions, events, receipts and revert reasons
//! - `chainengine`: Transaction execution and the command interface
//! - `matchlogic`: The pairing matcher
//! - `contracts`: The deployable contracts and their dispatch

pub mod chainengine;
pub mod contracts;
pub mod data;
pub mod entry;
pub mod matchlogic;
