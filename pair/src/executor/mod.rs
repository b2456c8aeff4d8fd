//! Single-writer executor
//!
//! Owns a state machine and applies proposals to it one at a time. Writes are
//! journaled before they are applied; state is snapshotted periodically.

pub mod node;
pub mod proposal;
mod segment;
mod storage;

pub use node::Node;
pub use proposal::{Proposal, ProposalResult};
pub use storage::FileStorage;

use crate::error::ChainError;

pub trait StateMachine {
    /// Applies a journaled write and returns the encoded reply
    fn apply(&mut self, index: u64, data: &[u8]) -> Vec<u8>;
    /// Answers a read-only request
    fn query(&self, data: &[u8]) -> Vec<u8>;
    fn snapshot(&self) -> Result<Vec<u8>, ChainError>;
    /// Replaces the state with a snapshot; an undecodable snapshot is an error
    fn on_snapshot(&mut self, last_index: u64, data: &[u8]) -> Result<(), ChainError>;
}
