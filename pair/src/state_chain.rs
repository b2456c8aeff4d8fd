//! State machine implementation for the chain service
//!
//! This module plugs the chain engine into the executor.

use crate::engine::chainengine::ChainEngine;
use crate::error::ChainError;
use crate::executor::StateMachine;
use crate::metrics;

/// State machine that wraps the chain engine
///
/// Delegates every operation to the underlying engine and keeps the block
/// height gauge current.
#[derive(Default, Clone)]
pub struct StateChain {
    chain_engine: ChainEngine,
}

impl StateChain {
    pub fn new() -> StateChain {
        StateChain {
            chain_engine: ChainEngine::new(),
        }
    }

    pub fn engine(&self) -> &ChainEngine {
        &self.chain_engine
    }
}

impl StateMachine for StateChain {
    fn apply(&mut self, index: u64, data: &[u8]) -> Vec<u8> {
        let reply = self.chain_engine.on_message(index, data);
        metrics::BLOCK_HEIGHT.set(self.chain_engine.block_number() as i64);
        reply
    }

    fn query(&self, data: &[u8]) -> Vec<u8> {
        self.chain_engine.on_query(data)
    }

    fn snapshot(&self) -> Result<Vec<u8>, ChainError> {
        self.chain_engine.snapshot()
    }

    /// Restores state from a snapshot
    ///
    /// # Arguments
    ///
    /// * `_last_index` - The last journal index covered by the snapshot
    /// * `data` - The snapshot data to restore from
    fn on_snapshot(&mut self, _last_index: u64, data: &[u8]) -> Result<(), ChainError> {
        self.chain_engine.on_snapshot(data)?;
        metrics::BLOCK_HEIGHT.set(self.chain_engine.block_number() as i64);
        Ok(())
    }
}
