pub mod chain_service;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod server;
pub mod state_chain;
