pub mod address;
pub mod event;
pub mod receipt;
pub mod revert;
pub mod transaction;

pub use address::{dev_accounts, keccak256, Address, AddressError};
pub use event::{Event, Log};
pub use receipt::{Receipt, TxStatus};
pub use revert::Revert;
pub use transaction::{Call, Deployment, Tx, View, ViewResult};

/// NFT identifier, assigned sequentially from zero
pub type TokenId = u64;
