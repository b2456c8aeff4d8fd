use tokio::sync::oneshot;
use tokio::sync::oneshot::Receiver;
use tokio::sync::oneshot::Sender;

use crate::error::ChainError;

/// Outcome delivered to the proposer: the state machine's encoded reply, or
/// the executor failure that kept the proposal from being applied
pub type ProposalResult = Result<Vec<u8>, ChainError>;

pub struct Proposal {
    pub normal: Option<Vec<u8>>, // journaled write
    pub query: Option<Vec<u8>>,  // read-only request
    pub save_snapshot: bool,
    pub propose_success: Option<Sender<ProposalResult>>,
}

impl Proposal {
    fn with(
        normal: Option<Vec<u8>>,
        query: Option<Vec<u8>>,
        save_snapshot: bool,
    ) -> (Self, Receiver<ProposalResult>) {
        let (tx, rx) = oneshot::channel();
        let proposal = Proposal {
            normal,
            query,
            save_snapshot,
            propose_success: Some(tx),
        };
        (proposal, rx)
    }

    pub fn normal(data: Vec<u8>) -> (Self, Receiver<ProposalResult>) {
        Self::with(Some(data), None, false)
    }

    pub fn query(data: Vec<u8>) -> (Self, Receiver<ProposalResult>) {
        Self::with(None, Some(data), false)
    }

    /// Asks the node to persist a snapshot now; replies with an empty payload
    pub fn snapshot() -> (Self, Receiver<ProposalResult>) {
        Self::with(None, None, true)
    }
}
