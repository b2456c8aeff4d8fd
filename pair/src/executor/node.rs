//! Executor node implementation
//! The node is the only owner of the state machine. Proposals arrive over a
//! channel and are handled strictly one after another, so every write is
//! applied atomically and in a single global order.

use std::path::Path;

use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration};

use crate::error::ChainError;
use crate::executor::proposal::{Proposal, ProposalResult};
use crate::executor::storage::FileStorage;
use crate::executor::StateMachine;

const PROPOSAL_CHANNEL_SIZE: usize = 1000; // pending proposals before senders wait

pub struct Node<S: StateMachine> {
    storage: FileStorage,
    state_machine: S,
    proposals: Receiver<Proposal>,
    applied: u64, // last applied journal index
    snapshot_interval: Duration,
}

impl<S: StateMachine + Send + 'static> Node<S> {
    /// Opens storage and brings the state machine up to date: latest
    /// snapshot first, then every journaled entry after it. A snapshot the
    /// state machine cannot decode aborts startup.
    fn create(
        base_path: &Path,
        mut state_machine: S,
        proposals: Receiver<Proposal>,
        snapshot_interval: Duration,
    ) -> Result<Self, ChainError> {
        let mut storage = FileStorage::new(base_path)?;

        let mut applied = 0u64;
        if let Some(snapshot) = storage.load_snapshot()? {
            state_machine.on_snapshot(snapshot.index, &snapshot.data)?;
            applied = snapshot.index;
        }
        let entries = storage.entries_after(applied)?;
        let replayed = entries.len();
        for (index, data) in entries {
            state_machine.apply(index, &data);
            applied = index;
        }
        log::info!(
            "executor restored at index {} ({} journal entries replayed)",
            applied,
            replayed
        );

        Ok(Node {
            storage,
            state_machine,
            proposals,
            applied,
            snapshot_interval,
        })
    }

    /// Handles a single proposal and answers it
    fn handle_proposal(&mut self, mut proposal: Proposal) {
        let reply: ProposalResult = if let Some(data) = proposal.normal.take() {
            let index = self.applied + 1;
            match self.storage.append(index, &data) {
                Ok(()) => {
                    self.applied = index;
                    Ok(self.state_machine.apply(index, &data))
                }
                Err(e) => {
                    log::error!("failed to journal entry {}: {}", index, e);
                    Err(e)
                }
            }
        } else if let Some(data) = proposal.query.take() {
            Ok(self.state_machine.query(&data))
        } else if proposal.save_snapshot {
            self.save_snapshot().map(|_| Vec::new())
        } else {
            Ok(Vec::new())
        };

        if let Some(sender) = proposal.propose_success.take() {
            let _ = sender.send(reply);
        }
    }

    /// Persists the state at the applied index. Nothing is written and no
    /// journal segment is dropped unless the state serialized cleanly.
    fn save_snapshot(&mut self) -> Result<(), ChainError> {
        let result = self
            .state_machine
            .snapshot()
            .and_then(|data| self.storage.save_snapshot(data, self.applied));
        match &result {
            Ok(()) => log::info!("Save snapshot at index: {}", self.applied),
            Err(e) => log::error!("Failed to save snapshot at {}: {}", self.applied, e),
        }
        result
    }

    /// Main event loop: proposals in arrival order, periodic snapshots
    async fn run(mut self) {
        let mut ticker = time::interval(self.snapshot_interval);
        ticker.tick().await;

        loop {
            tokio::select! {
                proposal = self.proposals.recv() => match proposal {
                    Some(proposal) => {
                        self.handle_proposal(proposal);
                        while let Ok(proposal) = self.proposals.try_recv() {
                            self.handle_proposal(proposal);
                        }
                    }
                    None => {
                        if self.applied > self.storage.snapshot_index() {
                            let _ = self.save_snapshot();
                        }
                        log::info!("executor stopped at index {}", self.applied);
                        break;
                    }
                },
                _ = ticker.tick() => {
                    if self.applied > self.storage.snapshot_index() {
                        let _ = self.save_snapshot();
                    }
                }
            }
        }
    }

    /// Starts a node on the current runtime and returns the proposal sender.
    /// The node stops once every sender is dropped.
    pub fn start(
        base_path: &Path,
        state_machine: S,
        snapshot_interval: Duration,
    ) -> Result<(Sender<Proposal>, JoinHandle<()>), ChainError> {
        let (tx, rx) = mpsc::channel(PROPOSAL_CHANNEL_SIZE);
        let node = Node::create(base_path, state_machine, rx, snapshot_interval)?;
        let handle = tokio::spawn(node.run());
        Ok((tx, handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    /// Records every applied payload
    #[derive(Default)]
    struct Recorder {
        entries: Vec<(u64, Vec<u8>)>,
        broken_snapshot: bool,
    }

    impl StateMachine for Recorder {
        fn apply(&mut self, index: u64, data: &[u8]) -> Vec<u8> {
            self.entries.push((index, data.to_vec()));
            index.to_be_bytes().to_vec()
        }

        fn query(&self, _data: &[u8]) -> Vec<u8> {
            (self.entries.len() as u64).to_be_bytes().to_vec()
        }

        fn snapshot(&self) -> Result<Vec<u8>, ChainError> {
            if self.broken_snapshot {
                return Err(ChainError::Config("snapshot unavailable".to_string()));
            }
            Ok(bincode::serialize(&self.entries)?)
        }

        fn on_snapshot(&mut self, _last_index: u64, data: &[u8]) -> Result<(), ChainError> {
            self.entries = bincode::deserialize(data)?;
            Ok(())
        }
    }

    async fn propose(tx: &Sender<Proposal>, data: &[u8]) -> Vec<u8> {
        let (proposal, rx) = Proposal::normal(data.to_vec());
        tx.send(proposal).await.unwrap();
        rx.await.unwrap().unwrap()
    }

    async fn count(tx: &Sender<Proposal>) -> u64 {
        let (proposal, rx) = Proposal::query(Vec::new());
        tx.send(proposal).await.unwrap();
        let reply = rx.await.unwrap().unwrap();
        u64::from_be_bytes(reply.try_into().unwrap())
    }

    async fn snapshot(tx: &Sender<Proposal>) -> ProposalResult {
        let (proposal, rx) = Proposal::snapshot();
        tx.send(proposal).await.unwrap();
        rx.await.unwrap()
    }

    #[tokio::test]
    async fn test_writes_are_indexed_in_order() {
        let dir = tempdir().unwrap();
        let (tx, _handle) =
            Node::start(dir.path(), Recorder::default(), Duration::from_secs(60)).unwrap();

        assert_eq!(propose(&tx, b"a").await, 1u64.to_be_bytes());
        assert_eq!(propose(&tx, b"b").await, 2u64.to_be_bytes());
        assert_eq!(count(&tx).await, 2);
    }

    #[tokio::test]
    async fn test_restart_replays_journal() {
        let dir = tempdir().unwrap();
        {
            let (tx, handle) =
                Node::start(dir.path(), Recorder::default(), Duration::from_secs(60)).unwrap();
            propose(&tx, b"a").await;
            snapshot(&tx).await.unwrap();
            propose(&tx, b"b").await;
            propose(&tx, b"c").await;
            drop(tx);
            handle.await.unwrap();
        }

        let (tx, _handle) =
            Node::start(dir.path(), Recorder::default(), Duration::from_secs(60)).unwrap();
        assert_eq!(count(&tx).await, 3);
        assert_eq!(propose(&tx, b"d").await, 4u64.to_be_bytes());
    }

    #[tokio::test]
    async fn test_entries_are_journaled_before_reply() {
        let dir = tempdir().unwrap();
        let (tx, _handle) =
            Node::start(dir.path(), Recorder::default(), Duration::from_secs(60)).unwrap();
        propose(&tx, b"a").await;
        propose(&tx, b"b").await;

        // node still running, journal must already hold both entries
        let mut storage = FileStorage::new(dir.path()).unwrap();
        assert_eq!(storage.snapshot_index(), 0);
        assert_eq!(
            storage.entries_after(0).unwrap(),
            vec![(1, b"a".to_vec()), (2, b"b".to_vec())]
        );
    }

    #[tokio::test]
    async fn test_shutdown_saves_snapshot() {
        let dir = tempdir().unwrap();
        let (tx, handle) =
            Node::start(dir.path(), Recorder::default(), Duration::from_secs(60)).unwrap();
        propose(&tx, b"a").await;
        drop(tx);
        handle.await.unwrap();

        let storage = FileStorage::new(dir.path()).unwrap();
        assert_eq!(storage.snapshot_index(), 1);
    }

    #[tokio::test]
    async fn test_failed_snapshot_keeps_journal() {
        let dir = tempdir().unwrap();
        let recorder = Recorder {
            broken_snapshot: true,
            ..Default::default()
        };
        let (tx, handle) = Node::start(dir.path(), recorder, Duration::from_secs(60)).unwrap();
        propose(&tx, b"a").await;
        propose(&tx, b"b").await;
        assert!(snapshot(&tx).await.is_err());
        drop(tx);
        handle.await.unwrap();

        let mut storage = FileStorage::new(dir.path()).unwrap();
        assert!(storage.load_snapshot().unwrap().is_none());
        assert_eq!(storage.entries_after(0).unwrap().len(), 2);

        let (tx, _handle) =
            Node::start(dir.path(), Recorder::default(), Duration::from_secs(60)).unwrap();
        assert_eq!(count(&tx).await, 2);
    }

    #[tokio::test]
    async fn test_undecodable_snapshot_aborts_start() {
        let dir = tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path()).unwrap();
        storage.append(1, b"a").unwrap();
        storage.save_snapshot(b"garbage".to_vec(), 1).unwrap();
        drop(storage);

        assert!(Node::start(dir.path(), Recorder::default(), Duration::from_secs(60)).is_err());
    }

    #[tokio::test]
    async fn test_journal_failure_is_reported() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("chain");
        let (tx, _handle) =
            Node::start(&base, Recorder::default(), Duration::from_secs(60)).unwrap();
        fs::remove_dir_all(&base).unwrap();

        let (proposal, rx) = Proposal::normal(b"a".to_vec());
        tx.send(proposal).await.unwrap();
        assert!(matches!(rx.await.unwrap(), Err(ChainError::Io(_))));
        // nothing was applied
        assert_eq!(count(&tx).await, 0);
    }
}
