use crate::error::ChainError;
use crate::executor::segment::Segment;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const SEGMENT_ENTRIES: u64 = 100_000; // entries per journal file
const SNAPSHOT_FILE: &str = "snapshot";
const SNAPSHOT_TMP_FILE: &str = "snapshot.tmp";

/// Persisted state machine snapshot
#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotFile {
    /// Last journal index included in `data`
    pub index: u64,
    pub data: Vec<u8>,
}

/// Journal segments plus the latest snapshot, kept under one directory
pub struct FileStorage {
    segments: BTreeMap<u64, Segment>,
    base_path: PathBuf,
    snapshot_index: u64,
    last_index: u64,
}

fn segment_start(path: &Path) -> Option<u64> {
    path.file_name()?
        .to_str()?
        .strip_prefix("journal_")?
        .strip_suffix(".log")?
        .parse()
        .ok()
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, ChainError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;

        let snapshot_index = match Self::read_snapshot(&base_path)? {
            Some(snapshot) => snapshot.index,
            None => 0,
        };

        let mut segments = BTreeMap::new();
        for entry in fs::read_dir(&base_path)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if let Some(start_index) = segment_start(&path) {
                let segment = Segment::new(&path, start_index)?;
                segments.insert(start_index, segment);
            }
        }

        let last_index = segments
            .values()
            .next_back()
            .map(|s| s.get_next_index().saturating_sub(1))
            .unwrap_or(0)
            .max(snapshot_index);

        log::info!(
            "storage opened at {}: snapshot index {}, last index {}, {} segments",
            base_path.display(),
            snapshot_index,
            last_index,
            segments.len()
        );

        Ok(FileStorage {
            segments,
            base_path,
            snapshot_index,
            last_index,
        })
    }

    fn read_snapshot(base_path: &Path) -> Result<Option<SnapshotFile>, ChainError> {
        let snapshot_path = base_path.join(SNAPSHOT_FILE);
        if !snapshot_path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&snapshot_path)?;
        Ok(Some(bincode::deserialize(&bytes)?))
    }

    pub fn load_snapshot(&self) -> Result<Option<SnapshotFile>, ChainError> {
        Self::read_snapshot(&self.base_path)
    }

    pub fn snapshot_index(&self) -> u64 {
        self.snapshot_index
    }

    /// Index of the latest journaled or snapshotted entry
    pub fn last_index(&self) -> u64 {
        self.last_index
    }

    fn get_segment_path(&self, start_index: u64) -> PathBuf {
        self.base_path.join(format!("journal_{}.log", start_index))
    }

    /// Journaled entries with an index above `index`, in order
    pub fn entries_after(&mut self, index: u64) -> Result<Vec<(u64, Vec<u8>)>, ChainError> {
        let mut entries = Vec::new();
        for segment in self.segments.values_mut() {
            let from = segment.get_start_index().max(index + 1);
            for i in from..segment.get_next_index() {
                entries.push((i, segment.read_entry(i)?));
            }
        }
        Ok(entries)
    }

    /// Journals `data` at `index`, which must directly follow the last index
    pub fn append(&mut self, index: u64, data: &[u8]) -> Result<(), ChainError> {
        if index != self.last_index + 1 {
            return Err(ChainError::OutOfOrder {
                expected: self.last_index + 1,
                got: index,
            });
        }

        let needs_segment = match self.segments.values().next_back() {
            Some(segment) => segment.len() >= SEGMENT_ENTRIES,
            None => true,
        };
        if needs_segment {
            let segment = Segment::new(self.get_segment_path(index), index)?;
            self.segments.insert(index, segment);
        }

        if let Some(segment) = self.segments.values_mut().next_back() {
            segment.append(data)?;
        }
        self.last_index = index;
        Ok(())
    }

    /// Writes a snapshot covering everything up to `applied` and drops the
    /// journal segments it makes redundant
    pub fn save_snapshot(&mut self, data: Vec<u8>, applied: u64) -> Result<(), ChainError> {
        let snapshot_path = self.base_path.join(SNAPSHOT_FILE);
        let temp_path = self.base_path.join(SNAPSHOT_TMP_FILE);
        let bytes = bincode::serialize(&SnapshotFile {
            index: applied,
            data,
        })?;

        // Write to temporary file first
        fs::write(&temp_path, &bytes)?;
        fs::rename(&temp_path, &snapshot_path)?;
        self.snapshot_index = applied;

        let covered: Vec<u64> = self
            .segments
            .iter()
            .filter(|(_, segment)| segment.get_next_index() <= applied + 1)
            .map(|(start, _)| *start)
            .collect();
        for start_index in covered {
            if let Some(segment) = self.segments.remove(&start_index) {
                segment.remove()?;
            }
        }
        Ok(())
    }
}
