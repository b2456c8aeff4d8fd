use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

const HEADER_SIZE: u64 = 16; // 8 bytes for start_index + 8 bytes for next_index
const ENTRY_HEADER_SIZE: u64 = 8; // 8 bytes for entry size

/// Append-only journal file holding consecutive entries from `start_index`
#[derive(Debug)]
pub struct Segment {
    file: File,
    start_index: u64,
    next_index: u64,
    path: PathBuf,
    entry_positions: BTreeMap<u64, u64>, // index -> file position
}

#[derive(Debug, Serialize, Deserialize)]
struct SegmentHeader {
    start_index: u64,
    next_index: u64,
}

fn codec_error(e: bincode::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}

impl Segment {
    pub fn new<P: AsRef<Path>>(path: P, start_index: u64) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let mut segment = Segment {
            file,
            start_index,
            next_index: start_index,
            path: path.as_ref().to_path_buf(),
            entry_positions: BTreeMap::new(),
        };

        // Initialize header if file is empty
        if segment.file.metadata()?.len() == 0 {
            segment.write_header()?;
        } else {
            segment.read_header()?;
            segment.rebuild_entry_positions()?;
        }

        Ok(segment)
    }

    fn write_header(&mut self) -> io::Result<()> {
        let header = SegmentHeader {
            start_index: self.start_index,
            next_index: self.next_index,
        };
        let header_bytes = bincode::serialize(&header).map_err(codec_error)?;

        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&header_bytes)?;
        Ok(())
    }

    fn read_header(&mut self) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut header_bytes = vec![0u8; HEADER_SIZE as usize];
        self.file.read_exact(&mut header_bytes)?;

        let header: SegmentHeader = bincode::deserialize(&header_bytes).map_err(codec_error)?;

        self.start_index = header.start_index;
        self.next_index = header.next_index;
        Ok(())
    }

    fn read_entry_header(&mut self) -> io::Result<u64> {
        let mut size_bytes = [0u8; 8];
        self.file.read_exact(&mut size_bytes)?;
        Ok(u64::from_le_bytes(size_bytes))
    }

    /// Rebuilds the index from the file contents. A partially written entry at
    /// the tail is cut off.
    fn rebuild_entry_positions(&mut self) -> io::Result<()> {
        self.entry_positions.clear();
        let len = self.file.metadata()?.len();
        let mut pos = HEADER_SIZE;

        while pos < len {
            if pos + ENTRY_HEADER_SIZE > len {
                break;
            }
            self.file.seek(SeekFrom::Start(pos))?;
            let entry_size = self.read_entry_header()?;
            if pos + ENTRY_HEADER_SIZE + entry_size > len {
                break;
            }
            let entry_index = self.start_index + (self.entry_positions.len() as u64);
            self.entry_positions.insert(entry_index, pos);
            pos += ENTRY_HEADER_SIZE + entry_size;
        }

        if pos < len {
            log::warn!(
                "truncating torn entry at {} in {}",
                pos,
                self.path.display()
            );
            self.file.set_len(pos)?;
        }
        self.next_index = self.start_index + self.entry_positions.len() as u64;
        self.write_header()
    }

    /// Appends one entry and returns its index
    pub fn append(&mut self, entry: &[u8]) -> io::Result<u64> {
        let pos = self.file.seek(SeekFrom::End(0))?;
        self.file.write_all(&(entry.len() as u64).to_le_bytes())?;
        self.file.write_all(entry)?;

        let entry_index = self.next_index;
        self.entry_positions.insert(entry_index, pos);
        self.next_index += 1;

        self.write_header()?;
        self.file.sync_data()?;
        Ok(entry_index)
    }

    pub fn read_entry(&mut self, index: u64) -> io::Result<Vec<u8>> {
        if index < self.start_index || index >= self.next_index {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Index out of range",
            ));
        }

        let pos = *self.entry_positions.get(&index).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "Entry position not found")
        })?;

        self.file.seek(SeekFrom::Start(pos))?;
        let entry_size = self.read_entry_header()?;

        let mut entry = vec![0u8; entry_size as usize];
        self.file.read_exact(&mut entry)?;
        Ok(entry)
    }

    pub fn get_start_index(&self) -> u64 {
        self.start_index
    }

    /// Index the next appended entry will get
    pub fn get_next_index(&self) -> u64 {
        self.next_index
    }

    pub fn len(&self) -> u64 {
        self.next_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.next_index == self.start_index
    }

    /// Deletes the segment file
    pub fn remove(self) -> io::Result<()> {
        let path = self.path.clone();
        drop(self.file);
        fs::remove_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_segment_creation() {
        let temp_file = NamedTempFile::new().unwrap();
        let segment = Segment::new(temp_file.path(), 1).unwrap();

        assert_eq!(segment.get_start_index(), 1);
        assert_eq!(segment.get_next_index(), 1);
        assert!(segment.is_empty());
    }

    #[test]
    fn test_segment_append() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut segment = Segment::new(temp_file.path(), 1).unwrap();

        assert_eq!(segment.append(b"first entry").unwrap(), 1);
        assert_eq!(segment.append(b"second entry").unwrap(), 2);

        assert_eq!(segment.get_next_index(), 3);
        assert_eq!(segment.len(), 2);
        assert!(!segment.is_empty());

        assert_eq!(segment.read_entry(1).unwrap(), b"first entry");
        assert_eq!(segment.read_entry(2).unwrap(), b"second entry");
        assert!(segment.read_entry(3).is_err());
        assert!(segment.read_entry(0).is_err());
    }

    #[test]
    fn test_segment_reopen() {
        let temp_file = NamedTempFile::new().unwrap();
        {
            let mut segment = Segment::new(temp_file.path(), 5).unwrap();
            segment.append(b"a").unwrap();
            segment.append(b"bb").unwrap();
        }

        let mut segment = Segment::new(temp_file.path(), 5).unwrap();
        assert_eq!(segment.get_next_index(), 7);
        assert_eq!(segment.read_entry(6).unwrap(), b"bb");
    }

    #[test]
    fn test_segment_torn_tail() {
        let temp_file = NamedTempFile::new().unwrap();
        {
            let mut segment = Segment::new(temp_file.path(), 1).unwrap();
            segment.append(b"complete").unwrap();
        }
        {
            // size header promising more bytes than were written
            let mut file = OpenOptions::new()
                .append(true)
                .open(temp_file.path())
                .unwrap();
            file.write_all(&100u64.to_le_bytes()).unwrap();
            file.write_all(b"short").unwrap();
        }

        let mut segment = Segment::new(temp_file.path(), 1).unwrap();
        assert_eq!(segment.get_next_index(), 2);
        assert_eq!(segment.read_entry(1).unwrap(), b"complete");
        assert_eq!(segment.append(b"next").unwrap(), 2);
        assert_eq!(segment.read_entry(2).unwrap(), b"next");
    }
}
