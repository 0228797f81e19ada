use anyhow::{ensure, Context, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::format::{crc32, encode_footer, BlockHandle, BLOCK_SIZE, FOOTER_SIZE};

/// Serializes an ordered stream of key/value pairs into a sorted-table
/// file: data blocks, an index block, and the fixed footer.
///
/// The caller must feed keys in strictly increasing order; the builder
/// does not verify this. A builder that is dropped without `finish()`
/// finishes itself (errors swallowed), so the file on disk always ends
/// in a footer.
pub struct SSTableBuilder {
    /// `None` once the file has been closed by `finish`.
    file: Option<File>,
    /// Bytes written so far; equals the final file size after `finish`.
    offset: u64,
    data_block: Vec<u8>,
    index_block: Vec<u8>,
    last_key: Vec<u8>,
    finished: bool,
}

impl SSTableBuilder {
    /// Opens `path` for truncating write.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .with_context(|| {
                format!("failed to create table file {}", path.as_ref().display())
            })?;
        Ok(Self {
            file: Some(file),
            offset: 0,
            data_block: Vec::with_capacity(BLOCK_SIZE + 64),
            index_block: Vec::new(),
            last_key: Vec::new(),
            finished: false,
        })
    }

    /// Appends one entry to the current data block, flushing the block
    /// once it has accumulated [`BLOCK_SIZE`] entry bytes.
    ///
    /// Entry layout: `key_len (u32) | value_len (u32) | key | value`.
    pub fn add(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        ensure!(!self.finished, "add() called after finish()");

        self.data_block
            .extend_from_slice(&(key.len() as u32).to_le_bytes());
        self.data_block
            .extend_from_slice(&(value.len() as u32).to_le_bytes());
        self.data_block.extend_from_slice(key);
        self.data_block.extend_from_slice(value);

        self.last_key.clear();
        self.last_key.extend_from_slice(key);

        if self.data_block.len() >= BLOCK_SIZE {
            self.write_block()?;
        }
        Ok(())
    }

    /// Flushes the buffered data block: appends its CRC trailer, writes
    /// it to the file, and records an index entry
    /// (`last_key_len | last_key | offset | size`) for it.
    fn write_block(&mut self) -> Result<()> {
        if self.data_block.is_empty() {
            return Ok(());
        }

        let crc = crc32(&self.data_block);
        self.data_block.extend_from_slice(&crc.to_le_bytes());

        let handle = BlockHandle {
            offset: self.offset,
            size: self.data_block.len() as u64,
        };
        let file = self.file.as_mut().context("table file already closed")?;
        file.write_all(&self.data_block)?;
        self.offset += handle.size;

        self.index_block
            .extend_from_slice(&(self.last_key.len() as u32).to_le_bytes());
        self.index_block.extend_from_slice(&self.last_key);
        self.index_block.extend_from_slice(&handle.offset.to_le_bytes());
        self.index_block.extend_from_slice(&handle.size.to_le_bytes());

        self.data_block.clear();
        Ok(())
    }

    /// Completes the table: flushes any partial data block, writes the
    /// index block and footer, syncs, and closes the file.
    ///
    /// Fails if called twice. A table with no entries still gets a valid
    /// footer whose index handle is `{0, 0}`.
    pub fn finish(&mut self) -> Result<()> {
        ensure!(!self.finished, "finish() called twice");

        self.write_block()?;

        let mut index_handle = BlockHandle::default();
        if !self.index_block.is_empty() {
            let crc = crc32(&self.index_block);
            self.index_block.extend_from_slice(&crc.to_le_bytes());

            index_handle = BlockHandle {
                offset: self.offset,
                size: self.index_block.len() as u64,
            };
            let file = self.file.as_mut().context("table file already closed")?;
            file.write_all(&self.index_block)?;
            self.offset += index_handle.size;
        }

        let file = self.file.as_mut().context("table file already closed")?;
        file.write_all(&encode_footer(index_handle))?;
        self.offset += FOOTER_SIZE as u64;

        file.flush()?;
        file.sync_all()?;

        self.finished = true;
        self.file = None; // closes the handle
        Ok(())
    }

    /// Bytes written so far (the final file size once finished).
    pub fn file_size(&self) -> u64 {
        self.offset
    }

    pub fn finished(&self) -> bool {
        self.finished
    }
}

/// A builder dropped mid-build still completes the file, so no table is
/// ever left without a footer. Errors here cannot propagate; the caller
/// that cares must call `finish` explicitly.
impl Drop for SSTableBuilder {
    fn drop(&mut self) {
        if !self.finished && self.file.is_some() {
            let _ = self.finish();
        }
    }
}
