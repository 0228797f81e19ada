//! # Engine — Crash-Consistent Key-Value Store
//!
//! Binds the ordered in-memory index ([`skiplist`]) to a durable
//! write-ahead log ([`wal`]) under a single data directory.
//!
//! ## Architecture
//!
//! ```text
//! Client
//!   |
//!   v
//! ┌───────────────────────────────────────────────┐
//! │                   ENGINE                      │
//! │                                               │
//! │ write.rs → WAL append + fsync → index insert  │
//! │                                               │
//! │ read.rs  → index search (no I/O)              │
//! │                                               │
//! │ recovery.rs → on open: replay wal.log into a  │
//! │               fresh index, stop at the first  │
//! │               torn or corrupt frame           │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Durability contract
//!
//! Every mutation is framed, appended to `wal.log`, flushed, and synced
//! to media **before** the index is touched (log-then-apply). If any of
//! those steps fails the operation fails without mutating the index.
//! Once the sync succeeds the record is recoverable across a process or
//! OS crash: reopening the directory replays the durable prefix of the
//! log in order.
//!
//! The engine is single-writer and externally synchronized; it performs
//! no internal locking.

mod read;
mod recovery;
mod write;

use anyhow::Result;
use log::info;
use skiplist::SkipList;
use std::path::{Path, PathBuf};
use wal::WalWriter;

pub use recovery::replay_wal_into;

/// Name of the write-ahead log inside the data directory.
pub const WAL_FILE_NAME: &str = "wal.log";

/// Height cap of the store-facing index instance.
pub const INDEX_MAX_LEVEL: usize = 6;

/// The store engine: an ordered index fronted by a write-ahead log.
///
/// Keys are `i64`; on disk they travel as their decimal-ASCII bytes, an
/// injective encoding that replay inverts. Values are opaque bytes.
pub struct Engine {
    pub(crate) index: SkipList<i64, Vec<u8>>,
    pub(crate) data_dir: PathBuf,
    pub(crate) wal_path: PathBuf,
    pub(crate) wal: WalWriter,
}

impl Engine {
    /// Opens a store rooted at `dir`, creating the directory (and its
    /// parents) if needed.
    ///
    /// If a non-empty `wal.log` exists its records are replayed into the
    /// index before the log is reopened for append; see
    /// [`replay_wal_into`] for the recovery boundary rules.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let data_dir = dir.as_ref().to_path_buf();
        if !data_dir.exists() {
            std::fs::create_dir_all(&data_dir)?;
            info!("engine: created data directory {}", data_dir.display());
        }

        let wal_path = data_dir.join(WAL_FILE_NAME);

        // Replay must finish before the append handle is opened (file
        // sharing on Windows).
        let mut index = SkipList::new(INDEX_MAX_LEVEL);
        if wal_path.exists() {
            let applied = recovery::replay_wal_into(&wal_path, &mut index)?;
            info!(
                "engine: replayed {} record(s) from {}",
                applied,
                wal_path.display()
            );
        }

        let wal = WalWriter::create(&wal_path, true)?;

        Ok(Self {
            index,
            data_dir,
            wal_path,
            wal,
        })
    }

    /// Number of live keys in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Path of the write-ahead log owned by this engine.
    #[must_use]
    pub fn wal_path(&self) -> &Path {
        &self.wal_path
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("data_dir", &self.data_dir)
            .field("wal_path", &self.wal_path)
            .field("index_entries", &self.index.len())
            .field("index_level", &self.index.current_level())
            .finish()
    }
}
