//! Write path: `put()` and `delete()`.
//!
//! Both mutations follow the same durability rule, log-then-apply: the
//! record is appended to the WAL and synced to media first, and only a
//! fully durable record is applied to the index. An I/O failure anywhere
//! in the log step aborts the operation with the index untouched.

use anyhow::Result;
use wal::LogRecord;

use crate::Engine;

impl Engine {
    /// Inserts or updates a key-value pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the WAL append, flush, or sync fails; the
    /// index is not modified in that case.
    pub fn put(&mut self, key: i64, value: Vec<u8>) -> Result<()> {
        let record = LogRecord::Put {
            key: encode_key(key),
            value: value.clone(),
        };
        self.wal.append(&record)?;

        self.index.insert(key, value);
        Ok(())
    }

    /// Deletes a key, returning whether it was present.
    ///
    /// The tombstone record is logged unconditionally — also for absent
    /// keys — so replay reproduces the exact operation sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if the WAL append, flush, or sync fails; the
    /// index is not modified in that case.
    pub fn delete(&mut self, key: i64) -> Result<bool> {
        let record = LogRecord::Delete {
            key: encode_key(key),
        };
        self.wal.append(&record)?;

        Ok(self.index.remove(&key))
    }
}

/// Decimal-ASCII byte encoding of an integer key. Injective, and the
/// replay parser is its exact inverse.
pub(crate) fn encode_key(key: i64) -> Vec<u8> {
    key.to_string().into_bytes()
}
