//! Read path: `get()`. Point lookups go to the in-memory index only and
//! never touch the log.

use crate::Engine;

impl Engine {
    /// Looks up a key, returning its current value if present.
    ///
    /// Infallible: the read path performs no I/O.
    #[must_use]
    pub fn get(&self, key: i64) -> Option<&[u8]> {
        self.index.search(&key).map(Vec::as_slice)
    }
}
