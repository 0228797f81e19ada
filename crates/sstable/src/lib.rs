//! # SSTable — Sorted String Table
//!
//! Immutable, on-disk storage files produced by externalizing the
//! in-memory index. SSTables are *write-once, read-many* — once built
//! they are never modified.
//!
//! ## File layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ DATA BLOCK 0                                                 │
//! │   key_len (u32) | value_len (u32) | key | value              │
//! │   ... entries until the block reaches 4096 bytes ...         │
//! │   crc32 (u32) over the entry bytes                           │
//! ├──────────────────────────────────────────────────────────────┤
//! │ DATA BLOCK 1 ... DATA BLOCK n (last block may be short)      │
//! ├──────────────────────────────────────────────────────────────┤
//! │ INDEX BLOCK                                                  │
//! │   last_key_len (u32) | last_key | offset (u64) | size (u64)  │
//! │   ... one entry per data block, in write order ...           │
//! │   crc32 (u32) over the entry bytes                           │
//! ├──────────────────────────────────────────────────────────────┤
//! │ FOOTER (always last 48 bytes)                                │
//! │   metaindex handle (20 B, zero-filled)                       │
//! │   index handle (offset u64 | size u64 | 4 B padding)         │
//! │   magic (u64 LE) = 0xdb4775248b80fb57                        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! All integers are little-endian. Readers locate the index by loading
//! the last 48 bytes, checking the magic, and decoding the index handle.

mod builder;
mod format;

pub use builder::SSTableBuilder;
pub use format::{
    crc32, read_footer, BlockHandle, BLOCK_HANDLE_SIZE, BLOCK_SIZE, FOOTER_SIZE, TABLE_MAGIC,
};

#[cfg(test)]
mod tests;
