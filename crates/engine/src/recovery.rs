//! WAL replay: the cold-start path that rebuilds the index from the
//! durable prefix of the log.

use anyhow::{Context, Result};
use log::{debug, warn};
use skiplist::SkipList;
use std::path::Path;
use wal::{DecodeError, LogRecord, WalReader};

/// Replays a log file into `index`, returning the number of records
/// applied.
///
/// The walk starts at offset 0 and stops at the first frame that is not
/// intact: a torn tail (crash between buffered write and sync) and a
/// checksum or kind failure are both treated as the end of the durable
/// prefix, so no frame after them is applied. Verified records whose key
/// bytes do not parse back into the engine's key type are skipped
/// individually and the walk continues. The log file is never truncated
/// or rewritten here.
///
/// # Errors
///
/// Returns an error only for real I/O failures (the file cannot be
/// opened or read); recovery boundaries are not errors.
pub fn replay_wal_into<P: AsRef<Path>>(
    path: P,
    index: &mut SkipList<i64, Vec<u8>>,
) -> Result<usize> {
    let path = path.as_ref();
    let mut reader = WalReader::open(path)
        .with_context(|| format!("failed to open {} for replay", path.display()))?;

    let mut applied = 0usize;
    loop {
        match reader.read_record() {
            Ok(record) => {
                let Some(key) = parse_key(record.key()) else {
                    warn!(
                        "replay: skipping record with unparseable key ({} bytes)",
                        record.key().len()
                    );
                    continue;
                };
                match record {
                    LogRecord::Put { value, .. } => {
                        index.insert(key, value);
                    }
                    LogRecord::Delete { .. } => {
                        // A delete of an absent key is a no-op, exactly
                        // as it was when first executed.
                        index.remove(&key);
                    }
                }
                applied += 1;
            }
            Err(DecodeError::Eof) => break,
            Err(DecodeError::TornTail) => {
                debug!("replay: torn tail, stopping at last intact record");
                break;
            }
            Err(err @ (DecodeError::ChecksumMismatch { .. } | DecodeError::BadKind(_))) => {
                warn!("replay: {}, stopping at last intact record", err);
                break;
            }
            Err(DecodeError::Io(err)) => {
                return Err(anyhow::Error::new(err)
                    .context(format!("i/o error while replaying {}", path.display())));
            }
        }
    }
    Ok(applied)
}

/// Inverse of the decimal-ASCII key encoding used on the write path.
fn parse_key(bytes: &[u8]) -> Option<i64> {
    std::str::from_utf8(bytes).ok()?.parse().ok()
}
