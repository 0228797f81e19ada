//! # WAL — Write-Ahead Log
//!
//! Framed, checksummed, append-only binary log records, plus the file
//! plumbing to write and replay them.
//!
//! Every mutation (`PUT` or `DELETE`) is serialized into a frame and
//! appended to the log **before** the corresponding in-memory update. On
//! restart the log is replayed to reconstruct the index, guaranteeing
//! that no acknowledged write is lost.
//!
//! ## Frame Format
//!
//! ```text
//! [checksum: u32 LE][key_len: u32 LE][value_len: u32 LE][kind: u8][key][value]
//! ```
//!
//! `kind` is 0 for Put, 1 for Delete (Delete frames carry `value_len = 0`).
//! The checksum is a CRC-32 (reflected IEEE 802.3 polynomial, the one
//! `crc32fast` implements) over everything after itself: `key_len`
//! through the last value byte. The log is a plain concatenation of
//! frames; anything after the last complete frame is a torn tail.
//!
//! ## Example
//!
//! ```rust,no_run
//! use wal::{WalWriter, WalReader, LogRecord};
//!
//! let mut w = WalWriter::create("wal.log", true).unwrap();
//! w.append(&LogRecord::Put {
//!     key: b"hello".to_vec(),
//!     value: b"world".to_vec(),
//! }).unwrap();
//! drop(w);
//!
//! let mut r = WalReader::open("wal.log").unwrap();
//! while let Ok(rec) = r.read_record() {
//!     println!("{:?}", rec);
//! }
//! ```

use byteorder::{LittleEndian, ReadBytesExt};
use crc32fast::Hasher as Crc32;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

use thiserror::Error;

/// Frame header: checksum (4) + key_len (4) + value_len (4) + kind (1).
pub const HEADER_SIZE: usize = 13;

const CHECKSUM_SIZE: usize = 4;

/// `kind` byte for a Put frame.
pub const KIND_PUT: u8 = 0;
/// `kind` byte for a Delete frame.
pub const KIND_DELETE: u8 = 1;

/// A single log record representing either a key-value insertion or a
/// deletion. Key and value are opaque byte sequences; the engine decides
/// how its key type maps onto them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord {
    /// A key-value insertion or update.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// A key deletion.
    Delete { key: Vec<u8> },
}

impl LogRecord {
    /// The on-disk `kind` byte.
    pub fn kind(&self) -> u8 {
        match self {
            LogRecord::Put { .. } => KIND_PUT,
            LogRecord::Delete { .. } => KIND_DELETE,
        }
    }

    pub fn key(&self) -> &[u8] {
        match self {
            LogRecord::Put { key, .. } => key,
            LogRecord::Delete { key } => key,
        }
    }

    /// The value bytes; empty for Delete.
    pub fn value(&self) -> &[u8] {
        match self {
            LogRecord::Put { value, .. } => value,
            LogRecord::Delete { .. } => &[],
        }
    }
}

/// Why decoding a frame stopped or failed.
///
/// `Eof` and `TornTail` are legitimate recovery boundaries, not
/// corruption: `Eof` is a clean end of stream between frames, `TornTail`
/// is the leftover of a crash between buffered write and sync.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Clean end of stream before any byte of a new frame.
    #[error("end of log")]
    Eof,

    /// A partial frame at the end of the stream: fewer than
    /// [`HEADER_SIZE`] header bytes, or a body shorter than the header
    /// declared.
    #[error("torn frame at end of log")]
    TornTail,

    /// The recomputed CRC differs from the stored one.
    #[error("checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { stored: u32, computed: u32 },

    /// A well-checksummed frame with an unknown kind byte.
    #[error("unknown record kind {0}")]
    BadKind(u8),

    /// An underlying I/O error other than end-of-file.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Computes the CRC-32 of `data` (reflected polynomial 0xEDB88320,
/// initial value and final XOR 0xFFFFFFFF).
///
/// `crc32(b"") == 0` and `crc32(b"123456789") == 0xCBF43926`.
pub fn crc32(data: &[u8]) -> u32 {
    let mut hasher = Crc32::new();
    hasher.update(data);
    hasher.finalize()
}

/// Encodes `record` into a freshly allocated frame.
pub fn encode(record: &LogRecord) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + record.key().len() + record.value().len());
    encode_into(record, &mut buf);
    buf
}

/// Encodes `record` into `buf`, clearing it first. Lets a writer reuse
/// one scratch buffer across appends.
pub fn encode_into(record: &LogRecord, buf: &mut Vec<u8>) {
    let (key, value) = (record.key(), record.value());

    buf.clear();
    buf.extend_from_slice(&[0u8; CHECKSUM_SIZE]);
    buf.extend_from_slice(&(key.len() as u32).to_le_bytes());
    buf.extend_from_slice(&(value.len() as u32).to_le_bytes());
    buf.push(record.kind());
    buf.extend_from_slice(key);
    buf.extend_from_slice(value);

    let crc = crc32(&buf[CHECKSUM_SIZE..]);
    buf[..CHECKSUM_SIZE].copy_from_slice(&crc.to_le_bytes());
}

/// Decodes one frame from `reader`.
///
/// Consumes [`HEADER_SIZE`] bytes of header, then `key_len + value_len`
/// bytes of body, verifies the checksum, and validates the kind byte.
/// The checksum is verified before the kind, so a corrupted kind byte
/// reports [`DecodeError::ChecksumMismatch`]; [`DecodeError::BadKind`]
/// means a writer produced a frame this version does not understand.
pub fn decode_from<R: Read>(reader: &mut R) -> Result<LogRecord, DecodeError> {
    let mut header = [0u8; HEADER_SIZE];
    let got = read_available(reader, &mut header)?;
    if got == 0 {
        return Err(DecodeError::Eof);
    }
    if got < HEADER_SIZE {
        return Err(DecodeError::TornTail);
    }

    let mut h = &header[..];
    let stored = h.read_u32::<LittleEndian>()?;
    let key_len = h.read_u32::<LittleEndian>()? as usize;
    let value_len = h.read_u32::<LittleEndian>()? as usize;
    let kind = h.read_u8()?;

    // Bounded read instead of an upfront allocation of the declared
    // length: a torn or corrupt header must not trigger a huge reserve.
    let body_len = key_len + value_len;
    let mut body = Vec::with_capacity(body_len.min(1 << 20));
    let read = reader.by_ref().take(body_len as u64).read_to_end(&mut body)?;
    if read < body_len {
        return Err(DecodeError::TornTail);
    }

    let mut hasher = Crc32::new();
    hasher.update(&header[CHECKSUM_SIZE..]);
    hasher.update(&body);
    let computed = hasher.finalize();
    if computed != stored {
        return Err(DecodeError::ChecksumMismatch { stored, computed });
    }

    match kind {
        KIND_PUT => {
            let value = body.split_off(key_len);
            Ok(LogRecord::Put { key: body, value })
        }
        KIND_DELETE => {
            body.truncate(key_len);
            Ok(LogRecord::Delete { key: body })
        }
        other => Err(DecodeError::BadKind(other)),
    }
}

/// Reads until `buf` is full or the stream ends, returning the number of
/// bytes read. A short count therefore distinguishes a torn tail from a
/// clean EOF without treating either as an I/O error.
fn read_available<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, DecodeError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(DecodeError::Io(e)),
        }
    }
    Ok(filled)
}

/// Append-only log writer.
///
/// Records are serialized into a reusable in-memory buffer and written
/// with a single `write_all` call, then flushed. When `sync` is `true`,
/// every append additionally calls `sync_all()` (fsync) so the frame is
/// durable on media before the call returns.
pub struct WalWriter {
    file: File,
    sync: bool,
    /// Reusable scratch buffer to avoid allocation on every append.
    buf: Vec<u8>,
}

impl WalWriter {
    /// Opens (or creates) a log file in append mode.
    ///
    /// # Arguments
    ///
    /// * `path` - file system path for the log (created if absent).
    /// * `sync` - if true, every `append` call is followed by fsync.
    pub fn create<P: AsRef<Path>>(path: P, sync: bool) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file,
            sync,
            buf: Vec::with_capacity(256),
        })
    }

    /// Serializes `record` and appends the frame to the log.
    ///
    /// Callers enforce log-then-apply by mutating their in-memory state
    /// only after this returns `Ok`.
    pub fn append(&mut self, record: &LogRecord) -> io::Result<()> {
        if record.key().len() > u32::MAX as usize || record.value().len() > u32::MAX as usize {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "record key or value exceeds u32::MAX bytes",
            ));
        }

        encode_into(record, &mut self.buf);

        self.file.write_all(&self.buf)?;
        self.file.flush()?;
        if self.sync {
            self.file.sync_all()?;
        }
        Ok(())
    }

    /// Forces all buffered data to stable media via `sync_all()`.
    ///
    /// Useful when `sync` is `false` (batched mode) and the caller wants
    /// durability at a specific point.
    pub fn sync_to_disk(&mut self) -> io::Result<()> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }
}

/// Sequential frame reader.
///
/// Generic over any `Read` implementor, so it works against real files
/// (`WalReader<File>`) or in-memory buffers in tests. The reader is pure
/// mechanism: it reports each frame outcome and leaves the recovery
/// policy (where to stop, what to skip) to the caller.
pub struct WalReader<R: Read> {
    rdr: BufReader<R>,
}

impl WalReader<File> {
    /// Opens an existing log file for sequential replay.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<WalReader<File>> {
        let f = File::open(path)?;
        Ok(WalReader {
            rdr: BufReader::new(f),
        })
    }
}

impl<R: Read> WalReader<R> {
    /// Constructs a reader from any `Read` implementor.
    pub fn from_reader(reader: R) -> Self {
        WalReader {
            rdr: BufReader::new(reader),
        }
    }

    /// Reads the next frame, verifying its checksum.
    pub fn read_record(&mut self) -> Result<LogRecord, DecodeError> {
        decode_from(&mut self.rdr)
    }
}
