use byteorder::{LittleEndian, ReadBytesExt};
use crc32fast::Hasher as Crc32;
use std::io::{self, Read, Seek, SeekFrom};

/// A data block is flushed once its buffered entry bytes reach this size.
pub const BLOCK_SIZE: usize = 4096;

/// Fixed footer length: two 20-byte block handles plus the 8-byte magic.
pub const FOOTER_SIZE: usize = 48;

/// Encoded length of a [`BlockHandle`]: offset + size + 4 bytes padding.
pub const BLOCK_HANDLE_SIZE: usize = 20;

/// Identifies a well-formed sorted table ("DB" plus random bits, so a
/// foreign file is rejected before any structural decoding).
pub const TABLE_MAGIC: u64 = 0xdb4775248b80fb57;

/// Locates a block inside the table file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockHandle {
    pub offset: u64,
    pub size: u64,
}

/// Computes the CRC-32 used for block and frame trailers (reflected
/// IEEE polynomial, as implemented by `crc32fast`).
pub fn crc32(data: &[u8]) -> u32 {
    let mut hasher = Crc32::new();
    hasher.update(data);
    hasher.finalize()
}

/// Assembles the fixed 48-byte footer.
///
/// Bytes 0..20 are the metaindex handle, zero-filled until metaindex
/// content exists. Bytes 20..40 encode `index_handle`, bytes 40..48 the
/// magic.
pub fn encode_footer(index_handle: BlockHandle) -> [u8; FOOTER_SIZE] {
    let mut footer = [0u8; FOOTER_SIZE];
    footer[20..28].copy_from_slice(&index_handle.offset.to_le_bytes());
    footer[28..36].copy_from_slice(&index_handle.size.to_le_bytes());
    footer[40..48].copy_from_slice(&TABLE_MAGIC.to_le_bytes());
    footer
}

/// Reads and validates the footer at the end of `r`, returning the
/// decoded index handle.
///
/// Fails with `InvalidData` if the file is shorter than a footer or the
/// magic does not match.
pub fn read_footer<R: Read + Seek>(r: &mut R) -> io::Result<BlockHandle> {
    let file_size = r.seek(SeekFrom::End(0))?;
    if file_size < FOOTER_SIZE as u64 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "file shorter than a table footer",
        ));
    }

    r.seek(SeekFrom::Start(file_size - FOOTER_SIZE as u64))?;
    let mut footer = [0u8; FOOTER_SIZE];
    r.read_exact(&mut footer)?;

    let mut handle_bytes = &footer[BLOCK_HANDLE_SIZE..];
    let offset = handle_bytes.read_u64::<LittleEndian>()?;
    let size = handle_bytes.read_u64::<LittleEndian>()?;

    let mut magic_bytes = &footer[FOOTER_SIZE - 8..];
    let magic = magic_bytes.read_u64::<LittleEndian>()?;
    if magic != TABLE_MAGIC {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "bad table magic",
        ));
    }

    Ok(BlockHandle { offset, size })
}
