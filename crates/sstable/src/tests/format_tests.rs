use crate::format::{encode_footer, read_footer, BlockHandle, FOOTER_SIZE, TABLE_MAGIC};
use std::io::Cursor;

#[test]
fn footer_layout() {
    let handle = BlockHandle {
        offset: 0x1122334455667788,
        size: 0x99AABBCCDDEEFF00,
    };
    let footer = encode_footer(handle);

    // metaindex handle is reserved and zero-filled
    assert_eq!(&footer[..20], &[0u8; 20]);
    assert_eq!(&footer[20..28], &handle.offset.to_le_bytes());
    assert_eq!(&footer[28..36], &handle.size.to_le_bytes());
    // 4 bytes of handle padding
    assert_eq!(&footer[36..40], &[0u8; 4]);
    assert_eq!(&footer[40..48], &TABLE_MAGIC.to_le_bytes());
}

#[test]
fn footer_roundtrip() {
    let handle = BlockHandle {
        offset: 4096,
        size: 321,
    };
    let mut file = Vec::new();
    file.extend_from_slice(&[0xAB; 4417]); // stand-in for blocks
    file.extend_from_slice(&encode_footer(handle));

    let decoded = read_footer(&mut Cursor::new(file)).unwrap();
    assert_eq!(decoded, handle);
}

#[test]
fn read_footer_rejects_short_file() {
    let mut cursor = Cursor::new(vec![0u8; FOOTER_SIZE - 1]);
    assert!(read_footer(&mut cursor).is_err());
}

#[test]
fn read_footer_rejects_bad_magic() {
    let mut footer = encode_footer(BlockHandle::default());
    footer[47] ^= 0xFF;
    let mut cursor = Cursor::new(footer.to_vec());
    assert!(read_footer(&mut cursor).is_err());
}
