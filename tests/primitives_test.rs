use ibdecode::types::error::PageError;
use ibdecode::utils::bytes::{read_u16_be, read_u24_be, read_u32_be, read_u64_be};

#[test]
fn test_big_endian_reads() {
    let buf = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09];

    assert_eq!(read_u16_be(&buf, 0).unwrap(), 0x0102);
    assert_eq!(read_u16_be(&buf, 3).unwrap(), 0x0405);
    assert_eq!(read_u24_be(&buf, 0).unwrap(), 0x010203);
    assert_eq!(read_u32_be(&buf, 0).unwrap(), 0x01020304);
    assert_eq!(read_u32_be(&buf, 5).unwrap(), 0x06070809);
    assert_eq!(read_u64_be(&buf, 1).unwrap(), 0x0203040506070809);
}

#[test]
fn test_reads_at_exact_boundary() {
    let buf = [0xAB, 0xCD];
    assert_eq!(read_u16_be(&buf, 0).unwrap(), 0xABCD);

    let buf = [0u8; 8];
    assert_eq!(read_u64_be(&buf, 0).unwrap(), 0);
}

#[test]
fn test_out_of_bounds_reads() {
    let buf = [0u8; 4];

    assert!(matches!(
        read_u16_be(&buf, 3),
        Err(PageError::OutOfBounds {
            offset: 3,
            width: 2,
            ..
        })
    ));
    assert!(matches!(
        read_u32_be(&buf, 1),
        Err(PageError::OutOfBounds { .. })
    ));
    assert!(matches!(
        read_u64_be(&buf, 0),
        Err(PageError::OutOfBounds { .. })
    ));

    // Offset entirely past the end
    assert!(matches!(
        read_u16_be(&buf, 100),
        Err(PageError::OutOfBounds { .. })
    ));
}
