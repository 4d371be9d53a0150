use serde::Serialize;

use crate::types::{error::Result, PageNo, SpaceId};
use crate::utils::bytes::{read_u16_be, read_u32_be};

/// Pointer to a file-segment inode entry. Opaque to the record decoder.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct InodePointer {
    pub space_id: SpaceId,
    pub page_no: PageNo,
    pub offset: u16,
}

/// The 20-byte file-segment header following the index header. Only the
/// index root carries real values; other pages leave it zero-filled.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FsegHeader {
    pub leaf: InodePointer,
    pub non_leaf: InodePointer,
}

impl FsegHeader {
    pub fn parse(page: &[u8], off: usize) -> Result<Self> {
        let leaf = InodePointer {
            space_id: read_u32_be(page, off)?,
            page_no: read_u32_be(page, off + 4)?,
            offset: read_u16_be(page, off + 8)?,
        };
        let non_leaf = InodePointer {
            space_id: read_u32_be(page, off + 10)?,
            page_no: read_u32_be(page, off + 14)?,
            offset: read_u16_be(page, off + 18)?,
        };
        Ok(FsegHeader { leaf, non_leaf })
    }
}
