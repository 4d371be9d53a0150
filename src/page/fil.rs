use serde::{Deserialize, Serialize};

use crate::types::{
    error::Result, Lsn, PageNo, SpaceId, FIL_NULL, FIL_TRAILER_SIZE, PAGE_SIZE,
};
use crate::utils::bytes::{read_u16_be, read_u32_be, read_u64_be};

/// Page types we classify. Everything else is carried through as `Other`
/// so callers can still report the raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageType {
    Allocated,
    UndoLog,
    Sdi,
    Index,
    Other(u16),
}

pub const PAGE_TYPE_INDEX: u16 = 17855; // 0x45BF, B-tree node
pub const PAGE_TYPE_SDI: u16 = 17853;
pub const PAGE_TYPE_UNDO_LOG: u16 = 2;

impl PageType {
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0 => PageType::Allocated,
            PAGE_TYPE_UNDO_LOG => PageType::UndoLog,
            PAGE_TYPE_SDI => PageType::Sdi,
            PAGE_TYPE_INDEX => PageType::Index,
            other => PageType::Other(other),
        }
    }

    pub fn as_raw(&self) -> u16 {
        match self {
            PageType::Allocated => 0,
            PageType::UndoLog => PAGE_TYPE_UNDO_LOG,
            PageType::Sdi => PAGE_TYPE_SDI,
            PageType::Index => PAGE_TYPE_INDEX,
            PageType::Other(raw) => *raw,
        }
    }
}

/// The 38-byte envelope head on every page. `prev` / `next` are absent
/// when the raw field is 0xFFFFFFFF; this is the only signal marking a
/// page with no neighbor on that side.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FilHeader {
    pub checksum: u32,
    /// Page number as recorded on disk. Callers may verify it against the
    /// page number they asked for.
    pub page_no: PageNo,
    pub prev: Option<PageNo>,
    pub next: Option<PageNo>,
    pub last_mod_lsn: Lsn,
    pub page_type: PageType,
    pub flush_lsn: Lsn,
    pub space_id: SpaceId,
}

impl FilHeader {
    pub fn parse(page: &[u8], _page_no: PageNo) -> Result<Self> {
        let checksum = read_u32_be(page, 0)?;
        let page_no = read_u32_be(page, 4)?;
        let prev = read_u32_be(page, 8)?;
        let next = read_u32_be(page, 12)?;
        let last_mod_lsn = read_u64_be(page, 16)?;
        let page_type = read_u16_be(page, 24)?;
        let flush_lsn = read_u64_be(page, 26)?;
        let space_id = read_u32_be(page, 34)?;
        Ok(FilHeader {
            checksum,
            page_no,
            prev: (prev != FIL_NULL).then_some(prev),
            next: (next != FIL_NULL).then_some(next),
            last_mod_lsn,
            page_type: PageType::from_raw(page_type),
            flush_lsn,
            space_id,
        })
    }
}

/// The 8-byte envelope tail: old-format checksum plus the low 32 bits of
/// the header LSN, which must agree with `FilHeader::last_mod_lsn`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FilTrailer {
    pub old_checksum: u32,
    pub low32_lsn: u32,
}

impl FilTrailer {
    pub fn parse(page: &[u8], _page_no: PageNo) -> Result<Self> {
        let off = PAGE_SIZE - FIL_TRAILER_SIZE;
        let old_checksum = read_u32_be(page, off)?;
        let low32_lsn = read_u32_be(page, off + 4)?;
        Ok(FilTrailer {
            old_checksum,
            low32_lsn,
        })
    }
}
