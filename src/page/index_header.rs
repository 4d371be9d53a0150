use serde::{Deserialize, Serialize};

use crate::types::{error::Result, IndexId, PageNo};
use crate::utils::bytes::{read_u16_be, read_u64_be};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageFormat {
    Redundant,
    Compact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageDirection {
    Left,
    Right,
    SameRec,
    SamePage,
    NoDirection,
    Other(u16),
}

impl PageDirection {
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            1 => PageDirection::Left,
            2 => PageDirection::Right,
            3 => PageDirection::SameRec,
            4 => PageDirection::SamePage,
            5 => PageDirection::NoDirection,
            other => PageDirection::Other(other),
        }
    }
}

/// The 36-byte index header at offset 38. The row-format flag hides in
/// the high bit of the heap-record count.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct IndexHeader {
    pub num_dir_slots: u16,
    pub heap_top: u16,
    /// Low 15 bits of the flag word
    pub num_heap_recs: u16,
    pub format: PageFormat,
    pub first_garbage_off: u16,
    pub garbage_space: u16,
    pub last_insert_pos: u16,
    pub direction: PageDirection,
    pub num_inserts_in_direction: u16,
    pub num_user_recs: u16,
    pub max_trx_id: u64,
    /// 0 means leaf
    pub page_level: u16,
    pub index_id: IndexId,
}

impl IndexHeader {
    pub fn parse(page: &[u8], off: usize, _page_no: PageNo) -> Result<Self> {
        let num_dir_slots = read_u16_be(page, off)?;
        let heap_top = read_u16_be(page, off + 2)?;
        let flag = read_u16_be(page, off + 4)?;
        let first_garbage_off = read_u16_be(page, off + 6)?;
        let garbage_space = read_u16_be(page, off + 8)?;
        let last_insert_pos = read_u16_be(page, off + 10)?;
        let direction = read_u16_be(page, off + 12)?;
        let num_inserts_in_direction = read_u16_be(page, off + 14)?;
        let num_user_recs = read_u16_be(page, off + 16)?;
        let max_trx_id = read_u64_be(page, off + 18)?;
        let page_level = read_u16_be(page, off + 26)?;
        let index_id = read_u64_be(page, off + 28)?;

        let format = if flag & 0x8000 != 0 {
            PageFormat::Compact
        } else {
            PageFormat::Redundant
        };

        Ok(IndexHeader {
            num_dir_slots,
            heap_top,
            num_heap_recs: flag & 0x7FFF,
            format,
            first_garbage_off,
            garbage_space,
            last_insert_pos,
            direction: PageDirection::from_raw(direction),
            num_inserts_in_direction,
            num_user_recs,
            max_trx_id,
            page_level,
            index_id,
        })
    }
}
