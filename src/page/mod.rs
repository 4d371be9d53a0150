pub mod fil;
pub mod fseg;
pub mod index;
pub mod index_header;

use log::debug;

use crate::page::fil::{FilHeader, FilTrailer, PageType};
use crate::types::{
    error::{PageError, Result},
    PageNo, FIL_HEADER_SIZE, FIL_TRAILER_SIZE, PAGE_SIZE, RECORD_HEADER_SIZE, SYSTEM_RECORD_BYTES,
};

pub const INDEX_HEADER_SIZE: usize = 36;
pub const FSEG_HEADER_SIZE: usize = 20;
// Index header + FSEG header, immediately after the FIL header
pub const PAGE_HEADER_SIZE: usize = INDEX_HEADER_SIZE + FSEG_HEADER_SIZE;
pub const PAGE_DATA_OFFSET: usize = FIL_HEADER_SIZE + PAGE_HEADER_SIZE; // 94

// System record positions are fixed by the layout above
pub const INFIMUM_ORIGIN: usize = PAGE_DATA_OFFSET + RECORD_HEADER_SIZE; // 99
pub const SUPREMUM_ORIGIN: usize =
    INFIMUM_ORIGIN + SYSTEM_RECORD_BYTES + RECORD_HEADER_SIZE; // 112
pub const RECORD_SPACE_END: usize = PAGE_SIZE - FIL_TRAILER_SIZE; // 16376

pub const PAGE_TYPE_OFFSET: usize = 24;

pub const INFIMUM_LITERAL: &[u8; 8] = b"infimum\0";
pub const SUPREMUM_LITERAL: &[u8; 8] = b"supremum";

/*
 * Page layout (16 KiB logical)
 * ┌──────────────────────────────────────────────┐ 0
 * │ FIL header (38 bytes)                        │
 * ├──────────────────────────────────────────────┤ 38
 * │ Index header (36 bytes)                      │
 * ├──────────────────────────────────────────────┤ 74
 * │ FSEG header (20 bytes)                       │
 * ├──────────────────────────────────────────────┤ 94
 * │ INFIMUM  (5-byte header + "infimum\0")       │
 * │ SUPREMUM (5-byte header + "supremum")        │
 * ├──────────────────────────────────────────────┤ 120
 * │ Record heap (grows upward)                   │
 * │              ...free space...                │
 * │ Page directory (2-byte slots, grows downward)│
 * ├──────────────────────────────────────────────┤ 16376
 * │ FIL trailer (8 bytes)                        │
 * └──────────────────────────────────────────────┘ 16384
 */

/// A validated logical page: the FIL envelope has been parsed and the
/// header/trailer LSN check has passed. The buffer is immutable from here
/// on; everything downstream reads through `data()`.
#[derive(Debug, Clone)]
pub struct Page {
    pub page_no: PageNo,
    pub fil: FilHeader,
    pub trailer: FilTrailer,
    data: Vec<u8>,
}

impl Page {
    pub fn new(page_no: PageNo, data: Vec<u8>) -> Result<Self> {
        if data.len() != PAGE_SIZE {
            return Err(PageError::ShortPage {
                page_no,
                expected: PAGE_SIZE,
                actual: data.len(),
            });
        }
        let fil = FilHeader::parse(&data, page_no)?;
        let trailer = FilTrailer::parse(&data, page_no)?;
        if (fil.last_mod_lsn & 0xFFFF_FFFF) as u32 != trailer.low32_lsn {
            return Err(PageError::LsnMismatch {
                page_no,
                header_lsn: fil.last_mod_lsn,
                trailer_lsn: trailer.low32_lsn,
            });
        }
        debug!(
            "page {}: type {:?}, space {}, lsn {:#x}",
            page_no, fil.page_type, fil.space_id, fil.last_mod_lsn
        );
        Ok(Self {
            page_no,
            fil,
            trailer,
            data,
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn page_type(&self) -> PageType {
        self.fil.page_type
    }
}
