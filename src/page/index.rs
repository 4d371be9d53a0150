use log::debug;
use serde::Serialize;

use crate::page::fseg::FsegHeader;
use crate::page::index_header::{IndexHeader, PageDirection, PageFormat};
use crate::page::{
    Page, INDEX_HEADER_SIZE, INFIMUM_LITERAL, INFIMUM_ORIGIN, PAGE_DATA_OFFSET, SUPREMUM_LITERAL,
    SUPREMUM_ORIGIN,
};
use crate::record::walker::RecordWalker;
use crate::types::record::RecordHeader;
use crate::types::{
    error::{PageError, Result},
    IndexId, Lsn, PageNo, SpaceId, FIL_HEADER_SIZE, FIL_TRAILER_SIZE, PAGE_DIR_SLOT_SIZE,
    PAGE_SIZE, RECORD_HEADER_SIZE, SYSTEM_RECORD_BYTES,
};
use crate::utils::bytes::read_u16_be;

/// A structurally parsed INDEX page: index header, file-segment header,
/// validated system records and the directory slot array.
#[derive(Debug, Clone)]
pub struct IndexPage {
    page: Page,
    pub hdr: IndexHeader,
    pub fseg: FsegHeader,
    pub infimum: RecordHeader,
    pub supremum: RecordHeader,
    /// Slots reversed from their physical order: `dir_slots[0]` points to
    /// INFIMUM, the last slot to SUPREMUM.
    pub dir_slots: Vec<u16>,
}

impl IndexPage {
    pub fn parse(page: Page) -> Result<Self> {
        let page_no = page.page_no;
        let raw = page.page_type().as_raw();
        if page.page_type() != crate::page::fil::PageType::Index {
            return Err(PageError::NotIndexPage {
                page_no,
                page_type: raw,
            });
        }

        let data = page.data();
        let hdr = IndexHeader::parse(data, FIL_HEADER_SIZE, page_no)?;
        if hdr.format != PageFormat::Compact {
            return Err(PageError::UnsupportedRedundantFormat { page_no });
        }
        let fseg = FsegHeader::parse(data, FIL_HEADER_SIZE + INDEX_HEADER_SIZE)?;

        let infimum = RecordHeader::parse(data, PAGE_DATA_OFFSET, page_no)?;
        if &data[INFIMUM_ORIGIN..INFIMUM_ORIGIN + SYSTEM_RECORD_BYTES] != INFIMUM_LITERAL {
            return Err(PageError::CorruptSystemRecord {
                page_no,
                which: "INFIMUM",
                offset: INFIMUM_ORIGIN,
            });
        }
        let supremum = RecordHeader::parse(data, SUPREMUM_ORIGIN - RECORD_HEADER_SIZE, page_no)?;
        if &data[SUPREMUM_ORIGIN..SUPREMUM_ORIGIN + SYSTEM_RECORD_BYTES] != SUPREMUM_LITERAL {
            return Err(PageError::CorruptSystemRecord {
                page_no,
                which: "SUPREMUM",
                offset: SUPREMUM_ORIGIN,
            });
        }

        // Directory slots live at the page tail in reverse: the slot
        // nearest the trailer points to INFIMUM.
        let n = hdr.num_dir_slots as usize;
        let start = PAGE_SIZE - FIL_TRAILER_SIZE - n * PAGE_DIR_SLOT_SIZE;
        let mut dir_slots = vec![0u16; n];
        for i in 0..n {
            dir_slots[n - 1 - i] = read_u16_be(data, start + i * PAGE_DIR_SLOT_SIZE)?;
        }

        debug!(
            "page {}: index {:#x}, level {}, {} user records, {} dir slots",
            page_no, hdr.index_id, hdr.page_level, hdr.num_user_recs, n
        );

        Ok(IndexPage {
            page,
            hdr,
            fseg,
            infimum,
            supremum,
            dir_slots,
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn data(&self) -> &[u8] {
        self.page.data()
    }

    pub fn page_no(&self) -> PageNo {
        self.page.page_no
    }

    pub fn is_leaf(&self) -> bool {
        self.hdr.page_level == 0
    }

    /// Root pages are the only pages with neither neighbor.
    pub fn is_root(&self) -> bool {
        self.page.fil.prev.is_none() && self.page.fil.next.is_none()
    }

    pub fn used_bytes(&self) -> usize {
        self.hdr.heap_top as usize + FIL_TRAILER_SIZE
            + self.hdr.num_dir_slots as usize * PAGE_DIR_SLOT_SIZE
            - self.hdr.garbage_space as usize
    }

    /// Walks the record list from INFIMUM. `max_steps` bounds traversal on
    /// corrupted pages; `skip_system` filters INFIMUM/SUPREMUM from the
    /// output while still traversing through them.
    pub fn walk(&self, max_steps: usize, skip_system: bool) -> RecordWalker<'_> {
        RecordWalker::new(self, max_steps, skip_system)
    }

    pub fn summary(&self) -> PageSummary {
        PageSummary {
            page_no: self.page.page_no,
            space_id: self.page.fil.space_id,
            page_type: self.page.page_type().as_raw(),
            last_mod_lsn: self.page.fil.last_mod_lsn,
            prev: self.page.fil.prev,
            next: self.page.fil.next,
            num_dir_slots: self.hdr.num_dir_slots,
            heap_top: self.hdr.heap_top,
            num_heap_recs: self.hdr.num_heap_recs,
            garbage_space: self.hdr.garbage_space,
            last_insert_pos: self.hdr.last_insert_pos,
            direction: self.hdr.direction,
            num_inserts_in_direction: self.hdr.num_inserts_in_direction,
            num_user_recs: self.hdr.num_user_recs,
            max_trx_id: self.hdr.max_trx_id,
            page_level: self.hdr.page_level,
            index_id: self.hdr.index_id,
            used_bytes: self.used_bytes(),
            is_leaf: self.is_leaf(),
            is_root: self.is_root(),
        }
    }
}

/// Flat, serializable view of one INDEX page for diagnostics and output.
#[derive(Debug, Clone, Serialize)]
pub struct PageSummary {
    pub page_no: PageNo,
    pub space_id: SpaceId,
    pub page_type: u16,
    pub last_mod_lsn: Lsn,
    pub prev: Option<PageNo>,
    pub next: Option<PageNo>,
    pub num_dir_slots: u16,
    pub heap_top: u16,
    pub num_heap_recs: u16,
    pub garbage_space: u16,
    pub last_insert_pos: u16,
    pub direction: PageDirection,
    pub num_inserts_in_direction: u16,
    pub num_user_recs: u16,
    pub max_trx_id: u64,
    pub page_level: u16,
    pub index_id: IndexId,
    pub used_bytes: usize,
    pub is_leaf: bool,
    pub is_root: bool,
}
