use crate::page::index::IndexPage;
use crate::page::{INFIMUM_ORIGIN, PAGE_DATA_OFFSET, RECORD_SPACE_END};
use crate::types::record::{RecordHeader, RecordType};
use crate::types::{
    error::{PageError, Result},
    RECORD_HEADER_SIZE,
};

/// One step of a record walk: the parsed 5-byte header plus the absolute
/// offset of the record's first data byte. No record content is
/// materialized; decoding is a separate, optional step.
#[derive(Debug, Clone, Copy)]
pub struct RecordSlot {
    pub header: RecordHeader,
    pub origin: usize,
}

/// Iterator over the singly-linked record list, INFIMUM to SUPREMUM.
///
/// Offsets in the headers are relative and signed; every hop is bounds
/// checked against the usable record space, and a step cap catches cycles
/// on corrupted pages. The sequence is finite and not restartable.
pub struct RecordWalker<'a> {
    page: &'a IndexPage,
    cur: RecordSlot,
    steps: usize,
    max_steps: usize,
    skip_system: bool,
    start_pending: bool,
    done: bool,
}

impl<'a> RecordWalker<'a> {
    pub(crate) fn new(page: &'a IndexPage, max_steps: usize, skip_system: bool) -> Self {
        Self {
            page,
            cur: RecordSlot {
                header: page.infimum,
                origin: INFIMUM_ORIGIN,
            },
            steps: 0,
            max_steps,
            skip_system,
            start_pending: true,
            done: false,
        }
    }

    fn advance(&mut self) -> Result<RecordSlot> {
        if self.steps >= self.max_steps {
            return Err(PageError::WalkTooLong {
                page_no: self.page.page_no(),
                max_steps: self.max_steps,
            });
        }
        self.steps += 1;

        let target = self.cur.origin as i64 + self.cur.header.next_rec_offset as i64;
        if target < PAGE_DATA_OFFSET as i64 || target >= RECORD_SPACE_END as i64 {
            return Err(PageError::OffsetOutOfPage {
                page_no: self.page.page_no(),
                target,
            });
        }
        let origin = target as usize;
        let header = RecordHeader::parse(
            self.page.data(),
            origin - RECORD_HEADER_SIZE,
            self.page.page_no(),
        )?;
        Ok(RecordSlot { header, origin })
    }
}

impl<'a> Iterator for RecordWalker<'a> {
    type Item = Result<RecordSlot>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if self.start_pending {
                self.start_pending = false;
                if !self.skip_system {
                    return Some(Ok(self.cur));
                }
                continue;
            }

            // A zero next offset terminates the list; on a well-formed
            // page it appears exactly on SUPREMUM.
            if self.cur.header.next_rec_offset == 0 {
                self.done = true;
                if self.cur.header.record_type != RecordType::Supremum {
                    return Some(Err(PageError::CorruptRecordHeader {
                        page_no: self.page.page_no(),
                        offset: self.cur.origin - RECORD_HEADER_SIZE,
                        bits: self.cur.header.record_type as u8,
                    }));
                }
                return None;
            }

            match self.advance() {
                Ok(slot) => {
                    self.cur = slot;
                    if slot.header.record_type.is_system() && self.skip_system {
                        continue;
                    }
                    return Some(Ok(slot));
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}
