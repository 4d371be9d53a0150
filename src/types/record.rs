use serde::{Deserialize, Serialize};

use crate::types::{
    error::{PageError, Result},
    value::Value,
    PageNo, RECORD_HEADER_SIZE,
};
use crate::utils::bytes::read_u16_be;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordType {
    Conventional = 0,
    NodePointer = 1,
    Infimum = 2,
    Supremum = 3,
}

impl RecordType {
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(RecordType::Conventional),
            1 => Some(RecordType::NodePointer),
            2 => Some(RecordType::Infimum),
            3 => Some(RecordType::Supremum),
            _ => None,
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, RecordType::Infimum | RecordType::Supremum)
    }
}

/// The 5-byte compact record header preceding each record's data origin.
///
/// `next_rec_offset` is relative: it is added to this record's origin to
/// reach the next record's origin. It is zero only on SUPREMUM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordHeader {
    pub min_rec: bool,
    pub deleted: bool,
    pub n_owned: u8,
    pub heap_number: u16,
    pub record_type: RecordType,
    pub next_rec_offset: i16,
}

impl RecordHeader {
    /// Parses the header stored at `offset` (i.e. 5 bytes before the
    /// record origin). `page_no` is carried for error context only.
    pub fn parse(page: &[u8], offset: usize, page_no: PageNo) -> Result<Self> {
        if offset + RECORD_HEADER_SIZE > page.len() {
            return Err(PageError::OutOfBounds {
                offset,
                width: RECORD_HEADER_SIZE,
                len: page.len(),
            });
        }
        let b0 = page[offset];
        let flags = (b0 & 0xF0) >> 4;
        let n_owned = b0 & 0x0F;
        let b12 = read_u16_be(page, offset + 1)?;
        let type_bits = (b12 & 0x0007) as u8;
        let record_type = RecordType::from_bits(type_bits).ok_or({
            PageError::CorruptRecordHeader {
                page_no,
                offset,
                bits: type_bits,
            }
        })?;
        let heap_number = (b12 & 0xFFF8) >> 3;
        let next_rec_offset = read_u16_be(page, offset + 3)? as i16;
        Ok(RecordHeader {
            min_rec: flags & 0x1 != 0,
            deleted: flags & 0x2 != 0,
            n_owned,
            heap_number,
            record_type,
            next_rec_offset,
        })
    }
}

/// A decoded record: the raw header for diagnostics plus the typed column
/// values in table order. System records carry no values. Node-pointer
/// records expose the child page number instead of non-key columns.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    pub page_no: PageNo,
    pub header: RecordHeader,
    /// Absolute offset of the record's first data byte within the page.
    pub origin: usize,
    pub child_page_no: Option<PageNo>,
    pub values: Vec<(String, Value)>,
}

impl Record {
    pub fn new(page_no: PageNo, header: RecordHeader, origin: usize) -> Self {
        Self {
            page_no,
            header,
            origin,
            child_page_no: None,
            values: Vec::new(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn is_system(&self) -> bool {
        self.header.record_type.is_system()
    }
}
