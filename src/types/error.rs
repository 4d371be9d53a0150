use thiserror::Error;

use crate::types::PageNo;

#[derive(Error, Debug)]
pub enum PageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("read of {width} bytes at offset {offset} out of bounds (buffer is {len} bytes)")]
    OutOfBounds {
        offset: usize,
        width: usize,
        len: usize,
    },

    #[error("short read at file offset {offset}: wanted {wanted} bytes, got {got}")]
    ShortRead { offset: u64, wanted: usize, got: u64 },

    #[error("file offset {offset} is past the end of the byte source ({len} bytes)")]
    OffsetOutOfRange { offset: u64, len: u64 },

    #[error("page {page_no}: expected a {expected}-byte page buffer, got {actual}")]
    ShortPage {
        page_no: PageNo,
        expected: usize,
        actual: usize,
    },

    #[error(
        "page {page_no}: header LSN {header_lsn:#x} disagrees with trailer low-32 LSN {trailer_lsn:#x}"
    )]
    LsnMismatch {
        page_no: PageNo,
        header_lsn: u64,
        trailer_lsn: u32,
    },

    #[error("page {page_no}: not an INDEX page (type {page_type:#06x})")]
    NotIndexPage { page_no: PageNo, page_type: u16 },

    #[error("page {page_no}: redundant row format is not supported")]
    UnsupportedRedundantFormat { page_no: PageNo },

    #[error("page {page_no}: {which} literal mismatch at offset {offset}")]
    CorruptSystemRecord {
        page_no: PageNo,
        which: &'static str,
        offset: usize,
    },

    #[error("page {page_no}: record header at offset {offset} has invalid type bits {bits:#x}")]
    CorruptRecordHeader {
        page_no: PageNo,
        offset: usize,
        bits: u8,
    },

    #[error("page {page_no}: next record offset escapes the page (target {target})")]
    OffsetOutOfPage { page_no: PageNo, target: i64 },

    #[error("page {page_no}: record walk exceeded {max_steps} steps")]
    WalkTooLong { page_no: PageNo, max_steps: usize },

    #[error("page {page_no}: record at offset {offset} does not match the schema: {reason}")]
    SchemaMismatch {
        page_no: PageNo,
        offset: usize,
        reason: String,
    },

    #[error("column '{column}' has unsupported type {column_type}")]
    UnknownColumnType {
        column: String,
        column_type: String,
    },

    #[error("page {page_no}: column '{column}' is stored off-page; overflow pages are not supported")]
    OverflowUnsupported { page_no: PageNo, column: String },

    #[error("invalid physical page size {size}")]
    InvalidPhysicalSize { size: usize },

    #[error("invalid logical page size {size}")]
    InvalidLogicalSize { size: usize },

    #[error("page {page_no}: decompression failed (rc {rc})")]
    DecompressionFailed { page_no: PageNo, rc: i32 },

    #[error("page {page_no}: page is {physical} bytes but no decompression path is available")]
    DecompressionUnavailable { page_no: PageNo, physical: usize },

    #[error("schema translation error: {0}")]
    Sql(String),
}

pub type Result<T> = std::result::Result<T, PageError>;
