//! Byte-source abstraction and the page reader.
//!
//! The reader performs exactly one positioned read per page. For
//! uncompressed tablespaces the read is 16 KiB at `page_no * 16384`; for
//! compressed tablespaces the caller declares the physical page size and
//! the resulting buffer is routed through the shim.

use std::io::{Read, Seek, SeekFrom};

use log::debug;

use crate::page::index::IndexPage;
use crate::page::Page;
use crate::record::CompactDecoder;
use crate::schema::TableDef;
use crate::types::record::Record;
use crate::types::{
    error::{PageError, Result},
    PageNo, PAGE_SIZE,
};
use crate::zip::{self, Decompressor};

/// A seekable source of bytes supporting exact positioned reads. Short
/// reads, out-of-range offsets and I/O failures surface as distinct
/// error kinds.
pub trait ByteSource {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<()>;
    fn len(&mut self) -> Result<u64>;
    fn is_empty(&mut self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl<T: Read + Seek> ByteSource for T {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<()> {
        let end = self.seek(SeekFrom::End(0))?;
        if offset >= end {
            return Err(PageError::OffsetOutOfRange { offset, len: end });
        }
        self.seek(SeekFrom::Start(offset))?;
        let mut total = 0;
        while total < buf.len() {
            let n = self.read(&mut buf[total..])?;
            if n == 0 {
                return Err(PageError::ShortRead {
                    offset,
                    wanted: buf.len(),
                    got: total as u64,
                });
            }
            total += n;
        }
        Ok(())
    }

    fn len(&mut self) -> Result<u64> {
        Ok(self.seek(SeekFrom::End(0))?)
    }
}

/// Physical page size of the tablespace being read. `Auto` assumes an
/// uncompressed tablespace; compressed tablespaces must be declared
/// explicitly, autodetection is advisory at best and is not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalPageSize {
    Auto,
    Bytes(usize),
}

impl PhysicalPageSize {
    pub fn resolve(&self) -> usize {
        match self {
            PhysicalPageSize::Auto => PAGE_SIZE,
            PhysicalPageSize::Bytes(n) => *n,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Traversal cap for the record walker.
    pub max_records: usize,
    /// When set, INFIMUM/SUPREMUM are not emitted from record streams.
    pub skip_system_records: bool,
    pub physical_page_size: PhysicalPageSize,
    /// When false, reading a sub-logical page is an error instead of a
    /// trip through the shim.
    pub enable_decompression: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_records: 1000,
            skip_system_records: false,
            physical_page_size: PhysicalPageSize::Auto,
            enable_decompression: true,
        }
    }
}

/// Reads pages from a byte source by page number.
pub struct PageReader<S> {
    source: S,
    config: ReaderConfig,
    zip: Option<Box<dyn Decompressor>>,
}

impl<S: ByteSource> PageReader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            config: ReaderConfig::default(),
            zip: None,
        }
    }

    pub fn with_config(source: S, config: ReaderConfig) -> Result<Self> {
        if let PhysicalPageSize::Bytes(n) = config.physical_page_size {
            if zip::ssize_for(n).is_none() {
                return Err(PageError::InvalidPhysicalSize { size: n });
            }
        }
        Ok(Self {
            source,
            config,
            zip: None,
        })
    }

    /// Installs the decompression routine used for sub-logical pages.
    pub fn set_decompressor(&mut self, zip: Box<dyn Decompressor>) {
        self.zip = Some(zip);
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Reads and envelope-validates one page.
    pub fn read_page(&mut self, page_no: PageNo) -> Result<Page> {
        let physical = self.config.physical_page_size.resolve();
        let offset = page_no as u64 * physical as u64;
        let mut buf = vec![0u8; physical];
        self.source.read_at(&mut buf, offset)?;
        debug!("read page {} ({} bytes at offset {})", page_no, physical, offset);

        let logical = if physical == PAGE_SIZE {
            buf
        } else {
            if !self.config.enable_decompression {
                return Err(PageError::DecompressionUnavailable { page_no, physical });
            }
            let zip = self
                .zip
                .as_mut()
                .ok_or(PageError::DecompressionUnavailable { page_no, physical })?;
            zip::to_logical(page_no, &buf, zip.as_mut())?
        };
        Page::new(page_no, logical)
    }

    /// Reads a page and parses its INDEX structure.
    pub fn read_index_page(&mut self, page_no: PageNo) -> Result<IndexPage> {
        IndexPage::parse(self.read_page(page_no)?)
    }

    /// Reads a page and decodes its record stream against a schema, in
    /// traversal order. Structural errors abort; the first record-level
    /// decode error aborts as well, callers wanting per-record reporting
    /// drive the walker themselves.
    pub fn read_records(&mut self, page_no: PageNo, table: &TableDef) -> Result<Vec<Record>> {
        let page = self.read_index_page(page_no)?;
        let decoder = CompactDecoder::new(table);
        let mut records = Vec::new();
        for slot in page.walk(self.config.max_records, self.config.skip_system_records) {
            let slot = slot?;
            records.push(decoder.decode(&page, slot.origin)?);
        }
        Ok(records)
    }
}
