//! Compressed-page shim.
//!
//! Tablespaces created with block compression store INDEX pages in
//! physical blocks of 1/2/4/8 KiB that inflate to the 16 KiB logical
//! page. The inflation itself lives in an external engine library; this
//! module owns the routing decision and the narrow call boundary, nothing
//! else. A successfully inflated buffer goes through the same envelope
//! and structural checks as an uncompressed page.

use log::{debug, warn};

use crate::page::fil::{PageType, PAGE_TYPE_INDEX};
use crate::page::PAGE_TYPE_OFFSET;
use crate::types::{
    error::{PageError, Result},
    PageNo, PAGE_SIZE,
};
use crate::utils::bytes::read_u16_be;

pub const COMPRESSED_PAGE_SIZES: [usize; 4] = [1024, 2048, 4096, 8192];

// Return codes of the external decompression entry point
pub const DECOMPRESS_OK: i32 = 0;
pub const DECOMPRESS_ERR_ARGS: i32 = -1;
pub const DECOMPRESS_ERR_LOGICAL: i32 = -2;
pub const DECOMPRESS_ERR_PHYSICAL: i32 = -3;
pub const DECOMPRESS_ERR_FAILED: i32 = -4;

/// Shift size keying the decompression routine:
/// `physical == 1 << (10 + ssize)`.
pub fn ssize_for(physical: usize) -> Option<u8> {
    match physical {
        1024 => Some(0),
        2048 => Some(1),
        4096 => Some(2),
        8192 => Some(3),
        16384 => Some(4),
        _ => None,
    }
}

/// The external decompression routine, mirroring the C entry point
/// `decompress(src, src_len, dst, dst_len) -> int`: zero on success,
/// negative on failure. `dst` is always the 16 KiB logical buffer.
///
/// The engine library behind this keeps process-wide globals describing
/// the page geometry; calls are serialized through `&mut self`.
pub trait Decompressor {
    fn decompress(&mut self, src: &[u8], dst: &mut [u8]) -> i32;
}

/// Turns a physical buffer into a 16 KiB logical page.
///
/// A full-size buffer passes through unchanged. Sub-logical buffers are
/// inflated only when their page type is INDEX; every other type is
/// copied into a zero-padded logical buffer, matching the engine's own
/// behavior for uncompressed page types inside compressed tablespaces.
pub fn to_logical(
    page_no: PageNo,
    physical: &[u8],
    zip: &mut dyn Decompressor,
) -> Result<Vec<u8>> {
    if physical.len() == PAGE_SIZE {
        return Ok(physical.to_vec());
    }
    if ssize_for(physical.len()).is_none() || physical.len() > PAGE_SIZE {
        return Err(PageError::InvalidPhysicalSize {
            size: physical.len(),
        });
    }

    let page_type = read_u16_be(physical, PAGE_TYPE_OFFSET)?;
    let mut logical = vec![0u8; PAGE_SIZE];
    if page_type != PAGE_TYPE_INDEX {
        debug!(
            "page {}: {:?} at {} bytes, copying through without decompression",
            page_no,
            PageType::from_raw(page_type),
            physical.len()
        );
        logical[..physical.len()].copy_from_slice(physical);
        return Ok(logical);
    }

    match zip.decompress(physical, &mut logical) {
        DECOMPRESS_OK => Ok(logical),
        DECOMPRESS_ERR_LOGICAL => Err(PageError::InvalidLogicalSize { size: PAGE_SIZE }),
        DECOMPRESS_ERR_PHYSICAL => Err(PageError::InvalidPhysicalSize {
            size: physical.len(),
        }),
        rc => {
            warn!("page {}: decompression failed with rc {}", page_no, rc);
            Err(PageError::DecompressionFailed { page_no, rc })
        }
    }
}
