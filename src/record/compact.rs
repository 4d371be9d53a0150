use crate::column;
use crate::page::index::IndexPage;
use crate::schema::{Column, TableDef};
use crate::types::record::{Record, RecordHeader};
use crate::types::value::Value;
use crate::types::{
    error::{PageError, Result},
    RECORD_HEADER_SIZE,
};
use crate::utils::bytes::read_u32_be;

// Hidden system columns on clustered leaf records, stored right after the
// primary key: 6-byte transaction id + 7-byte rollback pointer.
pub const TRX_ID_SIZE: usize = 6;
pub const ROLL_PTR_SIZE: usize = 7;
pub const TRX_METADATA_SIZE: usize = TRX_ID_SIZE + ROLL_PTR_SIZE;

/*
 * Compact record layout, addresses decreasing from the origin:
 *
 *   origin        → column data (grows forward)
 *   origin −5     → 5-byte record header
 *   origin −5 −B  → NULL bitmap, B = ceil(nullable/8) (leaf only)
 *   below that    → variable-length lengths, one or two bytes each,
 *                   stored in REVERSE column order: the byte nearest the
 *                   bitmap belongs to the FIRST variable-length column.
 */

/// Decodes compact-format records on one page against a table schema.
/// The schema is immutable for the decoder's lifetime; all per-column
/// lookups were precomputed when the `TableDef` was built.
pub struct CompactDecoder<'a> {
    table: &'a TableDef,
}

impl<'a> CompactDecoder<'a> {
    pub fn new(table: &'a TableDef) -> Self {
        Self { table }
    }

    /// Decodes the record whose data starts at `origin`. System records
    /// come back with their header only.
    pub fn decode(&self, page: &IndexPage, origin: usize) -> Result<Record> {
        let data = page.data();
        let page_no = page.page_no();
        let is_leaf = page.is_leaf();

        let header_pos = origin
            .checked_sub(RECORD_HEADER_SIZE)
            .ok_or(PageError::OutOfBounds {
                offset: origin,
                width: RECORD_HEADER_SIZE,
                len: data.len(),
            })?;
        let header = RecordHeader::parse(data, header_pos, page_no)?;
        let mut record = Record::new(page_no, header, origin);
        if header.record_type.is_system() {
            return Ok(record);
        }

        let null_flags = self.read_null_bitmap(data, origin, is_leaf)?;
        let bitmap_size = if is_leaf && self.table.has_nullable_column() {
            self.table.null_bitmap_size()
        } else {
            0
        };
        let lengths =
            self.read_var_lengths(data, origin, bitmap_size, is_leaf, &null_flags, page_no)?;

        // Forward pass: primary key, hidden transaction columns on
        // clustered leaves, then the remaining columns (leaf) or the
        // child page number (node pointer).
        let mut pos = origin;
        for col in self.table.primary_key_columns() {
            pos = self.decode_column(data, pos, col, &null_flags, &lengths, &mut record)?;
        }
        if is_leaf {
            if self.table.has_primary_key() {
                pos += TRX_METADATA_SIZE;
            }
            for col in self.table.columns() {
                if col.is_primary_key {
                    continue;
                }
                pos = self.decode_column(data, pos, col, &null_flags, &lengths, &mut record)?;
            }
        } else {
            record.child_page_no = Some(read_u32_be(data, pos)?);
        }
        Ok(record)
    }

    /// NULL bitmap: present only for leaf records of tables with at least
    /// one nullable column. Bit `i % 8` of byte `i / 8` covers the i-th
    /// nullable column in table order.
    fn read_null_bitmap(&self, data: &[u8], origin: usize, is_leaf: bool) -> Result<Vec<bool>> {
        let count = self.table.nullable_count();
        let mut flags = vec![false; count];
        if !is_leaf || count == 0 {
            return Ok(flags);
        }
        let size = self.table.null_bitmap_size();
        let header_pos = origin - RECORD_HEADER_SIZE;
        let start = header_pos
            .checked_sub(size)
            .ok_or(PageError::OutOfBounds {
                offset: header_pos,
                width: size,
                len: data.len(),
            })?;
        let bits = &data[start..header_pos];
        for (i, flag) in flags.iter_mut().enumerate() {
            *flag = bits[i / 8] & (1 << (i % 8)) != 0;
        }
        Ok(flags)
    }

    /// Reconstructs the variable-length vector. One cursor walks backward
    /// through memory while the columns are iterated forward; the decoded
    /// length for each column is keyed by its ordinal. Neither the columns
    /// nor the result are ever reversed: the rightmost header byte belongs
    /// to the first variable-length column.
    fn read_var_lengths(
        &self,
        data: &[u8],
        origin: usize,
        bitmap_size: usize,
        is_leaf: bool,
        null_flags: &[bool],
        page_no: crate::types::PageNo,
    ) -> Result<Vec<Option<usize>>> {
        let mut lengths: Vec<Option<usize>> = vec![None; self.table.column_count()];
        let mut cursor = origin - RECORD_HEADER_SIZE - bitmap_size;

        let columns: Vec<&Column> = if is_leaf {
            self.table.varlen_columns().collect()
        } else {
            self.table.primary_key_varlen_columns().collect()
        };

        for col in columns {
            if self.is_null(col, null_flags) {
                lengths[col.ordinal] = Some(0);
                continue;
            }
            cursor = cursor.checked_sub(1).ok_or(PageError::OutOfBounds {
                offset: 0,
                width: 1,
                len: data.len(),
            })?;
            let first = data[cursor] as usize;

            // Columns that can exceed 255 encoded bytes use a two-byte
            // escape when the first byte's high bit is set. Bit 6 of that
            // byte flags an off-page value, which we do not follow.
            let length = if col.max_encoded_len() > 255 && first & 0x80 != 0 {
                if first & 0x40 != 0 {
                    return Err(PageError::OverflowUnsupported {
                        page_no,
                        column: col.name.clone(),
                    });
                }
                cursor = cursor.checked_sub(1).ok_or(PageError::OutOfBounds {
                    offset: 0,
                    width: 1,
                    len: data.len(),
                })?;
                ((first & 0x3F) << 8) | data[cursor] as usize
            } else {
                first
            };
            lengths[col.ordinal] = Some(length);
        }
        Ok(lengths)
    }

    fn is_null(&self, col: &Column, null_flags: &[bool]) -> bool {
        col.nullable
            && self
                .table
                .null_index_of(col.ordinal)
                .map(|i| null_flags[i])
                .unwrap_or(false)
    }

    fn decode_column(
        &self,
        data: &[u8],
        pos: usize,
        col: &Column,
        null_flags: &[bool],
        lengths: &[Option<usize>],
        record: &mut Record,
    ) -> Result<usize> {
        if self.is_null(col, null_flags) {
            record.values.push((col.name.clone(), Value::Null));
            return Ok(pos);
        }
        let var_len = if col.is_variable_length() {
            lengths[col.ordinal].ok_or_else(|| PageError::SchemaMismatch {
                page_no: record.page_no,
                offset: record.origin,
                reason: format!("no length entry for variable-length column '{}'", col.name),
            })?
        } else {
            0
        };
        let (value, consumed) = column::decode(data, pos, col, var_len)?;
        record.values.push((col.name.clone(), value));
        Ok(pos + consumed)
    }
}
