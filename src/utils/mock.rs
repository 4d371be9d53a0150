//! Synthetic page construction used by the test suite and benches.
//!
//! The builders assemble byte-accurate 16 KiB INDEX pages from a schema
//! and rows: reverse-stored variable-length headers, NULL bitmap, flipped
//! sign bits, hidden transaction columns, chained next offsets and the
//! tail directory. Panics on misuse (wrong value kind for a column) are
//! acceptable here; this module never runs against real data.

use crate::page::{
    INFIMUM_LITERAL, INFIMUM_ORIGIN, PAGE_DATA_OFFSET, SUPREMUM_LITERAL, SUPREMUM_ORIGIN,
};
use crate::page::fil::PAGE_TYPE_INDEX;
use crate::schema::{Charset, Column, ColumnType, TableDef};
use crate::types::record::RecordType;
use crate::types::value::Value;
use crate::types::{
    PageNo, FIL_NULL, FIL_TRAILER_SIZE, PAGE_SIZE, RECORD_HEADER_SIZE, SYSTEM_RECORD_BYTES,
};

/// One encoded record: the bytes stored behind the header (variable
/// length vector + NULL bitmap, already in storage order) and the data
/// section starting at the origin.
#[derive(Debug, Clone)]
pub struct RowImage {
    pub pre: Vec<u8>,
    pub data: Vec<u8>,
}

/// Encodes a full leaf row in table column order. `Value::Null` entries
/// set the corresponding bitmap bit and consume no bytes.
pub fn encode_row(table: &TableDef, values: &[Value], trx_id: u64, roll_ptr: u64) -> RowImage {
    assert_eq!(
        values.len(),
        table.column_count(),
        "row arity does not match the table"
    );
    let encoded: Vec<Option<Vec<u8>>> = table
        .columns()
        .iter()
        .zip(values)
        .map(|(col, value)| match value {
            Value::Null => {
                assert!(col.nullable, "NULL for NOT NULL column '{}'", col.name);
                None
            }
            v => Some(encode_column_value(col, v)),
        })
        .collect();

    let mut bitmap = vec![0u8; table.null_bitmap_size()];
    for col in table.columns() {
        if let Some(i) = table.null_index_of(col.ordinal) {
            if values[col.ordinal].is_null() {
                bitmap[i / 8] |= 1 << (i % 8);
            }
        }
    }

    let mut pre = var_length_bytes(
        table.varlen_columns(),
        &encoded,
    );
    pre.extend_from_slice(&bitmap);

    let mut data = Vec::new();
    for col in table.primary_key_columns() {
        data.extend(encoded[col.ordinal].as_ref().expect("primary key value"));
    }
    if table.has_primary_key() {
        data.extend_from_slice(&trx_id.to_be_bytes()[2..]); // 6-byte trx id
        data.extend_from_slice(&roll_ptr.to_be_bytes()[1..]); // 7-byte roll ptr
    }
    for col in table.columns() {
        if col.is_primary_key {
            continue;
        }
        if let Some(bytes) = &encoded[col.ordinal] {
            data.extend(bytes);
        }
    }
    RowImage { pre, data }
}

/// Encodes a node-pointer record: key columns followed by the child page
/// number. Internal records carry no NULL bitmap and only the key's
/// variable-length entries.
pub fn encode_node_pointer(table: &TableDef, key_values: &[Value], child: PageNo) -> RowImage {
    let key_columns: Vec<&Column> = table.primary_key_columns().collect();
    assert_eq!(key_values.len(), key_columns.len(), "key arity mismatch");
    let mut encoded: Vec<Option<Vec<u8>>> = vec![None; table.column_count()];
    for (col, value) in key_columns.iter().zip(key_values) {
        encoded[col.ordinal] = Some(encode_column_value(col, value));
    }

    let pre = var_length_bytes(table.primary_key_varlen_columns(), &encoded);

    let mut data = Vec::new();
    for col in &key_columns {
        data.extend(encoded[col.ordinal].as_ref().unwrap());
    }
    data.extend_from_slice(&child.to_be_bytes());
    RowImage { pre, data }
}

/// Builds the variable-length vector in storage order: walking the
/// columns forward while emitting bytes at decreasing addresses, which
/// puts the first column's entry nearest the bitmap.
fn var_length_bytes<'a>(
    columns: impl Iterator<Item = &'a Column>,
    encoded: &[Option<Vec<u8>>],
) -> Vec<u8> {
    let mut desc = Vec::new();
    for col in columns {
        let Some(bytes) = &encoded[col.ordinal] else {
            continue; // NULL: no length byte
        };
        let len = bytes.len();
        if col.max_encoded_len() > 255 && len > 127 {
            desc.push(0x80 | (len >> 8) as u8);
            desc.push(len as u8);
        } else {
            assert!(len <= 255, "length {} too large for one byte", len);
            desc.push(len as u8);
        }
    }
    desc.iter().rev().copied().collect()
}

pub fn encode_column_value(col: &Column, value: &Value) -> Vec<u8> {
    match (col.column_type, value) {
        (ColumnType::TinyInt, v) => int_bytes(col, v, 1),
        (ColumnType::SmallInt, v) => int_bytes(col, v, 2),
        (ColumnType::MediumInt, v) => int_bytes(col, v, 3),
        (ColumnType::Int, v) => int_bytes(col, v, 4),
        (ColumnType::BigInt, v) => int_bytes(col, v, 8),
        (ColumnType::Boolean, Value::Boolean(b)) => vec![*b as u8],
        (ColumnType::Year, Value::Year(y)) => {
            vec![if *y == 0 { 0 } else { (*y - 1900) as u8 }]
        }
        (ColumnType::Char, Value::Text(s)) => {
            let mut bytes = text_bytes(col.charset, s);
            if !col.charset.is_multibyte() {
                assert!(bytes.len() <= col.length, "CHAR value too long");
                bytes.resize(col.length, 0x20);
            }
            bytes
        }
        (
            ColumnType::Varchar
            | ColumnType::TinyText
            | ColumnType::Text
            | ColumnType::MediumText
            | ColumnType::LongText,
            Value::Text(s),
        ) => text_bytes(col.charset, s),
        (ColumnType::Binary, Value::Bytes(b)) => {
            let mut bytes = b.clone();
            assert!(bytes.len() <= col.length, "BINARY value too long");
            bytes.resize(col.length, 0);
            bytes
        }
        (
            ColumnType::VarBinary
            | ColumnType::TinyBlob
            | ColumnType::Blob
            | ColumnType::MediumBlob
            | ColumnType::LongBlob,
            Value::Bytes(b),
        ) => b.clone(),
        (ColumnType::Date, Value::Date { year, month, day }) => {
            let v = ((*year as u32) << 9) | ((*month as u32) << 5) | *day as u32;
            let stored = v ^ 0x80_0000;
            vec![(stored >> 16) as u8, (stored >> 8) as u8, stored as u8]
        }
        (ColumnType::Timestamp, Value::Timestamp { epoch, micros }) => {
            let mut bytes = epoch.to_be_bytes().to_vec();
            bytes.extend(fraction_bytes(*micros, col.precision));
            bytes
        }
        (
            ColumnType::DateTime,
            Value::DateTime {
                year,
                month,
                day,
                hour,
                minute,
                second,
                micros,
            },
        ) => {
            let ym = *year as u64 * 13 + *month as u64;
            let packed = (1u64 << 39)
                | (ym << 22)
                | ((*day as u64) << 17)
                | ((*hour as u64) << 12)
                | ((*minute as u64) << 6)
                | *second as u64;
            let mut bytes = packed.to_be_bytes()[3..].to_vec(); // low 5 bytes
            bytes.extend(fraction_bytes(*micros, col.precision));
            bytes
        }
        (
            ColumnType::Time,
            Value::Time {
                negative,
                hours,
                minutes,
                seconds,
                micros,
            },
        ) => {
            let frac_bytes = (col.precision + 1) / 2;
            let frac_bits = (frac_bytes * 8) as u32;
            let sign_val = 1u64 << (frac_bits + 23);
            let v = ((*hours as u64) << 12) | ((*minutes as u64) << 6) | *seconds as u64;
            let body = (v << frac_bits) | fraction_raw(*micros, col.precision) as u64;
            let packed = if *negative {
                sign_val - body
            } else {
                sign_val | body
            };
            let total = 3 + frac_bytes;
            packed.to_be_bytes()[8 - total..].to_vec()
        }
        (ty, v) => panic!("cannot encode {:?} as {}", v, ty),
    }
}

fn int_bytes(col: &Column, value: &Value, width: usize) -> Vec<u8> {
    let raw: u64 = match (col.unsigned, value) {
        (true, Value::UInt(v)) => *v,
        (false, Value::Int(v)) => (*v as u64) ^ (1 << (8 * width - 1)),
        _ => panic!("cannot encode {:?} into {}", value, col.name),
    };
    raw.to_be_bytes()[8 - width..].to_vec()
}

fn text_bytes(charset: Charset, s: &str) -> Vec<u8> {
    match charset {
        Charset::Ascii | Charset::Latin1 | Charset::Binary => s
            .chars()
            .map(|c| {
                let cp = c as u32;
                assert!(cp < 256, "character {:?} outside latin1", c);
                cp as u8
            })
            .collect(),
        Charset::Utf8 | Charset::Utf8mb4 => s.as_bytes().to_vec(),
    }
}

fn fraction_raw(micros: u32, precision: usize) -> u32 {
    let mut raw = micros;
    let mut p = precision;
    while p < 6 {
        raw /= 100;
        p += 2;
    }
    raw
}

fn fraction_bytes(micros: u32, precision: usize) -> Vec<u8> {
    if precision == 0 {
        return Vec::new();
    }
    let frac_bytes = (precision + 1) / 2;
    fraction_raw(micros, precision).to_be_bytes()[4 - frac_bytes..].to_vec()
}

/// Assembles a structurally valid INDEX page from encoded rows.
pub struct IndexPageBuilder {
    page_no: PageNo,
    space_id: u32,
    index_id: u64,
    lsn: u64,
    level: u16,
    prev: Option<PageNo>,
    next: Option<PageNo>,
    rows: Vec<RowImage>,
}

impl IndexPageBuilder {
    pub fn new(page_no: PageNo) -> Self {
        Self {
            page_no,
            space_id: 1,
            index_id: 0x100,
            lsn: 0x0001_2345,
            level: 0,
            prev: None,
            next: None,
            rows: Vec::new(),
        }
    }

    pub fn lsn(mut self, lsn: u64) -> Self {
        self.lsn = lsn;
        self
    }

    pub fn level(mut self, level: u16) -> Self {
        self.level = level;
        self
    }

    pub fn prev(mut self, page_no: PageNo) -> Self {
        self.prev = Some(page_no);
        self
    }

    pub fn next(mut self, page_no: PageNo) -> Self {
        self.next = Some(page_no);
        self
    }

    pub fn space_id(mut self, space_id: u32) -> Self {
        self.space_id = space_id;
        self
    }

    pub fn row(mut self, row: RowImage) -> Self {
        self.rows.push(row);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut page = vec![0u8; PAGE_SIZE];

        // Lay records into the heap after SUPREMUM's literal
        let mut origins = Vec::with_capacity(self.rows.len());
        let mut pos = SUPREMUM_ORIGIN + SYSTEM_RECORD_BYTES;
        for row in &self.rows {
            let origin = pos + row.pre.len() + RECORD_HEADER_SIZE;
            origins.push(origin);
            pos = origin + row.data.len();
        }
        let heap_top = pos;

        let record_type = if self.level == 0 {
            RecordType::Conventional
        } else {
            RecordType::NodePointer
        };
        for (i, row) in self.rows.iter().enumerate() {
            let origin = origins[i];
            let next_origin = origins.get(i + 1).copied().unwrap_or(SUPREMUM_ORIGIN);
            let header = record_header_bytes(
                false,
                false,
                0,
                (2 + i) as u16,
                record_type,
                (next_origin as i64 - origin as i64) as i16,
            );
            let pre_start = origin - RECORD_HEADER_SIZE - row.pre.len();
            page[pre_start..pre_start + row.pre.len()].copy_from_slice(&row.pre);
            page[origin - RECORD_HEADER_SIZE..origin].copy_from_slice(&header);
            page[origin..origin + row.data.len()].copy_from_slice(&row.data);
        }

        // System records
        let first_origin = origins.first().copied().unwrap_or(SUPREMUM_ORIGIN);
        let infimum_header = record_header_bytes(
            false,
            false,
            1,
            0,
            RecordType::Infimum,
            (first_origin as i64 - INFIMUM_ORIGIN as i64) as i16,
        );
        page[PAGE_DATA_OFFSET..INFIMUM_ORIGIN].copy_from_slice(&infimum_header);
        page[INFIMUM_ORIGIN..INFIMUM_ORIGIN + SYSTEM_RECORD_BYTES]
            .copy_from_slice(INFIMUM_LITERAL);
        let supremum_header = record_header_bytes(
            false,
            false,
            (self.rows.len() + 1).min(15) as u8,
            1,
            RecordType::Supremum,
            0,
        );
        page[SUPREMUM_ORIGIN - RECORD_HEADER_SIZE..SUPREMUM_ORIGIN]
            .copy_from_slice(&supremum_header);
        page[SUPREMUM_ORIGIN..SUPREMUM_ORIGIN + SYSTEM_RECORD_BYTES]
            .copy_from_slice(SUPREMUM_LITERAL);

        // FIL header
        write_u32(&mut page, 4, self.page_no);
        write_u32(&mut page, 8, self.prev.unwrap_or(FIL_NULL));
        write_u32(&mut page, 12, self.next.unwrap_or(FIL_NULL));
        write_u64(&mut page, 16, self.lsn);
        write_u16(&mut page, 24, PAGE_TYPE_INDEX);
        write_u32(&mut page, 34, self.space_id);

        // Index header
        write_u16(&mut page, 38, 2); // two directory slots
        write_u16(&mut page, 40, heap_top as u16);
        write_u16(&mut page, 42, 0x8000 | (2 + self.rows.len() as u16)); // compact flag + heap records
        write_u16(&mut page, 50, 5); // no direction
        write_u16(&mut page, 54, self.rows.len() as u16);
        write_u16(&mut page, 64, self.level);
        write_u64(&mut page, 66, self.index_id);

        // Directory: slot nearest the trailer points to INFIMUM
        let dir_start = PAGE_SIZE - FIL_TRAILER_SIZE - 2 * 2;
        write_u16(&mut page, dir_start, SUPREMUM_ORIGIN as u16);
        write_u16(&mut page, dir_start + 2, INFIMUM_ORIGIN as u16);

        // Trailer
        write_u32(&mut page, PAGE_SIZE - 4, self.lsn as u32);
        page
    }
}

/// A minimal non-INDEX page: FIL header and a trailer agreeing on the LSN.
pub fn blank_page(page_no: PageNo, page_type: u16, lsn: u64) -> Vec<u8> {
    let mut page = vec![0u8; PAGE_SIZE];
    write_u32(&mut page, 4, page_no);
    write_u32(&mut page, 8, FIL_NULL);
    write_u32(&mut page, 12, FIL_NULL);
    write_u64(&mut page, 16, lsn);
    write_u16(&mut page, 24, page_type);
    write_u32(&mut page, PAGE_SIZE - 4, lsn as u32);
    page
}

/// The schema most of the suite decodes against.
pub fn users_table() -> TableDef {
    let mut table = TableDef::new("users");
    table
        .add_column(Column::new("id", ColumnType::Int).not_null())
        .unwrap();
    table
        .add_column(
            Column::new("name", ColumnType::Varchar)
                .with_length(100)
                .with_charset(Charset::Utf8mb4),
        )
        .unwrap();
    table
        .add_column(
            Column::new("email", ColumnType::Varchar)
                .with_length(100)
                .with_charset(Charset::Utf8mb4),
        )
        .unwrap();
    table
        .add_column(Column::new("created_at", ColumnType::Timestamp))
        .unwrap();
    table.set_primary_key(&["id"]).unwrap();
    table
}

fn record_header_bytes(
    min_rec: bool,
    deleted: bool,
    n_owned: u8,
    heap_number: u16,
    record_type: RecordType,
    next_rec_offset: i16,
) -> [u8; RECORD_HEADER_SIZE] {
    let mut flags = 0u8;
    if min_rec {
        flags |= 0x1;
    }
    if deleted {
        flags |= 0x2;
    }
    let b0 = (flags << 4) | (n_owned & 0x0F);
    let b12 = (heap_number << 3) | record_type as u16;
    let next = next_rec_offset as u16;
    [
        b0,
        (b12 >> 8) as u8,
        b12 as u8,
        (next >> 8) as u8,
        next as u8,
    ]
}

fn write_u16(page: &mut [u8], offset: usize, value: u16) {
    page[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
}

fn write_u32(page: &mut [u8], offset: usize, value: u32) {
    page[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}

fn write_u64(page: &mut [u8], offset: usize, value: u64) {
    page[offset..offset + 8].copy_from_slice(&value.to_be_bytes());
}
