//! Integer family: TINYINT through BIGINT, BOOLEAN, YEAR.
//!
//! Signed values are stored with the top bit of the high byte flipped so
//! that memcmp order matches numeric order. Decoding reads the unsigned
//! big-endian bytes, XORs the sign bit back, and sign-extends.

use crate::schema::{Column, ColumnType};
use crate::types::error::{PageError, Result};
use crate::types::value::Value;
use crate::utils::bytes::read_bytes;

pub fn decode(input: &[u8], offset: usize, col: &Column) -> Result<(Value, usize)> {
    match col.column_type {
        ColumnType::TinyInt => fixed_int(input, offset, 1, col.unsigned),
        ColumnType::SmallInt => fixed_int(input, offset, 2, col.unsigned),
        ColumnType::MediumInt => fixed_int(input, offset, 3, col.unsigned),
        ColumnType::Int => fixed_int(input, offset, 4, col.unsigned),
        ColumnType::BigInt => fixed_int(input, offset, 8, col.unsigned),
        ColumnType::Boolean => {
            let raw = read_bytes(input, offset, 1)?[0];
            Ok((Value::Boolean(raw != 0), 1))
        }
        ColumnType::Year => {
            // Single byte: 0 is the literal year 0, otherwise 1900 + v
            let raw = read_bytes(input, offset, 1)?[0];
            let year = if raw == 0 { 0 } else { 1900 + raw as u16 };
            Ok((Value::Year(year), 1))
        }
        other => Err(PageError::UnknownColumnType {
            column: col.name.clone(),
            column_type: other.to_string(),
        }),
    }
}

fn fixed_int(input: &[u8], offset: usize, width: usize, unsigned: bool) -> Result<(Value, usize)> {
    let raw = read_uint_be(input, offset, width)?;
    if unsigned {
        return Ok((Value::UInt(raw), width));
    }
    let flipped = raw ^ (1 << (8 * width - 1));
    // Shift through the full 64-bit register to sign-extend narrow widths
    // (MEDIUMINT included).
    let shift = 64 - 8 * width as u32;
    let value = ((flipped << shift) as i64) >> shift;
    Ok((Value::Int(value), width))
}

fn read_uint_be(input: &[u8], offset: usize, width: usize) -> Result<u64> {
    let bytes = read_bytes(input, offset, width)?;
    let mut v: u64 = 0;
    for b in bytes {
        v = (v << 8) | *b as u64;
    }
    Ok(v)
}
