//! Temporal family. All packed payloads are big-endian. Fractional-second
//! tails follow the MySQL ≥ 5.6.4 encoding: `ceil(precision / 2)` bytes,
//! scaled to microseconds by repeated ×100 until six digits of precision.

use crate::schema::{Column, ColumnType};
use crate::types::error::{PageError, Result};
use crate::types::value::Value;
use crate::utils::bytes::{read_bytes, read_u24_be, read_u32_be};

pub fn decode(input: &[u8], offset: usize, col: &Column) -> Result<(Value, usize)> {
    match col.column_type {
        ColumnType::Date => decode_date(input, offset),
        ColumnType::Timestamp => decode_timestamp(input, offset, col.precision),
        ColumnType::DateTime => decode_datetime(input, offset, col.precision),
        ColumnType::Time => decode_time(input, offset, col.precision),
        other => Err(PageError::UnknownColumnType {
            column: col.name.clone(),
            column_type: other.to_string(),
        }),
    }
}

/// DATE: 3 bytes, sign bit flipped like the integers.
/// Bit layout after the flip: 15-bit year, 4-bit month, 5-bit day.
fn decode_date(input: &[u8], offset: usize) -> Result<(Value, usize)> {
    let v = read_u24_be(input, offset)? ^ 0x80_0000;
    let day = (v & 0x1F) as u8;
    let month = ((v >> 5) & 0x0F) as u8;
    let year = (v >> 9) as u16;
    Ok((Value::Date { year, month, day }, 3))
}

/// TIMESTAMP: 4-byte seconds since the Unix epoch, UTC, plus the
/// fractional tail.
fn decode_timestamp(input: &[u8], offset: usize, precision: usize) -> Result<(Value, usize)> {
    let epoch = read_u32_be(input, offset)?;
    let (micros, frac_bytes) = read_fraction(input, offset + 4, precision)?;
    Ok((Value::Timestamp { epoch, micros }, 4 + frac_bytes))
}

/// DATETIME: 40-bit big-endian packed field.
/// MSB to LSB: 1 sign, 17 year·13+month, 5 day, 5 hour, 6 minute, 6 second.
fn decode_datetime(input: &[u8], offset: usize, precision: usize) -> Result<(Value, usize)> {
    let bytes = read_bytes(input, offset, 5)?;
    let mut packed: u64 = 0;
    for b in bytes {
        packed = (packed << 8) | *b as u64;
    }

    let second = (packed & 0x3F) as u8;
    packed >>= 6;
    let minute = (packed & 0x3F) as u8;
    packed >>= 6;
    let hour = (packed & 0x1F) as u8;
    packed >>= 5;
    let day = (packed & 0x1F) as u8;
    packed >>= 5;
    let year_month = (packed & 0x1_FFFF) as u32;

    let year = (year_month / 13) as u16;
    let month = (year_month % 13) as u8;

    let (micros, frac_bytes) = read_fraction(input, offset + 5, precision)?;
    Ok((
        Value::DateTime {
            year,
            month,
            day,
            hour,
            minute,
            second,
            micros,
        },
        5 + frac_bytes,
    ))
}

/// TIME: 3-byte packed field (1 sign, 1 unused, 10 hour, 6 minute,
/// 6 second) with the fractional tail appended before interpretation.
/// The sign bit sits above the fraction; values with the bit clear are
/// negative and stored as `2^sign_pos − value`.
fn decode_time(input: &[u8], offset: usize, precision: usize) -> Result<(Value, usize)> {
    let frac_bytes = (precision + 1) / 2;
    let total = 3 + frac_bytes;
    let bytes = read_bytes(input, offset, total)?;
    let mut packed: u64 = 0;
    for b in bytes {
        packed = (packed << 8) | *b as u64;
    }

    let frac_bits = (frac_bytes * 8) as u32;
    let sign_val = 1u64 << (frac_bits + 23);
    let negative = packed & sign_val == 0;
    if negative {
        packed = sign_val - packed;
    }

    let raw_frac = (packed & ((1u64 << frac_bits) - 1)) as u32;
    let micros = scale_to_micros(raw_frac, precision);
    packed >>= frac_bits;

    let seconds = (packed & 0x3F) as u8;
    packed >>= 6;
    let minutes = (packed & 0x3F) as u8;
    packed >>= 6;
    let hours = (packed & 0x3FF) as u16;

    Ok((
        Value::Time {
            negative,
            hours,
            minutes,
            seconds,
            micros,
        },
        total,
    ))
}

fn read_fraction(input: &[u8], offset: usize, precision: usize) -> Result<(u32, usize)> {
    if precision == 0 {
        return Ok((0, 0));
    }
    let frac_bytes = (precision + 1) / 2;
    let bytes = read_bytes(input, offset, frac_bytes)?;
    let mut raw: u32 = 0;
    for b in bytes {
        raw = (raw << 8) | *b as u32;
    }
    Ok((scale_to_micros(raw, precision), frac_bytes))
}

fn scale_to_micros(raw: u32, precision: usize) -> u32 {
    let mut micros = raw;
    let mut p = precision;
    while p < 6 {
        micros = micros.saturating_mul(100);
        p += 2;
    }
    micros
}
