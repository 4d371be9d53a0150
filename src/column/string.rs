//! String and binary family. Variable-length types consume the byte count
//! recovered from the record's variable-length header; fixed CHAR/BINARY
//! consume their declared width. CHAR is right-trimmed of 0x20 padding,
//! BINARY is returned untouched.

use crate::schema::{Charset, Column, ColumnType};
use crate::types::error::{PageError, Result};
use crate::types::value::Value;
use crate::utils::bytes::read_bytes;

pub fn decode(
    input: &[u8],
    offset: usize,
    col: &Column,
    var_len: usize,
) -> Result<(Value, usize)> {
    match col.column_type {
        ColumnType::Char => {
            // Fixed width in single-byte charsets; content-dependent width
            // (from the variable-length header) in multi-byte charsets.
            let len = if col.charset.is_multibyte() {
                var_len
            } else {
                col.length
            };
            let bytes = read_bytes(input, offset, len)?;
            Ok((text_value(trim_char_padding(bytes), col.charset), len))
        }
        ColumnType::Varchar
        | ColumnType::TinyText
        | ColumnType::Text
        | ColumnType::MediumText
        | ColumnType::LongText => {
            let bytes = read_bytes(input, offset, var_len)?;
            Ok((text_value(bytes, col.charset), var_len))
        }
        ColumnType::Binary => {
            let bytes = read_bytes(input, offset, col.length)?;
            Ok((Value::Bytes(bytes.to_vec()), col.length))
        }
        ColumnType::VarBinary
        | ColumnType::TinyBlob
        | ColumnType::Blob
        | ColumnType::MediumBlob
        | ColumnType::LongBlob => {
            let bytes = read_bytes(input, offset, var_len)?;
            Ok((Value::Bytes(bytes.to_vec()), var_len))
        }
        other => Err(PageError::UnknownColumnType {
            column: col.name.clone(),
            column_type: other.to_string(),
        }),
    }
}

fn trim_char_padding(bytes: &[u8]) -> &[u8] {
    let mut end = bytes.len();
    while end > 0 && bytes[end - 1] == 0x20 {
        end -= 1;
    }
    &bytes[..end]
}

fn text_value(bytes: &[u8], charset: Charset) -> Value {
    match charset {
        Charset::Binary => Value::Bytes(bytes.to_vec()),
        // Latin-1 code points map directly onto the first Unicode block
        Charset::Ascii | Charset::Latin1 => {
            Value::Text(bytes.iter().map(|&b| b as char).collect())
        }
        Charset::Utf8 | Charset::Utf8mb4 => {
            Value::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
