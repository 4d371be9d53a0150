//! Schema-driven column decoders, one module per physical type family.
//! Each decoder returns the typed value plus the number of bytes consumed
//! from the record's data section.

pub mod datetime;
pub mod int;
pub mod string;

use crate::schema::{Column, ColumnType};
use crate::types::error::{PageError, Result};
use crate::types::value::Value;

pub fn decode(input: &[u8], offset: usize, col: &Column, var_len: usize) -> Result<(Value, usize)> {
    match col.column_type {
        ColumnType::TinyInt
        | ColumnType::SmallInt
        | ColumnType::MediumInt
        | ColumnType::Int
        | ColumnType::BigInt
        | ColumnType::Boolean
        | ColumnType::Year => int::decode(input, offset, col),

        ColumnType::Char
        | ColumnType::Varchar
        | ColumnType::TinyText
        | ColumnType::Text
        | ColumnType::MediumText
        | ColumnType::LongText
        | ColumnType::Binary
        | ColumnType::VarBinary
        | ColumnType::TinyBlob
        | ColumnType::Blob
        | ColumnType::MediumBlob
        | ColumnType::LongBlob => string::decode(input, offset, col, var_len),

        ColumnType::Date | ColumnType::Time | ColumnType::DateTime | ColumnType::Timestamp => {
            datetime::decode(input, offset, col)
        }

        other => Err(PageError::UnknownColumnType {
            column: col.name.clone(),
            column_type: other.to_string(),
        }),
    }
}
