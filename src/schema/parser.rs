//! CREATE TABLE → [`TableDef`] translation.
//!
//! Only the pieces of the statement that drive record decoding are kept:
//! column types and lengths, signedness, nullability, charset, and the
//! primary key (from column options or the table-level constraint).

use sqlparser::ast::{
    CharacterLength, ColumnDef, ColumnOption, DataType as SqlType, Statement, TableConstraint,
};
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;

use crate::schema::{Charset, Column, ColumnType, TableDef};
use crate::types::error::{PageError, Result};

pub fn table_def_from_sql(sql: &str) -> Result<TableDef> {
    let statements = Parser::parse_sql(&MySqlDialect {}, sql)
        .map_err(|e| PageError::Sql(format!("parse failed: {e}")))?;
    if statements.len() != 1 {
        return Err(PageError::Sql(format!(
            "expected exactly one statement, got {}",
            statements.len()
        )));
    }
    match &statements[0] {
        Statement::CreateTable {
            name,
            columns,
            constraints,
            default_charset,
            ..
        } => build_table_def(
            &name.to_string(),
            columns,
            constraints,
            default_charset.as_deref(),
        ),
        _ => Err(PageError::Sql("statement is not CREATE TABLE".into())),
    }
}

fn build_table_def(
    name: &str,
    columns: &[ColumnDef],
    constraints: &[TableConstraint],
    default_charset: Option<&str>,
) -> Result<TableDef> {
    let table_charset = match default_charset {
        Some(cs) => Charset::from_name(cs)
            .ok_or_else(|| PageError::Sql(format!("unknown character set '{cs}'")))?,
        None => Charset::Utf8mb4,
    };

    let mut table = TableDef::new(name.trim_matches('`'));
    let mut primary_keys: Vec<String> = Vec::new();

    for def in columns {
        let column = convert_column(def, table_charset)?;
        if is_column_level_primary_key(def) {
            primary_keys.push(column.name.clone());
        }
        table.add_column(column)?;
    }

    // A table-level PRIMARY KEY constraint overrides column options
    for constraint in constraints {
        if let TableConstraint::Unique {
            is_primary: true,
            columns,
            ..
        } = constraint
        {
            primary_keys = columns
                .iter()
                .map(|c| c.value.trim_matches('`').to_string())
                .collect();
        }
    }

    if !primary_keys.is_empty() {
        let names: Vec<&str> = primary_keys.iter().map(|s| s.as_str()).collect();
        table.set_primary_key(&names)?;
    }
    Ok(table)
}

fn is_column_level_primary_key(def: &ColumnDef) -> bool {
    def.options.iter().any(|opt| {
        matches!(
            opt.option,
            ColumnOption::Unique {
                is_primary: true,
                ..
            }
        )
    })
}

fn convert_column(def: &ColumnDef, table_charset: Charset) -> Result<Column> {
    let name = def.name.value.trim_matches('`').to_string();
    let (column_type, length, precision, unsigned) = convert_type(&name, &def.data_type)?;

    let mut column = Column::new(name, column_type)
        .with_length(length)
        .with_precision(precision);
    if unsigned {
        column = column.unsigned();
    }

    column.charset = match column_type {
        ColumnType::Binary
        | ColumnType::VarBinary
        | ColumnType::TinyBlob
        | ColumnType::Blob
        | ColumnType::MediumBlob
        | ColumnType::LongBlob => Charset::Binary,
        _ => table_charset,
    };

    for opt in &def.options {
        match &opt.option {
            ColumnOption::NotNull => column.nullable = false,
            ColumnOption::Null => column.nullable = true,
            ColumnOption::CharacterSet(cs) => {
                let cs = cs.to_string();
                column.charset = Charset::from_name(&cs)
                    .ok_or_else(|| PageError::Sql(format!("unknown character set '{cs}'")))?;
            }
            _ => {}
        }
    }
    Ok(column)
}

fn convert_type(name: &str, sql_type: &SqlType) -> Result<(ColumnType, usize, usize, bool)> {
    let t = match sql_type {
        SqlType::TinyInt(_) => (ColumnType::TinyInt, 0, 0, false),
        SqlType::UnsignedTinyInt(_) => (ColumnType::TinyInt, 0, 0, true),
        SqlType::SmallInt(_) => (ColumnType::SmallInt, 0, 0, false),
        SqlType::UnsignedSmallInt(_) => (ColumnType::SmallInt, 0, 0, true),
        SqlType::MediumInt(_) => (ColumnType::MediumInt, 0, 0, false),
        SqlType::UnsignedMediumInt(_) => (ColumnType::MediumInt, 0, 0, true),
        SqlType::Int(_) | SqlType::Integer(_) => (ColumnType::Int, 0, 0, false),
        SqlType::UnsignedInt(_) | SqlType::UnsignedInteger(_) => (ColumnType::Int, 0, 0, true),
        SqlType::BigInt(_) => (ColumnType::BigInt, 0, 0, false),
        SqlType::UnsignedBigInt(_) => (ColumnType::BigInt, 0, 0, true),
        SqlType::Boolean => (ColumnType::Boolean, 0, 0, false),
        SqlType::Char(len) | SqlType::Character(len) => {
            (ColumnType::Char, char_length(len, 1), 0, false)
        }
        SqlType::Varchar(len) | SqlType::CharacterVarying(len) => {
            (ColumnType::Varchar, char_length(len, 0), 0, false)
        }
        SqlType::Text => (ColumnType::Text, 0, 0, false),
        SqlType::Binary(len) => (ColumnType::Binary, len.unwrap_or(1) as usize, 0, false),
        SqlType::Varbinary(len) => (ColumnType::VarBinary, len.unwrap_or(0) as usize, 0, false),
        SqlType::Blob(_) => (ColumnType::Blob, 0, 0, false),
        SqlType::Date => (ColumnType::Date, 0, 0, false),
        SqlType::Time(precision, _) => (ColumnType::Time, 0, temporal_precision(precision)?, false),
        SqlType::Datetime(precision) => {
            (ColumnType::DateTime, 0, temporal_precision(precision)?, false)
        }
        SqlType::Timestamp(precision, _) => {
            (ColumnType::Timestamp, 0, temporal_precision(precision)?, false)
        }
        SqlType::Decimal(_) | SqlType::Dec(_) => (ColumnType::Decimal, 0, 0, false),
        SqlType::Numeric(_) => (ColumnType::Decimal, 0, 0, false),
        SqlType::Float(_) | SqlType::Real => (ColumnType::Float, 0, 0, false),
        SqlType::Double | SqlType::DoublePrecision => (ColumnType::Double, 0, 0, false),
        SqlType::JSON => (ColumnType::Json, 0, 0, false),
        SqlType::Enum(_) => (ColumnType::Enum, 0, 0, false),
        SqlType::Set(_) => (ColumnType::Set, 0, 0, false),
        SqlType::Custom(obj, _) => {
            let upper = obj.to_string().to_ascii_uppercase();
            let ty = match upper.as_str() {
                "YEAR" => ColumnType::Year,
                "BOOL" | "BOOLEAN" => ColumnType::Boolean,
                "TINYTEXT" => ColumnType::TinyText,
                "MEDIUMTEXT" => ColumnType::MediumText,
                "LONGTEXT" => ColumnType::LongText,
                "TINYBLOB" => ColumnType::TinyBlob,
                "MEDIUMBLOB" => ColumnType::MediumBlob,
                "LONGBLOB" => ColumnType::LongBlob,
                "BIT" => ColumnType::Bit,
                _ => {
                    return Err(PageError::Sql(format!(
                        "column '{name}' has unrecognized type {upper}"
                    )))
                }
            };
            (ty, 0, 0, false)
        }
        other => {
            return Err(PageError::Sql(format!(
                "column '{name}' has unrecognized type {other}"
            )))
        }
    };
    Ok(t)
}

fn char_length(len: &Option<CharacterLength>, default: usize) -> usize {
    match len {
        Some(CharacterLength::IntegerLength { length, .. }) => *length as usize,
        Some(CharacterLength::Max) => 65_535,
        None => default,
    }
}

fn temporal_precision(precision: &Option<u64>) -> Result<usize> {
    match precision {
        None => Ok(0),
        Some(p) if *p <= 6 => Ok(*p as usize),
        Some(p) => Err(PageError::Sql(format!(
            "fractional-second precision {p} is out of range (0..=6)"
        ))),
    }
}
