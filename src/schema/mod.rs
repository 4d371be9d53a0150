pub mod parser;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::error::{PageError, Result};

/// MySQL column data types known to the decoder. Types past the supported
/// set are carried so a schema mentioning them still constructs; decoding
/// such a column fails with `UnknownColumnType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    TinyInt,
    SmallInt,
    MediumInt,
    Int,
    BigInt,
    Boolean,
    Char,
    Varchar,
    TinyText,
    Text,
    MediumText,
    LongText,
    Binary,
    VarBinary,
    TinyBlob,
    Blob,
    MediumBlob,
    LongBlob,
    Date,
    Time,
    DateTime,
    Timestamp,
    Year,
    // Declared but not decodable
    Decimal,
    Float,
    Double,
    Bit,
    Enum,
    Set,
    Json,
}

impl ColumnType {
    pub fn is_supported(&self) -> bool {
        !matches!(
            self,
            ColumnType::Decimal
                | ColumnType::Float
                | ColumnType::Double
                | ColumnType::Bit
                | ColumnType::Enum
                | ColumnType::Set
                | ColumnType::Json
        )
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ColumnType::TinyInt => "TINYINT",
            ColumnType::SmallInt => "SMALLINT",
            ColumnType::MediumInt => "MEDIUMINT",
            ColumnType::Int => "INT",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Char => "CHAR",
            ColumnType::Varchar => "VARCHAR",
            ColumnType::TinyText => "TINYTEXT",
            ColumnType::Text => "TEXT",
            ColumnType::MediumText => "MEDIUMTEXT",
            ColumnType::LongText => "LONGTEXT",
            ColumnType::Binary => "BINARY",
            ColumnType::VarBinary => "VARBINARY",
            ColumnType::TinyBlob => "TINYBLOB",
            ColumnType::Blob => "BLOB",
            ColumnType::MediumBlob => "MEDIUMBLOB",
            ColumnType::LongBlob => "LONGBLOB",
            ColumnType::Date => "DATE",
            ColumnType::Time => "TIME",
            ColumnType::DateTime => "DATETIME",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Year => "YEAR",
            ColumnType::Decimal => "DECIMAL",
            ColumnType::Float => "FLOAT",
            ColumnType::Double => "DOUBLE",
            ColumnType::Bit => "BIT",
            ColumnType::Enum => "ENUM",
            ColumnType::Set => "SET",
            ColumnType::Json => "JSON",
        };
        write!(f, "{}", name)
    }
}

/// Character sets the decoder understands. The multiplier feeds the
/// one-vs-two-byte variable-length header decision and the CHAR rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Charset {
    Binary,
    Ascii,
    Latin1,
    Utf8,
    Utf8mb4,
}

impl Charset {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "binary" => Some(Charset::Binary),
            "ascii" => Some(Charset::Ascii),
            "latin1" => Some(Charset::Latin1),
            "utf8" | "utf8mb3" => Some(Charset::Utf8),
            "utf8mb4" => Some(Charset::Utf8mb4),
            _ => None,
        }
    }

    /// Maximum bytes per character.
    pub fn mbmaxlen(&self) -> usize {
        match self {
            Charset::Binary | Charset::Ascii | Charset::Latin1 => 1,
            Charset::Utf8 => 3,
            Charset::Utf8mb4 => 4,
        }
    }

    pub fn is_multibyte(&self) -> bool {
        self.mbmaxlen() > 1
    }
}

/// A column definition. Built either programmatically via the chained
/// constructors or from a CREATE TABLE statement (see [`parser`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    /// Position in the table, 0-based. Assigned by `TableDef::add_column`.
    pub ordinal: usize,
    /// Declared length: characters for CHAR/VARCHAR, bytes for BINARY and
    /// VARBINARY.
    pub length: usize,
    /// Fractional-second precision for temporal types (0..=6).
    pub precision: usize,
    pub scale: usize,
    pub nullable: bool,
    pub unsigned: bool,
    pub charset: Charset,
    pub is_primary_key: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            ordinal: 0,
            length: 0,
            precision: 0,
            scale: 0,
            nullable: true,
            unsigned: false,
            charset: Charset::Utf8mb4,
            is_primary_key: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.nullable = false;
        self
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    /// Whether the record stores this column with an explicit length in
    /// the variable-length header. CHAR counts as variable in multi-byte
    /// charsets since its byte width then depends on the content.
    pub fn is_variable_length(&self) -> bool {
        match self.column_type {
            ColumnType::Varchar
            | ColumnType::VarBinary
            | ColumnType::TinyText
            | ColumnType::Text
            | ColumnType::MediumText
            | ColumnType::LongText
            | ColumnType::TinyBlob
            | ColumnType::Blob
            | ColumnType::MediumBlob
            | ColumnType::LongBlob
            | ColumnType::Json => true,
            ColumnType::Char => self.charset.is_multibyte(),
            _ => false,
        }
    }

    /// Upper bound on the encoded byte width, used to decide whether a
    /// variable-length header can use the two-byte escape.
    pub fn max_encoded_len(&self) -> usize {
        match self.column_type {
            ColumnType::Varchar | ColumnType::Char => self.length * self.charset.mbmaxlen(),
            ColumnType::VarBinary | ColumnType::Binary => self.length,
            ColumnType::TinyText | ColumnType::TinyBlob => 255,
            ColumnType::Text | ColumnType::Blob => 65_535,
            ColumnType::MediumText | ColumnType::MediumBlob => 16_777_215,
            ColumnType::LongText | ColumnType::LongBlob | ColumnType::Json => u32::MAX as usize,
            _ => 0,
        }
    }
}

/// An immutable table descriptor with metadata precomputed for the record
/// decoder: the nullable, variable-length and primary-key column lists
/// plus per-ordinal lookups into them.
#[derive(Debug, Clone, Serialize)]
pub struct TableDef {
    pub name: String,
    columns: Vec<Column>,
    #[serde(skip)]
    by_name: HashMap<String, usize>,
    #[serde(skip)]
    nullable_ordinals: Vec<usize>,
    #[serde(skip)]
    varlen_ordinals: Vec<usize>,
    #[serde(skip)]
    pk_ordinals: Vec<usize>,
    /// ordinal -> index within the nullable-column list
    #[serde(skip)]
    null_index: Vec<Option<usize>>,
    /// ordinal -> index within the variable-length-column list
    #[serde(skip)]
    var_index: Vec<Option<usize>>,
}

impl TableDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            by_name: HashMap::new(),
            nullable_ordinals: Vec::new(),
            varlen_ordinals: Vec::new(),
            pk_ordinals: Vec::new(),
            null_index: Vec::new(),
            var_index: Vec::new(),
        }
    }

    pub fn add_column(&mut self, mut column: Column) -> Result<()> {
        if self.by_name.contains_key(&column.name) {
            return Err(PageError::Sql(format!(
                "column '{}' already exists in table '{}'",
                column.name, self.name
            )));
        }
        column.ordinal = self.columns.len();
        self.by_name.insert(column.name.clone(), column.ordinal);
        self.columns.push(column);
        self.recompute();
        Ok(())
    }

    /// Marks the named columns as the primary key, in the given order.
    /// Primary-key columns are forced NOT NULL.
    pub fn set_primary_key(&mut self, names: &[&str]) -> Result<()> {
        for col in &mut self.columns {
            col.is_primary_key = false;
        }
        for name in names {
            let ordinal = *self.by_name.get(*name).ok_or_else(|| {
                PageError::Sql(format!(
                    "primary key column '{}' not found in table '{}'",
                    name, self.name
                ))
            })?;
            self.columns[ordinal].is_primary_key = true;
            self.columns[ordinal].nullable = false;
        }
        self.recompute();
        Ok(())
    }

    fn recompute(&mut self) {
        self.nullable_ordinals.clear();
        self.varlen_ordinals.clear();
        self.pk_ordinals.clear();
        self.null_index = vec![None; self.columns.len()];
        self.var_index = vec![None; self.columns.len()];
        for col in &self.columns {
            if col.nullable {
                self.null_index[col.ordinal] = Some(self.nullable_ordinals.len());
                self.nullable_ordinals.push(col.ordinal);
            }
            if col.is_variable_length() {
                self.var_index[col.ordinal] = Some(self.varlen_ordinals.len());
                self.varlen_ordinals.push(col.ordinal);
            }
            if col.is_primary_key {
                self.pk_ordinals.push(col.ordinal);
            }
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.by_name.get(name).map(|&i| &self.columns[i])
    }

    pub fn primary_key_columns(&self) -> impl Iterator<Item = &Column> {
        self.pk_ordinals.iter().map(|&i| &self.columns[i])
    }

    pub fn varlen_columns(&self) -> impl Iterator<Item = &Column> {
        self.varlen_ordinals.iter().map(|&i| &self.columns[i])
    }

    pub fn primary_key_varlen_columns(&self) -> impl Iterator<Item = &Column> {
        self.pk_ordinals
            .iter()
            .map(|&i| &self.columns[i])
            .filter(|c| c.is_variable_length())
    }

    pub fn has_primary_key(&self) -> bool {
        !self.pk_ordinals.is_empty()
    }

    pub fn has_nullable_column(&self) -> bool {
        !self.nullable_ordinals.is_empty()
    }

    pub fn nullable_count(&self) -> usize {
        self.nullable_ordinals.len()
    }

    pub fn null_bitmap_size(&self) -> usize {
        (self.nullable_ordinals.len() + 7) / 8
    }

    /// Index of the column within the nullable list, if it is nullable.
    pub fn null_index_of(&self, ordinal: usize) -> Option<usize> {
        self.null_index.get(ordinal).copied().flatten()
    }

    /// Index of the column within the variable-length list.
    pub fn var_index_of(&self, ordinal: usize) -> Option<usize> {
        self.var_index.get(ordinal).copied().flatten()
    }
}
