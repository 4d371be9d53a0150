use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A decoded column value.
///
/// The set of kinds is closed on purpose: every supported physical type
/// family maps into exactly one of these. Integers are widened to 64 bits
/// after the on-disk sign transformation, temporals keep their decoded
/// fields so that zero dates remain representable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Int(i64),
    UInt(u64),
    Boolean(bool),
    Text(String),
    Bytes(Vec<u8>),
    Date {
        year: u16,
        month: u8,
        day: u8,
    },
    DateTime {
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        micros: u32,
    },
    Time {
        negative: bool,
        hours: u16,
        minutes: u8,
        seconds: u8,
        micros: u32,
    },
    Timestamp {
        epoch: u32,
        micros: u32,
    },
    Year(u16),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Narrowing accessor used by callers that expect an integer column.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Int(v) => write!(f, "{}", v),
            Value::UInt(v) => write!(f, "{}", v),
            Value::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Value::Text(s) => write!(f, "{}", s),
            Value::Bytes(b) => write!(f, "BYTES({} bytes)", b.len()),
            Value::Date { year, month, day } => {
                write!(f, "{:04}-{:02}-{:02}", year, month, day)
            }
            Value::DateTime {
                year,
                month,
                day,
                hour,
                minute,
                second,
                micros,
            } => {
                write!(
                    f,
                    "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                    year, month, day, hour, minute, second
                )?;
                if *micros > 0 {
                    write!(f, ".{:06}", micros)?;
                }
                Ok(())
            }
            Value::Time {
                negative,
                hours,
                minutes,
                seconds,
                micros,
            } => {
                if *negative {
                    write!(f, "-")?;
                }
                write!(f, "{:02}:{:02}:{:02}", hours, minutes, seconds)?;
                if *micros > 0 {
                    write!(f, ".{:06}", micros)?;
                }
                Ok(())
            }
            Value::Timestamp { epoch, micros } => {
                if *epoch == 0 && *micros == 0 {
                    return write!(f, "0000-00-00 00:00:00");
                }
                match Utc.timestamp_opt(*epoch as i64, micros * 1000).single() {
                    Some(dt) => {
                        write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S"))?;
                        if *micros > 0 {
                            write!(f, ".{:06}", micros)?;
                        }
                        Ok(())
                    }
                    None => write!(f, "INVALID_TIMESTAMP({})", epoch),
                }
            }
            Value::Year(y) => write!(f, "{:04}", y),
        }
    }
}
