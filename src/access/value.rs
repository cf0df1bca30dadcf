use crate::error::{DbError, DbResult};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::{Read, Write};

/// Maximum number of payload bytes stored for a string field.
pub const STRING_LEN: usize = 128;

/// Field types supported by the storage format. Every type has a fixed width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Int,
    String,
}

impl FieldType {
    /// Number of bytes a value of this type occupies inside a page slot.
    pub fn len(&self) -> usize {
        match self {
            FieldType::Int => 4,
            FieldType::String => STRING_LEN + 4,
        }
    }

    /// Decode one value of this type from `reader`.
    pub fn read_value<R: Read>(&self, reader: &mut R) -> DbResult<Value> {
        match self {
            FieldType::Int => Ok(Value::Int(reader.read_i32::<BigEndian>()?)),
            FieldType::String => {
                let len = reader.read_u32::<BigEndian>()? as usize;
                let mut payload = [0u8; STRING_LEN];
                reader.read_exact(&mut payload)?;
                if len > STRING_LEN {
                    return Err(DbError::InvalidArgument(format!(
                        "string length {} exceeds {}",
                        len, STRING_LEN
                    )));
                }
                let s = String::from_utf8(payload[..len].to_vec()).map_err(|e| {
                    DbError::InvalidArgument(format!("string field is not UTF-8: {}", e))
                })?;
                Ok(Value::String(s))
            }
        }
    }

    /// Parse a textual literal (as found in load files or on the command line).
    pub fn parse_value(&self, text: &str) -> DbResult<Value> {
        match self {
            FieldType::Int => text.trim().parse::<i32>().map(Value::Int).map_err(|e| {
                DbError::InvalidArgument(format!("invalid integer '{}': {}", text.trim(), e))
            }),
            FieldType::String => Ok(Value::String(text.trim().to_string())),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Int => f.write_str("int"),
            FieldType::String => f.write_str("string"),
        }
    }
}

impl std::str::FromStr for FieldType {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" => Ok(FieldType::Int),
            "string" | "str" => Ok(FieldType::String),
            other => Err(DbError::InvalidArgument(format!(
                "unknown field type '{}'",
                other
            ))),
        }
    }
}

/// A single field value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Int(i32),
    String(String),
}

impl Value {
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::Int(_) => FieldType::Int,
            Value::String(_) => FieldType::String,
        }
    }

    /// Encode this value in its fixed-width slot representation.
    ///
    /// Strings longer than [`STRING_LEN`] bytes are truncated at the nearest
    /// character boundary.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> DbResult<()> {
        match self {
            Value::Int(v) => writer.write_i32::<BigEndian>(*v)?,
            Value::String(s) => {
                let mut end = s.len().min(STRING_LEN);
                while !s.is_char_boundary(end) {
                    end -= 1;
                }
                let bytes = &s.as_bytes()[..end];
                writer.write_u32::<BigEndian>(bytes.len() as u32)?;
                writer.write_all(bytes)?;
                writer.write_all(&[0u8; STRING_LEN][..STRING_LEN - bytes.len()])?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::String(s) => f.write_str(s),
        }
    }
}
