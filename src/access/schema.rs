//! Record layout descriptors.

use crate::access::value::FieldType;
use crate::error::{DbError, DbResult};
use std::fmt;

/// Name and type of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: Option<String>,
    pub field_type: FieldType,
}

impl FieldDescriptor {
    pub fn new(name: Option<String>, field_type: FieldType) -> Self {
        Self { name, field_type }
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({})",
            self.field_type,
            self.name.as_deref().unwrap_or("null")
        )
    }
}

/// Ordered, typed field list describing the shape of a record.
///
/// Equality only looks at the number of fields and the type at each
/// position; field names are ignored. Two schemas that are equal are
/// therefore union compatible even when their columns are named differently.
/// `Schema` does not implement `Hash`.
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    pub fn new(fields: Vec<FieldDescriptor>) -> DbResult<Self> {
        if fields.is_empty() {
            return Err(DbError::InvalidArgument(
                "a schema needs at least one field".to_string(),
            ));
        }
        Ok(Self { fields })
    }

    /// Schema with anonymous fields.
    pub fn from_types(types: &[FieldType]) -> DbResult<Self> {
        Self::new(
            types
                .iter()
                .map(|t| FieldDescriptor::new(None, *t))
                .collect(),
        )
    }

    pub fn with_names(types: &[FieldType], names: &[&str]) -> DbResult<Self> {
        if types.len() != names.len() {
            return Err(DbError::InvalidArgument(format!(
                "{} types but {} names",
                types.len(),
                names.len()
            )));
        }
        Self::new(
            types
                .iter()
                .zip(names)
                .map(|(t, n)| FieldDescriptor::new(Some(n.to_string()), *t))
                .collect(),
        )
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, i: usize) -> DbResult<&FieldDescriptor> {
        self.fields
            .get(i)
            .ok_or_else(|| DbError::out_of_range("field index", i, self.fields.len()))
    }

    pub fn field_name(&self, i: usize) -> DbResult<Option<&str>> {
        Ok(self.field(i)?.name.as_deref())
    }

    pub fn field_type(&self, i: usize) -> DbResult<FieldType> {
        Ok(self.field(i)?.field_type)
    }

    /// Index of the first field called `name`. Unnamed fields never match.
    pub fn field_index_of(&self, name: &str) -> DbResult<usize> {
        self.fields
            .iter()
            .position(|f| f.name.as_deref() == Some(name))
            .ok_or_else(|| DbError::NotFound(format!("field '{}'", name)))
    }

    /// Size in bytes of one record with this layout.
    pub fn size(&self) -> usize {
        self.fields.iter().map(|f| f.field_type.len()).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    pub fn types(&self) -> Vec<FieldType> {
        self.fields.iter().map(|f| f.field_type).collect()
    }

    /// Concatenate two schemas: the fields of `first` followed by those of `second`.
    pub fn merge(first: &Schema, second: &Schema) -> Schema {
        let mut fields = Vec::with_capacity(first.num_fields() + second.num_fields());
        fields.extend(first.fields.iter().cloned());
        fields.extend(second.fields.iter().cloned());
        Schema { fields }
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(&other.fields)
                .all(|(a, b)| a.field_type == b.field_type)
    }
}

impl Eq for Schema {}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", field)?;
        }
        Ok(())
    }
}
