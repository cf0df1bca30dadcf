use crate::access::schema::Schema;
use crate::access::value::Value;
use crate::error::{DbError, DbResult};
use crate::storage::page::PageId;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Location of a tuple on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId {
    pub page_id: PageId,
    pub slot: u16,
}

impl RecordId {
    pub fn new(page_id: PageId, slot: u16) -> Self {
        Self { page_id, slot }
    }
}

impl PartialOrd for RecordId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RecordId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.page_id
            .table_id
            .cmp(&other.page_id.table_id)
            .then(self.page_id.page_number.cmp(&other.page_id.page_number))
            .then(self.slot.cmp(&other.slot))
    }
}

/// A record bound to a schema. Fields are absent until set.
#[derive(Debug, Clone)]
pub struct Tuple {
    schema: Arc<Schema>,
    fields: Vec<Option<Value>>,
    record_id: Option<RecordId>,
}

impl Tuple {
    pub fn new(schema: Arc<Schema>) -> Self {
        let fields = vec![None; schema.num_fields()];
        Self {
            schema,
            fields,
            record_id: None,
        }
    }

    /// Build a tuple with every field set, checking the values against `schema`.
    pub fn with_values(schema: Arc<Schema>, values: Vec<Value>) -> DbResult<Self> {
        if values.len() != schema.num_fields() {
            return Err(DbError::InvalidArgument(format!(
                "{} values for a schema with {} fields",
                values.len(),
                schema.num_fields()
            )));
        }
        let mut tuple = Self::new(schema);
        for (i, value) in values.into_iter().enumerate() {
            tuple.set_field(i, value)?;
        }
        Ok(tuple)
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn record_id(&self) -> Option<RecordId> {
        self.record_id
    }

    pub fn set_record_id(&mut self, record_id: Option<RecordId>) {
        self.record_id = record_id;
    }

    pub fn get_field(&self, i: usize) -> DbResult<Option<&Value>> {
        self.fields
            .get(i)
            .map(Option::as_ref)
            .ok_or_else(|| DbError::out_of_range("field index", i, self.fields.len()))
    }

    pub fn set_field(&mut self, i: usize, value: Value) -> DbResult<()> {
        let expected = self.schema.field_type(i)?;
        if value.field_type() != expected {
            return Err(DbError::TypeMismatch {
                expected: expected.to_string(),
                actual: value.field_type().to_string(),
            });
        }
        self.fields[i] = Some(value);
        Ok(())
    }

    pub fn fields(&self) -> impl Iterator<Item = Option<&Value>> {
        self.fields.iter().map(Option::as_ref)
    }

    /// Rebind to `schema`. Storage is reallocated and every field becomes absent.
    pub fn reset_schema(&mut self, schema: Arc<Schema>) {
        self.fields = vec![None; schema.num_fields()];
        self.schema = schema;
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str("\t")?;
            }
            match field {
                Some(value) => write!(f, "{}", value)?,
                None => f.write_str("null")?,
            }
        }
        writeln!(f)
    }
}
