//! Sequential scan operator.

use crate::access::cursor::{HeapScan, TupleCursor};
use crate::access::schema::{FieldDescriptor, Schema};
use crate::access::tuple::Tuple;
use crate::catalog::{Catalog, TableId};
use crate::error::DbResult;
use crate::storage::buffer::PageSource;
use std::sync::Arc;

/// Scan of every record of one table, in no particular order.
///
/// Records are produced by a [`HeapScan`]; the operator adds the table alias
/// used to qualify field names in its output schema.
pub struct SeqScan {
    catalog: Arc<Catalog>,
    pages: Arc<dyn PageSource>,
    table_id: TableId,
    table_name: String,
    alias: Option<String>,
    scan: HeapScan,
}

impl SeqScan {
    pub fn new(
        catalog: Arc<Catalog>,
        pages: Arc<dyn PageSource>,
        table_id: TableId,
        alias: Option<&str>,
    ) -> DbResult<Self> {
        let table_name = catalog.table_name(table_id)?;
        let scan = HeapScan::new(pages.clone(), table_id);
        Ok(Self {
            catalog,
            pages,
            table_id,
            table_name,
            alias: alias.map(str::to_string),
            scan,
        })
    }

    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Table schema with every field renamed to `alias.field`. A missing
    /// alias or field name is written as `null`.
    pub fn schema(&self) -> DbResult<Schema> {
        let schema = self.catalog.schema(self.table_id)?;
        let prefix = self.alias.as_deref().unwrap_or("null");
        let fields = schema
            .iter()
            .map(|field| {
                let name = field.name.as_deref().unwrap_or("null");
                FieldDescriptor::new(Some(format!("{}.{}", prefix, name)), field.field_type)
            })
            .collect();
        Schema::new(fields)
    }

    /// Point the operator at another table. The scan is closed and must be
    /// reopened.
    pub fn reset(&mut self, table_id: TableId, alias: Option<&str>) -> DbResult<()> {
        let table_name = self.catalog.table_name(table_id)?;
        self.scan.close();
        self.table_id = table_id;
        self.table_name = table_name;
        self.alias = alias.map(str::to_string);
        self.scan = HeapScan::new(self.pages.clone(), table_id);
        Ok(())
    }
}

impl TupleCursor for SeqScan {
    fn open(&mut self) -> DbResult<()> {
        self.scan.open()
    }

    fn has_next(&mut self) -> DbResult<bool> {
        self.scan.has_next()
    }

    fn next(&mut self) -> DbResult<Tuple> {
        self.scan.next()
    }

    fn rewind(&mut self) -> DbResult<()> {
        self.scan.rewind()
    }

    fn close(&mut self) {
        self.scan.close()
    }
}
