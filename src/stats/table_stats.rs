use crate::access::cursor::{HeapScan, TupleCursor};
use crate::access::schema::Schema;
use crate::access::value::{FieldType, Value};
use crate::catalog::{Catalog, TableId};
use crate::error::{DbError, DbResult};
use crate::predicate::Op;
use crate::stats::histogram::IntHistogram;
use crate::stats::string_histogram::StringHistogram;
use crate::storage::buffer::PageSource;
use log::debug;
use std::sync::Arc;

/// Histogram kept for one field, matching the field's type.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldHistogram {
    Int(IntHistogram),
    String(StringHistogram),
}

impl FieldHistogram {
    fn for_field(
        field_type: FieldType,
        buckets: usize,
        bounds: Option<(i32, i32)>,
    ) -> DbResult<Self> {
        match field_type {
            FieldType::Int => {
                let (min, max) = bounds.unwrap_or((0, 0));
                Ok(FieldHistogram::Int(IntHistogram::new(buckets, min, max)?))
            }
            FieldType::String => Ok(FieldHistogram::String(StringHistogram::new(buckets)?)),
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            FieldHistogram::Int(_) => FieldType::Int,
            FieldHistogram::String(_) => FieldType::String,
        }
    }

    fn add(&mut self, value: &Value) {
        match (self, value) {
            (FieldHistogram::Int(h), Value::Int(v)) => h.add_value(*v),
            (FieldHistogram::String(h), Value::String(s)) => h.add_value(s),
            // Decoded records always match their schema
            _ => {}
        }
    }

    pub fn estimate_selectivity(&self, op: Op, value: &Value) -> DbResult<f64> {
        match (self, value) {
            (FieldHistogram::Int(h), Value::Int(v)) => Ok(h.estimate_selectivity(op, *v)),
            (FieldHistogram::String(h), Value::String(s)) => Ok(h.estimate_selectivity(op, s)),
            (h, v) => Err(DbError::TypeMismatch {
                expected: h.field_type().to_string(),
                actual: v.field_type().to_string(),
            }),
        }
    }

    pub fn avg_selectivity(&self) -> f64 {
        match self {
            FieldHistogram::Int(h) => h.avg_selectivity(),
            FieldHistogram::String(h) => h.avg_selectivity(),
        }
    }
}

/// Statistics of one table, built from a full two-pass scan.
///
/// The first pass finds the range of every integer field, the second feeds
/// each value into its field's histogram and counts the records. Once built
/// the statistics never change; recomputation produces a new value.
#[derive(Debug, Clone)]
pub struct TableStats {
    table_id: TableId,
    io_cost_per_page: u64,
    num_pages: u32,
    tuple_count: u64,
    field_names: Vec<Option<String>>,
    histograms: Vec<FieldHistogram>,
}

impl TableStats {
    pub fn compute(
        catalog: &Catalog,
        pages: Arc<dyn PageSource>,
        table_id: TableId,
        io_cost_per_page: u64,
        buckets: usize,
    ) -> DbResult<Self> {
        let schema = catalog.schema(table_id)?;
        Self::compute_with_schema(&schema, pages, table_id, io_cost_per_page, buckets)
    }

    /// Like [`TableStats::compute`], for a caller that already holds the schema.
    pub fn compute_with_schema(
        schema: &Schema,
        pages: Arc<dyn PageSource>,
        table_id: TableId,
        io_cost_per_page: u64,
        buckets: usize,
    ) -> DbResult<Self> {
        let num_pages = pages.num_pages(table_id)?;

        let mut scan = HeapScan::new(pages, table_id);
        scan.open()?;
        let built = Self::scan_histograms(&mut scan, schema, buckets);
        scan.close();
        let (tuple_count, histograms) = built?;

        debug!(
            "Statistics for table {}: {} tuples over {} pages",
            table_id, tuple_count, num_pages
        );

        Ok(Self {
            table_id,
            io_cost_per_page,
            num_pages,
            tuple_count,
            field_names: schema.iter().map(|f| f.name.clone()).collect(),
            histograms,
        })
    }

    fn scan_histograms(
        scan: &mut HeapScan,
        schema: &Schema,
        buckets: usize,
    ) -> DbResult<(u64, Vec<FieldHistogram>)> {
        // Pass 1: integer ranges
        let mut bounds: Vec<Option<(i32, i32)>> = vec![None; schema.num_fields()];
        for tuple in scan.records() {
            let tuple = tuple?;
            for (bound, value) in bounds.iter_mut().zip(tuple.fields()) {
                if let Some(Value::Int(v)) = value {
                    *bound = Some(match *bound {
                        Some((lo, hi)) => (lo.min(*v), hi.max(*v)),
                        None => (*v, *v),
                    });
                }
            }
        }

        scan.rewind()?;

        // Pass 2: histograms and record count
        let mut histograms = schema
            .iter()
            .zip(&bounds)
            .map(|(field, bound)| FieldHistogram::for_field(field.field_type, buckets, *bound))
            .collect::<DbResult<Vec<_>>>()?;
        let mut tuple_count = 0u64;
        for tuple in scan.records() {
            let tuple = tuple?;
            tuple_count += 1;
            for (histogram, value) in histograms.iter_mut().zip(tuple.fields()) {
                if let Some(value) = value {
                    histogram.add(value);
                }
            }
        }

        Ok((tuple_count, histograms))
    }

    /// Cost of reading the whole table: one IO per page, no seek cost.
    pub fn estimate_scan_cost(&self) -> f64 {
        self.num_pages as f64 * self.io_cost_per_page as f64
    }

    /// Number of records expected to pass a predicate of the given selectivity.
    pub fn estimate_table_cardinality(&self, selectivity: f64) -> u64 {
        (self.tuple_count as f64 * selectivity).ceil() as u64
    }

    pub fn estimate_selectivity(&self, field: usize, op: Op, constant: &Value) -> DbResult<f64> {
        self.field_histogram(field)?.estimate_selectivity(op, constant)
    }

    pub fn avg_selectivity(&self, field: usize) -> DbResult<f64> {
        Ok(self.field_histogram(field)?.avg_selectivity())
    }

    pub fn field_histogram(&self, field: usize) -> DbResult<&FieldHistogram> {
        self.histograms
            .get(field)
            .ok_or_else(|| DbError::out_of_range("field index", field, self.histograms.len()))
    }

    /// Histogram of the first field called `name`.
    pub fn histogram(&self, name: &str) -> Option<&FieldHistogram> {
        self.field_names
            .iter()
            .position(|n| n.as_deref() == Some(name))
            .and_then(|i| self.histograms.get(i))
    }

    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    pub fn total_tuples(&self) -> u64 {
        self.tuple_count
    }

    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    pub fn io_cost_per_page(&self) -> u64 {
        self.io_cost_per_page
    }

    pub fn field_names(&self) -> &[Option<String>] {
        &self.field_names
    }
}
