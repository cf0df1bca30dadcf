//! Bulk loading of delimited text into heap files.

use crate::access::schema::Schema;
use crate::access::value::Value;
use crate::error::{DbError, DbResult};
use crate::storage::page::HeapPage;
use log::debug;
use std::io::{BufRead, Write};

pub struct HeapFileEncoder;

impl HeapFileEncoder {
    /// Convert `separator`-delimited lines from `reader` into heap pages written
    /// to `writer`. Pages are filled in input order; only the last one may be
    /// partial. Returns the number of records written.
    pub fn convert<R: BufRead, W: Write>(
        reader: R,
        writer: &mut W,
        schema: &Schema,
        separator: char,
    ) -> DbResult<usize> {
        let slots = HeapPage::slots_per_page(schema);
        if slots == 0 {
            return Err(DbError::InvalidArgument(format!(
                "records of {} bytes do not fit in a page",
                schema.size()
            )));
        }

        let mut page: Vec<Vec<Value>> = Vec::with_capacity(slots);
        let mut count = 0;
        let mut pages = 0;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let parts: Vec<&str> = line.split(separator).collect();
            if parts.len() != schema.num_fields() {
                return Err(DbError::InvalidArgument(format!(
                    "line {}: expected {} fields, found {}",
                    line_no + 1,
                    schema.num_fields(),
                    parts.len()
                )));
            }

            let record = parts
                .iter()
                .zip(schema.iter())
                .map(|(text, field)| field.field_type.parse_value(text))
                .collect::<DbResult<Vec<_>>>()
                .map_err(|e| DbError::InvalidArgument(format!("line {}: {}", line_no + 1, e)))?;

            page.push(record);
            count += 1;

            if page.len() == slots {
                writer.write_all(&HeapPage::encode(schema, &page)?)?;
                page.clear();
                pages += 1;
            }
        }

        if !page.is_empty() {
            writer.write_all(&HeapPage::encode(schema, &page)?)?;
            pages += 1;
        }
        writer.flush()?;

        debug!("Encoded {} records into {} pages", count, pages);
        Ok(count)
    }

    /// Write one page per entry of `pages`, each holding exactly the given
    /// records. An empty entry produces an empty page.
    pub fn write_pages<W: Write>(
        writer: &mut W,
        schema: &Schema,
        pages: &[Vec<Vec<Value>>],
    ) -> DbResult<()> {
        for records in pages {
            writer.write_all(&HeapPage::encode(schema, records)?)?;
        }
        writer.flush()?;
        Ok(())
    }
}
