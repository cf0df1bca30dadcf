//! Sequential, restartable cursors over the records of a table.

use crate::access::tuple::Tuple;
use crate::catalog::TableId;
use crate::error::{DbError, DbResult};
use crate::storage::buffer::PageSource;
use crate::storage::page::{HeapPage, PageId, Permissions};
use log::trace;
use std::sync::Arc;

/// Contract for iterating every record of a table.
///
/// `open` must precede `has_next`/`next`. A cursor is owned by one caller at a
/// time; its position is plain mutable state.
pub trait TupleCursor {
    fn open(&mut self) -> DbResult<()>;

    /// `false` when the cursor is not open or has no more records.
    fn has_next(&mut self) -> DbResult<bool>;

    /// Next record. `State` if the cursor is not open, `NoSuchElement` once
    /// it is exhausted.
    fn next(&mut self) -> DbResult<Tuple>;

    /// Restart from the first record. Only valid while open.
    fn rewind(&mut self) -> DbResult<()>;

    fn close(&mut self);

    /// Adapt an open cursor into an [`Iterator`]. Iteration stops after the
    /// first error.
    fn records(&mut self) -> Records<'_, Self>
    where
        Self: Sized,
    {
        Records {
            cursor: self,
            failed: false,
        }
    }
}

pub struct Records<'a, C: TupleCursor> {
    cursor: &'a mut C,
    failed: bool,
}

impl<C: TupleCursor> Iterator for Records<'_, C> {
    type Item = DbResult<Tuple>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = match self.cursor.has_next() {
            Ok(true) => self.cursor.next(),
            Ok(false) => return None,
            Err(e) => Err(e),
        };
        self.failed = result.is_err();
        Some(result)
    }
}

/// Cursor over a heap-file table, holding one page of records at a time.
///
/// Pages are requested read-only from a [`PageSource`] in ascending page
/// number; empty pages are skipped. A full pass yields each stored record
/// exactly once in (page, slot) order.
pub struct HeapScan {
    pages: Arc<dyn PageSource>,
    table_id: TableId,
    is_open: bool,
    page_number: u32,
    page: Option<Arc<HeapPage>>,
    index: usize,
}

impl HeapScan {
    pub fn new(pages: Arc<dyn PageSource>, table_id: TableId) -> Self {
        Self {
            pages,
            table_id,
            is_open: false,
            page_number: 0,
            page: None,
            index: 0,
        }
    }

    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    fn load_page(&self, page_number: u32) -> DbResult<Arc<HeapPage>> {
        trace!("Scan of table {} moving to page {}", self.table_id, page_number);
        self.pages.fetch_page(
            PageId::new(self.table_id, page_number),
            Permissions::ReadOnly,
        )
    }

    /// Position on page 0, or on nothing when the table has no pages.
    fn load_first_page(&mut self) -> DbResult<()> {
        self.page = None;
        self.page_number = 0;
        self.index = 0;
        if self.pages.num_pages(self.table_id)? > 0 {
            self.page = Some(self.load_page(0)?);
        }
        Ok(())
    }
}

impl TupleCursor for HeapScan {
    fn open(&mut self) -> DbResult<()> {
        self.load_first_page()?;
        self.is_open = true;
        Ok(())
    }

    fn has_next(&mut self) -> DbResult<bool> {
        if !self.is_open {
            return Ok(false);
        }

        loop {
            if let Some(page) = &self.page {
                if self.index < page.len() {
                    return Ok(true);
                }
            }

            let next_page = match self.page {
                Some(_) => self.page_number + 1,
                None => 0,
            };
            if next_page >= self.pages.num_pages(self.table_id)? {
                return Ok(false);
            }

            self.page = Some(self.load_page(next_page)?);
            self.page_number = next_page;
            self.index = 0;
        }
    }

    fn next(&mut self) -> DbResult<Tuple> {
        if !self.is_open {
            return Err(DbError::State("next() on a cursor that is not open"));
        }
        if !self.has_next()? {
            return Err(DbError::NoSuchElement);
        }

        let tuple = self
            .page
            .as_ref()
            .and_then(|page| page.tuples().get(self.index))
            .cloned()
            .ok_or(DbError::NoSuchElement)?;
        self.index += 1;
        Ok(tuple)
    }

    fn rewind(&mut self) -> DbResult<()> {
        if !self.is_open {
            return Err(DbError::State("rewind() on a cursor that is not open"));
        }
        self.load_first_page()
    }

    fn close(&mut self) {
        self.is_open = false;
        self.page = None;
        self.index = 0;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::access::schema::Schema;
    use crate::access::tuple::RecordId;
    use crate::access::value::{FieldType, Value};
    use anyhow::Result;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory page source for exercising cursors without files.
    pub(crate) struct MemoryPages {
        table_id: TableId,
        pages: Vec<Arc<HeapPage>>,
        fail_on: Option<u32>,
        fetches: AtomicUsize,
    }

    impl MemoryPages {
        /// One page per entry; each entry lists the integer values of the
        /// single-field records stored on it.
        pub(crate) fn new(table_id: TableId, layout: &[Vec<i32>]) -> Self {
            let schema = Arc::new(Schema::from_types(&[FieldType::Int]).unwrap());
            let pages = layout
                .iter()
                .enumerate()
                .map(|(n, values)| {
                    let records: Vec<Vec<Value>> =
                        values.iter().map(|v| vec![Value::Int(*v)]).collect();
                    let data = HeapPage::encode(&schema, &records).unwrap();
                    let page_id = PageId::new(table_id, n as u32);
                    Arc::new(HeapPage::decode(page_id, &data, schema.clone()).unwrap())
                })
                .collect();
            Self {
                table_id,
                pages,
                fail_on: None,
                fetches: AtomicUsize::new(0),
            }
        }

        fn failing_on(mut self, page_number: u32) -> Self {
            self.fail_on = Some(page_number);
            self
        }
    }

    impl PageSource for MemoryPages {
        fn fetch_page(&self, page_id: PageId, perm: Permissions) -> DbResult<Arc<HeapPage>> {
            assert_eq!(perm, Permissions::ReadOnly);
            assert_eq!(page_id.table_id, self.table_id);
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_on == Some(page_id.page_number) {
                return Err(DbError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "short read",
                )));
            }
            self.pages
                .get(page_id.page_number as usize)
                .cloned()
                .ok_or_else(|| {
                    DbError::out_of_range(
                        "page number",
                        page_id.page_number as usize,
                        self.pages.len(),
                    )
                })
        }

        fn num_pages(&self, table_id: TableId) -> DbResult<u32> {
            assert_eq!(table_id, self.table_id);
            Ok(self.pages.len() as u32)
        }
    }

    fn scan(layout: &[Vec<i32>]) -> HeapScan {
        HeapScan::new(Arc::new(MemoryPages::new(1, layout)), 1)
    }

    fn drain(cursor: &mut HeapScan) -> Result<Vec<i32>> {
        let mut values = Vec::new();
        while cursor.has_next()? {
            match cursor.next()?.get_field(0)? {
                Some(Value::Int(v)) => values.push(*v),
                other => panic!("unexpected field {:?}", other),
            }
        }
        Ok(values)
    }

    #[test]
    fn test_three_records_then_empty_page() -> Result<()> {
        let mut cursor = scan(&[vec![10, 20, 30], vec![]]);
        cursor.open()?;

        for expected in [10, 20, 30] {
            assert!(cursor.has_next()?);
            assert_eq!(cursor.next()?.get_field(0)?, Some(&Value::Int(expected)));
        }
        assert!(!cursor.has_next()?);
        Ok(())
    }

    #[test]
    fn test_skips_empty_pages_anywhere() -> Result<()> {
        let layout = vec![
            vec![],
            vec![],
            vec![1, 2],
            vec![],
            vec![3],
            vec![],
            vec![],
            vec![4, 5, 6],
            vec![],
        ];
        let mut cursor = scan(&layout);
        cursor.open()?;
        assert_eq!(drain(&mut cursor)?, vec![1, 2, 3, 4, 5, 6]);
        Ok(())
    }

    #[test]
    fn test_all_pages_empty() -> Result<()> {
        let mut cursor = scan(&[vec![], vec![], vec![]]);
        cursor.open()?;
        assert!(!cursor.has_next()?);
        assert!(matches!(cursor.next(), Err(DbError::NoSuchElement)));
        Ok(())
    }

    #[test]
    fn test_table_without_pages() -> Result<()> {
        let mut cursor = scan(&[]);
        cursor.open()?;
        assert!(!cursor.has_next()?);
        cursor.rewind()?;
        assert!(!cursor.has_next()?);
        Ok(())
    }

    #[test]
    fn test_next_without_has_next() -> Result<()> {
        let mut cursor = scan(&[vec![1], vec![], vec![2]]);
        cursor.open()?;
        assert_eq!(cursor.next()?.get_field(0)?, Some(&Value::Int(1)));
        assert_eq!(cursor.next()?.get_field(0)?, Some(&Value::Int(2)));
        assert!(matches!(cursor.next(), Err(DbError::NoSuchElement)));
        Ok(())
    }

    #[test]
    fn test_rewind_reproduces_sequence() -> Result<()> {
        let mut cursor = scan(&[vec![5, 4], vec![], vec![3, 2, 1]]);
        cursor.open()?;
        let first: Vec<RecordId> = cursor
            .records()
            .map(|t| t.map(|t| t.record_id().unwrap()))
            .collect::<DbResult<_>>()?;

        cursor.rewind()?;
        let second: Vec<RecordId> = cursor
            .records()
            .map(|t| t.map(|t| t.record_id().unwrap()))
            .collect::<DbResult<_>>()?;

        assert_eq!(first.len(), 5);
        assert_eq!(first, second);
        assert!(first.windows(2).all(|w| w[0] < w[1]));
        Ok(())
    }

    #[test]
    fn test_rewind_mid_scan() -> Result<()> {
        let mut cursor = scan(&[vec![1, 2], vec![3]]);
        cursor.open()?;
        cursor.next()?;
        cursor.next()?;
        cursor.next()?;
        cursor.rewind()?;
        assert_eq!(drain(&mut cursor)?, vec![1, 2, 3]);
        Ok(())
    }

    #[test]
    fn test_unopened_cursor() {
        let mut cursor = scan(&[vec![1]]);
        assert!(!cursor.has_next().unwrap());
        assert!(matches!(cursor.next(), Err(DbError::State(_))));
        assert!(matches!(cursor.rewind(), Err(DbError::State(_))));
    }

    #[test]
    fn test_closed_cursor() -> Result<()> {
        let mut cursor = scan(&[vec![1, 2]]);
        cursor.open()?;
        cursor.next()?;
        cursor.close();

        assert!(!cursor.is_open());
        assert!(!cursor.has_next()?);
        assert!(matches!(cursor.next(), Err(DbError::State(_))));
        assert!(matches!(cursor.rewind(), Err(DbError::State(_))));

        // Reopening starts over
        cursor.open()?;
        assert_eq!(drain(&mut cursor)?, vec![1, 2]);
        Ok(())
    }

    #[test]
    fn test_fetch_error_propagates() -> Result<()> {
        let source = MemoryPages::new(1, &[vec![1], vec![2], vec![3]]).failing_on(1);
        let mut cursor = HeapScan::new(Arc::new(source), 1);
        cursor.open()?;

        assert_eq!(cursor.next()?.get_field(0)?, Some(&Value::Int(1)));
        assert!(matches!(cursor.has_next(), Err(DbError::Io(_))));

        let results: Vec<_> = cursor.records().collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
        Ok(())
    }

    #[test]
    fn test_one_fetch_per_page() -> Result<()> {
        let source = Arc::new(MemoryPages::new(1, &[vec![1, 2], vec![], vec![3]]));
        let mut cursor = HeapScan::new(source.clone(), 1);
        cursor.open()?;
        drain(&mut cursor)?;
        assert!(!cursor.has_next()?);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 3);
        Ok(())
    }
}
