pub mod lru;
pub mod replacer;

use crate::catalog::{Catalog, TableId};
use crate::error::DbResult;
use crate::storage::page::{HeapPage, PageId, Permissions};
use dashmap::DashMap;
use log::{debug, trace};
use parking_lot::Mutex;
use replacer::Replacer;
use std::sync::Arc;

/// Where cursors get their pages from.
///
/// Implementations may block (for example while waiting for an eviction) and
/// must be safe to share between independent cursors.
pub trait PageSource: Send + Sync {
    /// Fetch a decoded page. Fails with `OutOfRange` past the end of the table,
    /// `NotFound` for an unknown table and `Io` when the read fails.
    fn fetch_page(&self, page_id: PageId, perm: Permissions) -> DbResult<Arc<HeapPage>>;

    /// Current number of pages in the table.
    fn num_pages(&self, table_id: TableId) -> DbResult<u32>;
}

/// Read-only page cache in front of the catalog's heap files.
///
/// Pages are handed out as shared `Arc`s, so evicting a page never
/// invalidates a copy a cursor is still holding. Cached pages are never dirty
/// and eviction does not write anything back.
#[derive(Clone)]
pub struct BufferPool {
    inner: Arc<BufferPoolInner>,
}

struct BufferPoolInner {
    catalog: Arc<Catalog>,
    page_table: DashMap<PageId, Arc<HeapPage>>,
    replacer: Mutex<Box<dyn Replacer>>,
    capacity: usize,
}

impl BufferPool {
    pub fn new(catalog: Arc<Catalog>, capacity: usize) -> Self {
        Self::with_replacer(catalog, Box::new(lru::LruReplacer::new()), capacity)
    }

    pub fn with_replacer(
        catalog: Arc<Catalog>,
        replacer: Box<dyn Replacer>,
        capacity: usize,
    ) -> Self {
        Self {
            inner: Arc::new(BufferPoolInner {
                catalog,
                page_table: DashMap::with_capacity(capacity),
                replacer: Mutex::new(replacer),
                capacity: capacity.max(1),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Number of cached pages.
    pub fn len(&self) -> usize {
        self.inner.page_table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.page_table.is_empty()
    }

    pub fn contains(&self, page_id: PageId) -> bool {
        self.inner.page_table.contains_key(&page_id)
    }

    /// Drop a page from the cache so the next fetch rereads it from disk.
    pub fn discard_page(&self, page_id: PageId) {
        self.inner.page_table.remove(&page_id);
        self.inner.replacer.lock().remove(page_id);
    }

    fn make_room(&self) {
        while self.inner.page_table.len() >= self.inner.capacity {
            let victim = match self.inner.replacer.lock().evict() {
                Some(page_id) => page_id,
                None => break,
            };
            self.inner.page_table.remove(&victim);
            debug!("Evicted page {}", victim);
        }
    }
}

impl PageSource for BufferPool {
    fn fetch_page(&self, page_id: PageId, perm: Permissions) -> DbResult<Arc<HeapPage>> {
        trace!("Fetching page {} ({:?})", page_id, perm);

        // Check if page is already cached
        if let Some(page) = self.inner.page_table.get(&page_id).map(|e| e.value().clone()) {
            self.inner.replacer.lock().touch(page_id);
            return Ok(page);
        }

        // Not cached, load it through the table's heap file
        let heap_file = self.inner.catalog.heap_file(page_id.table_id)?;
        let page = Arc::new(heap_file.read_page(page_id)?);

        self.make_room();
        self.inner.page_table.insert(page_id, page.clone());
        self.inner.replacer.lock().touch(page_id);

        Ok(page)
    }

    fn num_pages(&self, table_id: TableId) -> DbResult<u32> {
        self.inner.catalog.heap_file(table_id)?.num_pages()
    }
}
