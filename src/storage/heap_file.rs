//! Heap files: a table stored as a flat sequence of fixed-size pages.

use crate::access::schema::Schema;
use crate::catalog::TableId;
use crate::error::{DbError, DbResult};
use crate::storage::page::{HeapPage, PageId};
use crate::storage::PAGE_SIZE;
use log::debug;
use parking_lot::Mutex;
use std::collections::hash_map::DefaultHasher;
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct HeapFile {
    path: PathBuf,
    id: TableId,
    schema: Arc<Schema>,
    file: Mutex<File>,
}

impl HeapFile {
    /// Open the heap file at `path`, whose records are laid out by `schema`.
    ///
    /// The table id is derived from the absolute path, so opening the same file
    /// twice yields the same id.
    pub fn open(path: impl AsRef<Path>, schema: Arc<Schema>) -> DbResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => DbError::NotFound(format!("heap file {}", path.display())),
            _ => DbError::Io(e),
        })?;
        let path = std::fs::canonicalize(path)?;

        let mut hasher = DefaultHasher::new();
        path.hash(&mut hasher);
        let id = hasher.finish() as TableId;

        Ok(Self {
            path,
            id,
            schema,
            file: Mutex::new(file),
        })
    }

    /// Same file under a chosen id, for exercising id collisions.
    #[cfg(test)]
    pub(crate) fn with_id(mut self, id: TableId) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of whole pages in the file. A trailing partial page is ignored.
    pub fn num_pages(&self) -> DbResult<u32> {
        let file_size = self.file.lock().metadata()?.len();
        Ok((file_size / PAGE_SIZE as u64) as u32)
    }

    /// Read and decode one page.
    pub fn read_page(&self, page_id: PageId) -> DbResult<HeapPage> {
        if page_id.table_id != self.id {
            return Err(DbError::NotFound(format!(
                "page {} in table {}",
                page_id, self.id
            )));
        }

        let num_pages = self.num_pages()?;
        if page_id.page_number >= num_pages {
            return Err(DbError::out_of_range(
                "page number",
                page_id.page_number as usize,
                num_pages as usize,
            ));
        }

        let mut buf = vec![0u8; PAGE_SIZE];
        {
            let mut file = self.file.lock();
            file.seek(SeekFrom::Start(Self::page_offset(page_id)))?;
            file.read_exact(&mut buf)?;
        }
        debug!("Read page {} from {}", page_id, self.path.display());

        HeapPage::decode(page_id, &buf, self.schema.clone())
    }

    /// Heap files are read-only through this access path.
    pub fn write_page(&self, _page: &HeapPage) -> DbResult<()> {
        Err(DbError::Unsupported("writing pages back to a heap file"))
    }

    fn page_offset(page_id: PageId) -> u64 {
        page_id.page_number as u64 * PAGE_SIZE as u64
    }
}

impl std::fmt::Debug for HeapFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeapFile")
            .field("path", &self.path)
            .field("id", &self.id)
            .field("schema", &self.schema.to_string())
            .finish()
    }
}
