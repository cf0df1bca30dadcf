use crate::storage::page::PageId;
use std::fmt::Debug;

pub trait Replacer: Send + Sync + Debug {
    /// Select a page to evict. Returns None if nothing is tracked.
    fn evict(&mut self) -> Option<PageId>;

    /// Record that `page_id` was just used, making it the most recent entry.
    fn touch(&mut self, page_id: PageId);

    /// Stop tracking `page_id`.
    fn remove(&mut self, page_id: PageId);

    /// Get the number of tracked pages.
    fn size(&self) -> usize;
}
