//! Storage layer for heapstats.
//!
//! Tables live in heap files: flat files of fixed-size pages, where page `p`
//! occupies bytes `[p * PAGE_SIZE, (p + 1) * PAGE_SIZE)`. Key components:
//!
//! - **HeapFile**: reads and decodes individual pages of one table
//! - **HeapPage**: the fixed-slot page format with its occupancy bitmap
//! - **BufferPool**: read-only cache of decoded pages with LRU eviction
//! - **HeapFileEncoder**: bulk loader that turns delimited text into pages

pub mod buffer;
pub mod encoder;
pub mod heap_file;
pub mod page;

pub use buffer::{BufferPool, PageSource};
pub use encoder::HeapFileEncoder;
pub use heap_file::HeapFile;
pub use page::{HeapPage, PageId, Permissions};

/// Size in bytes of every page of every heap file.
pub const PAGE_SIZE: usize = 4096;
