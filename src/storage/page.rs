pub mod heap_page;

use crate::catalog::TableId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifies one page of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageId {
    pub table_id: TableId,
    pub page_number: u32,
}

impl PageId {
    pub fn new(table_id: TableId, page_number: u32) -> Self {
        Self {
            table_id,
            page_number,
        }
    }

    /// `[table_id, page_number]` as plain integers.
    pub fn serialize(&self) -> [u32; 2] {
        [self.table_id, self.page_number]
    }

    /// Composite key over both components. Equal ids always produce equal codes.
    pub fn hash_code(&self) -> u64 {
        (self.table_id as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ self.page_number as u64
    }
}

impl Hash for PageId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.table_id, self.page_number)
    }
}

/// Access mode requested when fetching a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permissions {
    ReadOnly,
    ReadWrite,
}

pub use heap_page::HeapPage;
