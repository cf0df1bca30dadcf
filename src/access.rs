//! Access layer for record-oriented operations.
//!
//! This module provides the typed view over heap-file pages:
//!
//! - **Schema**: ordered, typed field list shared by every record of a table
//! - **Tuple**: individual records with an optional `RecordId` locator
//! - **Value**: type-safe representation of field values
//! - **HeapScan**: restartable cursor yielding a table's records in order
//!
//! Higher layers (the scan operator and the statistics builder) only see
//! records through the `TupleCursor` contract, never raw page bytes.

pub mod cursor;
pub mod schema;
pub mod tuple;
pub mod value;

pub use cursor::{HeapScan, Records, TupleCursor};
pub use schema::{FieldDescriptor, Schema};
pub use tuple::{RecordId, Tuple};
pub use value::{FieldType, Value, STRING_LEN};
