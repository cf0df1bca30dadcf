//! Executor layer.
//!
//! Operators follow the iterator model: each one produces records one at a
//! time through the [`TupleCursor`](crate::access::TupleCursor) contract, so
//! they compose without materializing whole tables.

pub mod seq_scan;

pub use seq_scan::SeqScan;
