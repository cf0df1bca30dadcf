//! Table statistics for cost-based planning.
//!
//! - **IntHistogram**: equi-width histogram over an integer domain
//! - **StringHistogram**: the same histogram over a four-byte string prefix
//! - **TableStats**: per-table tuple count, page count and field histograms
//! - **StatsRegistry**: published statistics keyed by table name
//!
//! Estimates assume values are uniformly distributed inside each bucket.

pub mod histogram;
pub mod registry;
pub mod string_histogram;
pub mod table_stats;

pub use histogram::IntHistogram;
pub use registry::StatsRegistry;
pub use string_histogram::StringHistogram;
pub use table_stats::{FieldHistogram, TableStats};
