//! Tunables for the buffer pool and the statistics builder.

/// Number of histogram buckets used per field unless overridden.
pub const DEFAULT_HISTOGRAM_BUCKETS: usize = 100;

/// Cost of reading one page, in abstract cost units.
pub const DEFAULT_IO_COST_PER_PAGE: u64 = 1000;

/// Pages the buffer pool keeps cached before it starts evicting.
pub const DEFAULT_BUFFER_POOL_PAGES: usize = 50;

/// Parameters for building [`TableStats`](crate::stats::TableStats).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsConfig {
    pub io_cost_per_page: u64,
    pub histogram_buckets: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            io_cost_per_page: DEFAULT_IO_COST_PER_PAGE,
            histogram_buckets: DEFAULT_HISTOGRAM_BUCKETS,
        }
    }
}

/// Configuration for a [`Database`](crate::database::Database).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatabaseConfig {
    pub buffer_pool_pages: usize,
    pub stats: StatsConfig,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            buffer_pool_pages: DEFAULT_BUFFER_POOL_PAGES,
            stats: StatsConfig::default(),
        }
    }
}
