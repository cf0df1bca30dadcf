use crate::catalog::Catalog;
use crate::config::StatsConfig;
use crate::error::DbResult;
use crate::stats::table_stats::TableStats;
use crate::storage::buffer::PageSource;
use dashmap::DashMap;
use log::info;
use std::collections::HashMap;
use std::sync::Arc;

/// Published statistics, keyed by table name.
///
/// Starts empty. Entries are only added or replaced by [`StatsRegistry::set`]
/// and [`StatsRegistry::recompute_all`]; a replacement never merges with the
/// previous value and nothing is removed implicitly.
#[derive(Debug, Default)]
pub struct StatsRegistry {
    tables: DashMap<String, Arc<TableStats>>,
}

impl StatsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, table_name: &str) -> Option<Arc<TableStats>> {
        self.tables.get(table_name).map(|e| e.value().clone())
    }

    pub fn set(&self, table_name: &str, stats: Arc<TableStats>) {
        self.tables.insert(table_name.to_string(), stats);
    }

    /// Rebuild statistics for every table in the catalog, in ascending table
    /// id order. Stops at the first table that fails; tables already rebuilt
    /// keep their new statistics.
    pub fn recompute_all(
        &self,
        catalog: &Catalog,
        pages: Arc<dyn PageSource>,
        config: &StatsConfig,
    ) -> DbResult<()> {
        let table_ids = catalog.table_ids();
        info!("Computing statistics for {} tables", table_ids.len());

        for table_id in table_ids {
            let name = catalog.table_name(table_id)?;
            let stats = TableStats::compute(
                catalog,
                pages.clone(),
                table_id,
                config.io_cost_per_page,
                config.histogram_buckets,
            )?;
            self.set(&name, Arc::new(stats));
        }

        info!("Done computing statistics");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Names of all tables with statistics, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Replace the whole content with `stats`. Test support only.
    pub fn inject_for_testing(&self, stats: HashMap<String, Arc<TableStats>>) {
        self.tables.clear();
        for (name, table_stats) in stats {
            self.tables.insert(name, table_stats);
        }
    }

    /// Remove every entry. Test support only.
    pub fn reset_for_testing(&self) {
        self.tables.clear();
    }
}
