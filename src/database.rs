use crate::access::schema::Schema;
use crate::catalog::{Catalog, TableId};
use crate::config::DatabaseConfig;
use crate::executor::SeqScan;
use crate::stats::{StatsRegistry, TableStats};
use crate::storage::buffer::PageSource;
use crate::storage::heap_file::HeapFile;
use crate::storage::BufferPool;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

/// High-level interface wiring the catalog, the buffer pool and the
/// statistics registry together.
pub struct Database {
    config: DatabaseConfig,
    catalog: Arc<Catalog>,
    buffer_pool: BufferPool,
    stats: StatsRegistry,
}

impl Database {
    /// Create a database with no tables
    pub fn new(config: DatabaseConfig) -> Self {
        let catalog = Arc::new(Catalog::new());
        let buffer_pool = BufferPool::new(catalog.clone(), config.buffer_pool_pages);
        Self {
            config,
            catalog,
            buffer_pool,
            stats: StatsRegistry::new(),
        }
    }

    /// Create a database holding the tables listed in a schema file
    pub fn open(schema_path: &Path, config: DatabaseConfig) -> Result<Self> {
        let db = Self::new(config);
        db.load_schema(schema_path)?;
        Ok(db)
    }

    pub fn load_schema(&self, schema_path: &Path) -> Result<Vec<TableId>> {
        self.catalog
            .load_schema(schema_path)
            .with_context(|| format!("Failed to load schema file {}", schema_path.display()))
    }

    /// Register an existing heap file as table `name`
    pub fn add_table(&self, path: &Path, name: &str, schema: Schema) -> Result<TableId> {
        let file = HeapFile::open(path, Arc::new(schema))
            .with_context(|| format!("Failed to open heap file {}", path.display()))?;
        Ok(self.catalog.add_table(file, name)?)
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn buffer_pool(&self) -> &BufferPool {
        &self.buffer_pool
    }

    pub fn stats(&self) -> &StatsRegistry {
        &self.stats
    }

    /// Names of all tables, in table id order
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for table_id in self.catalog.table_ids() {
            names.push(self.catalog.table_name(table_id)?);
        }
        Ok(names)
    }

    /// Sequential scan over the table called `table_name`
    pub fn scan(&self, table_name: &str, alias: Option<&str>) -> Result<SeqScan> {
        let table_id = self.catalog.table_id(table_name)?;
        Ok(SeqScan::new(
            self.catalog.clone(),
            self.page_source(),
            table_id,
            alias,
        )?)
    }

    /// Rebuild and publish statistics for every table
    pub fn compute_statistics(&self) -> Result<()> {
        self.stats
            .recompute_all(&self.catalog, self.page_source(), &self.config.stats)
            .context("Failed to compute table statistics")
    }

    pub fn table_stats(&self, table_name: &str) -> Result<Arc<TableStats>> {
        self.stats
            .get(table_name)
            .with_context(|| format!("No statistics for table '{}'", table_name))
    }

    fn page_source(&self) -> Arc<dyn PageSource> {
        Arc::new(self.buffer_pool.clone())
    }
}
