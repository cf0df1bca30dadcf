use crate::access::schema::{FieldDescriptor, Schema};
use crate::access::value::FieldType;
use crate::error::{DbError, DbResult};
use crate::storage::heap_file::HeapFile;
use log::info;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

pub type TableId = u32;

#[derive(Debug, Clone)]
pub struct TableInfo {
    pub table_id: TableId,
    pub table_name: String,
    pub file: Arc<HeapFile>,
}

#[derive(Default)]
struct CatalogInner {
    tables: HashMap<TableId, TableInfo>,
    names: HashMap<String, TableId>,
}

/// Registry of the tables known to the database.
#[derive(Default)]
pub struct Catalog {
    inner: RwLock<CatalogInner>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `file` under `name`. An existing table with the same name, or
    /// backed by the same file, is replaced. A different file whose id
    /// collides with a registered one is rejected.
    pub fn add_table(&self, file: HeapFile, name: &str) -> DbResult<TableId> {
        let table_id = file.id();
        let mut inner = self.inner.write();

        if let Some(existing) = inner.tables.get(&table_id) {
            if existing.file.path() != file.path() {
                return Err(DbError::InvalidArgument(format!(
                    "table id {} of {} collides with {}",
                    table_id,
                    file.path().display(),
                    existing.file.path().display()
                )));
            }
        }

        if let Some(old_id) = inner.names.remove(name) {
            inner.tables.remove(&old_id);
        }
        if let Some(old) = inner.tables.remove(&table_id) {
            inner.names.remove(&old.table_name);
        }

        inner.names.insert(name.to_string(), table_id);
        inner.tables.insert(
            table_id,
            TableInfo {
                table_id,
                table_name: name.to_string(),
                file: Arc::new(file),
            },
        );
        Ok(table_id)
    }

    pub fn table_id(&self, name: &str) -> DbResult<TableId> {
        self.inner
            .read()
            .names
            .get(name)
            .copied()
            .ok_or_else(|| DbError::NotFound(format!("table '{}'", name)))
    }

    pub fn table(&self, table_id: TableId) -> DbResult<TableInfo> {
        self.inner
            .read()
            .tables
            .get(&table_id)
            .cloned()
            .ok_or_else(|| DbError::NotFound(format!("table {}", table_id)))
    }

    pub fn schema(&self, table_id: TableId) -> DbResult<Arc<Schema>> {
        Ok(self.table(table_id)?.file.schema().clone())
    }

    pub fn table_name(&self, table_id: TableId) -> DbResult<String> {
        Ok(self.table(table_id)?.table_name)
    }

    pub fn heap_file(&self, table_id: TableId) -> DbResult<Arc<HeapFile>> {
        Ok(self.table(table_id)?.file)
    }

    /// All table ids in ascending order.
    pub fn table_ids(&self) -> Vec<TableId> {
        let mut ids: Vec<TableId> = self.inner.read().tables.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.inner.read().tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().tables.is_empty()
    }

    /// Load table definitions from a schema file.
    ///
    /// Each non-blank line reads `name (field type, field type, ...)` where a
    /// type is `int` or `string`. The data of table `name` is expected in
    /// `name.dat` next to the schema file.
    pub fn load_schema(&self, path: impl AsRef<Path>) -> DbResult<Vec<TableId>> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                DbError::NotFound(format!("schema file {}", path.display()))
            }
            _ => DbError::Io(e),
        })?;
        let dir = path.parent().unwrap_or_else(|| Path::new("."));

        let mut loaded = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (name, schema) = parse_table_line(line)
                .map_err(|e| DbError::InvalidArgument(format!("line {}: {}", line_no + 1, e)))?;

            let file = HeapFile::open(dir.join(format!("{}.dat", name)), Arc::new(schema))?;
            info!("Loaded table '{}' ({})", name, file.schema());
            loaded.push(self.add_table(file, &name)?);
        }
        Ok(loaded)
    }
}

fn parse_table_line(line: &str) -> Result<(String, Schema), String> {
    let open = line.find('(').ok_or("missing '('")?;
    let close = line.rfind(')').ok_or("missing ')'")?;
    if close < open {
        return Err("unbalanced parentheses".to_string());
    }

    let name = line[..open].trim();
    if name.is_empty() {
        return Err("missing table name".to_string());
    }

    let mut fields = Vec::new();
    for column in line[open + 1..close].split(',') {
        let parts: Vec<&str> = column.split_whitespace().collect();
        if parts.len() != 2 {
            return Err(format!("expected 'name type', found '{}'", column.trim()));
        }
        let field_type: FieldType = parts[1].parse().map_err(|e: DbError| e.to_string())?;
        fields.push(FieldDescriptor::new(Some(parts[0].to_string()), field_type));
    }

    let schema = Schema::new(fields).map_err(|e| e.to_string())?;
    Ok((name.to_string(), schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs::File;
    use tempfile::tempdir;

    fn open_empty(path: &Path) -> Result<HeapFile> {
        File::create(path)?;
        Ok(HeapFile::open(
            path,
            Arc::new(Schema::from_types(&[FieldType::Int])?),
        )?)
    }

    #[test]
    fn test_add_and_lookup() -> Result<()> {
        let dir = tempdir()?;
        let catalog = Catalog::new();
        let id = catalog.add_table(open_empty(&dir.path().join("a.dat"))?, "users")?;

        assert_eq!(catalog.table_id("users")?, id);
        assert_eq!(catalog.table_name(id)?, "users");
        assert_eq!(catalog.schema(id)?.num_fields(), 1);
        assert_eq!(catalog.heap_file(id)?.id(), id);
        Ok(())
    }

    #[test]
    fn test_missing_table() {
        let catalog = Catalog::new();
        assert!(matches!(catalog.table_id("nope"), Err(DbError::NotFound(_))));
        assert!(matches!(catalog.schema(42), Err(DbError::NotFound(_))));
    }

    #[test]
    fn test_same_name_replaces_table() -> Result<()> {
        let dir = tempdir()?;
        let catalog = Catalog::new();
        let first = catalog.add_table(open_empty(&dir.path().join("a.dat"))?, "t")?;
        let second = catalog.add_table(open_empty(&dir.path().join("b.dat"))?, "t")?;

        assert_ne!(first, second);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.table_id("t")?, second);
        assert!(catalog.table(first).is_err());
        Ok(())
    }

    #[test]
    fn test_same_file_renamed() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("a.dat");
        let catalog = Catalog::new();
        let id = catalog.add_table(open_empty(&path)?, "old")?;
        catalog.add_table(HeapFile::open(&path, catalog.schema(id)?)?, "new")?;

        assert_eq!(catalog.len(), 1);
        assert!(catalog.table_id("old").is_err());
        assert_eq!(catalog.table_id("new")?, id);
        Ok(())
    }

    #[test]
    fn test_colliding_id_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let catalog = Catalog::new();
        let first = catalog.add_table(open_empty(&dir.path().join("a.dat"))?, "a")?;

        let other = open_empty(&dir.path().join("b.dat"))?.with_id(first);
        assert!(matches!(
            catalog.add_table(other, "b"),
            Err(DbError::InvalidArgument(_))
        ));

        // The registered table is untouched
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.table_name(first)?, "a");
        assert!(catalog.table_id("b").is_err());
        Ok(())
    }

    #[test]
    fn test_table_ids_sorted() -> Result<()> {
        let dir = tempdir()?;
        let catalog = Catalog::new();
        for name in ["a", "b", "c", "d"] {
            catalog.add_table(open_empty(&dir.path().join(format!("{}.dat", name)))?, name)?;
        }

        let ids = catalog.table_ids();
        assert_eq!(ids.len(), 4);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        Ok(())
    }

    #[test]
    fn test_load_schema() -> Result<()> {
        let dir = tempdir()?;
        File::create(dir.path().join("users.dat"))?;
        File::create(dir.path().join("orders.dat"))?;
        let schema_path = dir.path().join("catalog.txt");
        std::fs::write(
            &schema_path,
            "users (id int, name string)\n\norders(id int, user_id int, amount int)\n",
        )?;

        let catalog = Catalog::new();
        let ids = catalog.load_schema(&schema_path)?;
        assert_eq!(ids.len(), 2);

        let users = catalog.schema(catalog.table_id("users")?)?;
        assert_eq!(users.to_string(), "int(id), string(name)");
        let orders = catalog.schema(catalog.table_id("orders")?)?;
        assert_eq!(orders.num_fields(), 3);
        Ok(())
    }

    #[test]
    fn test_load_schema_errors() -> Result<()> {
        let dir = tempdir()?;
        let catalog = Catalog::new();

        let bad = dir.path().join("bad.txt");
        std::fs::write(&bad, "users id int\n")?;
        assert!(matches!(
            catalog.load_schema(&bad),
            Err(DbError::InvalidArgument(_))
        ));

        std::fs::write(&bad, "users (id float)\n")?;
        assert!(matches!(
            catalog.load_schema(&bad),
            Err(DbError::InvalidArgument(_))
        ));

        // Well formed, but there is no data file
        std::fs::write(&bad, "ghost (id int)\n")?;
        assert!(matches!(catalog.load_schema(&bad), Err(DbError::NotFound(_))));

        assert!(matches!(
            catalog.load_schema(dir.path().join("missing.txt")),
            Err(DbError::NotFound(_))
        ));
        Ok(())
    }
}
