use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::common::TableID;
use crate::error::{DbError, DbResult};
use crate::table::TableHeap;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum DataType {
    Int,
    Varchar(usize),
}
impl DataType {
    /// On-disk width of a field of this type.
    pub fn size(&self) -> usize {
        match self {
            DataType::Int => 4,
            DataType::Varchar(capacity) => 4 + capacity,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Schema {
    pub columns: Vec<Column>,
}
impl Schema {
    /// On-disk width of one tuple: the sum of the fixed column widths.
    pub fn tuple_size(&self) -> usize {
        self.columns.iter().map(|c| c.data_type.size()).sum()
    }
}

/// Registry mapping table names and ids to their heap files. Read-mostly:
/// written only while tables are being registered.
pub struct Catalog {
    tables: RwLock<CatalogState>,
}

#[derive(Default)]
struct CatalogState {
    by_id: HashMap<TableID, Arc<TableHeap>>,
    by_name: HashMap<String, TableID>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(CatalogState::default()),
        }
    }

    pub fn register(&self, name: &str, table: TableHeap) -> DbResult<Arc<TableHeap>> {
        let mut state = self.tables.write().unwrap();
        let table_id = table.table_id();
        if state.by_name.contains_key(name) {
            return Err(DbError::Db(format!("table {} already exists", name)));
        }
        if state.by_id.contains_key(&table_id) {
            return Err(DbError::Db(format!(
                "table id {} already registered (path hash collision)",
                table_id.0
            )));
        }
        let table = Arc::new(table);
        state.by_id.insert(table_id, table.clone());
        state.by_name.insert(name.to_string(), table_id);
        Ok(table)
    }

    pub fn table(&self, table_id: TableID) -> DbResult<Arc<TableHeap>> {
        let state = self.tables.read().unwrap();
        state
            .by_id
            .get(&table_id)
            .cloned()
            .ok_or_else(|| DbError::Db(format!("no table with id {}", table_id.0)))
    }

    pub fn table_by_name(&self, name: &str) -> DbResult<Arc<TableHeap>> {
        let state = self.tables.read().unwrap();
        let table_id = state
            .by_name
            .get(name)
            .ok_or_else(|| DbError::Db(format!("no table named {}", name)))?;
        Ok(state.by_id[table_id].clone())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::*;

    fn two_int_schema() -> Schema {
        Schema {
            columns: vec![
                Column {
                    name: "c1".to_string(),
                    data_type: DataType::Int,
                },
                Column {
                    name: "c2".to_string(),
                    data_type: DataType::Int,
                },
            ],
        }
    }

    #[test]
    fn test_tuple_size() {
        let schema = Schema {
            columns: vec![
                Column {
                    name: "id".to_string(),
                    data_type: DataType::Int,
                },
                Column {
                    name: "name".to_string(),
                    data_type: DataType::Varchar(16),
                },
            ],
        };
        assert_eq!(schema.tuple_size(), 4 + 4 + 16);
    }

    #[test]
    fn test_register_and_lookup() -> Result<()> {
        let dir = tempdir()?;
        let catalog = Catalog::new();
        let table = TableHeap::open(&dir.path().join("t1.tbl"), two_int_schema())?;
        let table_id = table.table_id();
        catalog.register("t1", table)?;

        assert_eq!(catalog.table(table_id)?.table_id(), table_id);
        assert_eq!(catalog.table_by_name("t1")?.table_id(), table_id);
        assert!(catalog.table_by_name("t2").is_err());
        Ok(())
    }

    #[test]
    fn test_register_duplicate_name() -> Result<()> {
        let dir = tempdir()?;
        let catalog = Catalog::new();
        let table = TableHeap::open(&dir.path().join("t1.tbl"), two_int_schema())?;
        catalog.register("t1", table)?;
        let table = TableHeap::open(&dir.path().join("other.tbl"), two_int_schema())?;
        assert!(catalog.register("t1", table).is_err());
        Ok(())
    }
}
