use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::buffer::BufferPool;
use crate::catalog::{Catalog, Schema};
use crate::common::TransactionID;
use crate::error::DbResult;
use crate::executor::ExecutorContext;
use crate::lock::LockManager;
use crate::table::TableHeap;
use crate::transaction::TransactionManager;

/// Explicit database handle wiring the subsystems together: one catalog,
/// one lock manager, one buffer pool, one transaction-id source. Everything
/// an executor needs reaches it through an `ExecutorContext` built from
/// this handle rather than through process globals.
pub struct Instance {
    pub catalog: Arc<Catalog>,
    pub lock_manager: Arc<LockManager>,
    pub buffer_pool: Arc<BufferPool>,
    pub transaction_manager: Arc<TransactionManager>,
    data_dir: PathBuf,
}

impl Instance {
    pub fn new(dir: &Path, pool_size: usize) -> DbResult<Self> {
        fs::create_dir_all(dir)?;
        let catalog = Arc::new(Catalog::new());
        let lock_manager = Arc::new(LockManager::new());
        let buffer_pool = Arc::new(BufferPool::new(
            catalog.clone(),
            lock_manager.clone(),
            pool_size,
        ));
        let transaction_manager = Arc::new(TransactionManager::new(buffer_pool.clone()));
        Ok(Self {
            catalog,
            lock_manager,
            buffer_pool,
            transaction_manager,
            data_dir: dir.to_path_buf(),
        })
    }

    /// Opens (creating if absent) `<dir>/<name>.tbl` and registers it. An
    /// existing file keeps its rows, and its table id is stable across
    /// restarts because the id is derived from the path.
    pub fn create_table(&self, name: &str, schema: Schema) -> DbResult<Arc<TableHeap>> {
        let path = self.data_dir.join(format!("{}.tbl", name));
        self.catalog.register(name, TableHeap::open(&path, schema)?)
    }

    pub fn begin(&self) -> TransactionID {
        self.transaction_manager.begin()
    }

    pub fn commit(&self, txn_id: TransactionID) -> DbResult<()> {
        self.transaction_manager.commit(txn_id)
    }

    pub fn rollback(&self, txn_id: TransactionID) -> DbResult<()> {
        self.transaction_manager.abort(txn_id)
    }

    pub fn executor_context(&self, txn_id: TransactionID) -> ExecutorContext {
        ExecutorContext {
            transaction_id: txn_id,
            buffer_pool: self.buffer_pool.clone(),
            catalog: self.catalog.clone(),
        }
    }

    /// Flushes every resident page. Assumes no transaction is in flight;
    /// committed data is already on disk (FORCE), so this is a harness
    /// convenience, not a durability requirement.
    pub fn shutdown(&self) -> DbResult<()> {
        self.buffer_pool.flush_all_pages()
    }
}
