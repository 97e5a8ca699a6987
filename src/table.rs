use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

use crate::buffer::BufferPool;
use crate::catalog::Schema;
use crate::common::{PageID, TableID, TransactionID, PAGE_SIZE, RID};
use crate::disk::DiskManager;
use crate::error::{DbError, DbResult};
use crate::lock::Permission;
use crate::page::HeapPage;
use crate::tuple::Tuple;

/// One table stored as a heap file of slotted pages. All tuple-level access
/// goes through the buffer pool so that page locks are taken; only the
/// buffer pool itself calls `read_page` / `write_page`.
pub struct TableHeap {
    table_id: TableID,
    schema: Schema,
    disk: DiskManager,
}

impl TableHeap {
    pub fn open(path: &Path, schema: Schema) -> DbResult<Self> {
        if HeapPage::slot_count(&schema) == 0 {
            return Err(DbError::Db(
                "tuple width exceeds a single page".to_string(),
            ));
        }
        let path = std::path::absolute(path)?;
        let table_id = Self::table_id_for_path(&path);
        let disk = DiskManager::open(&path)?;
        Ok(Self {
            table_id,
            schema,
            disk,
        })
    }

    // The id is the hash of the absolute backing path, so the same file
    // gets the same id across restarts. Moving the file changes its id.
    fn table_id_for_path(path: &Path) -> TableID {
        let mut hasher = DefaultHasher::new();
        path.hash(&mut hasher);
        TableID(hasher.finish() as u32)
    }

    pub fn table_id(&self) -> TableID {
        self.table_id
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn num_pages(&self) -> DbResult<u32> {
        self.disk.num_pages()
    }

    pub(crate) fn read_page(&self, page_id: PageID) -> DbResult<HeapPage> {
        if page_id.table_id != self.table_id {
            return Err(DbError::Db(format!(
                "page {:?} does not belong to table {}",
                page_id, self.table_id.0
            )));
        }
        let mut data = vec![0u8; PAGE_SIZE];
        self.disk.read_page(page_id.page_no, &mut data)?;
        Ok(HeapPage::from_data(page_id, self.schema.clone(), &data))
    }

    pub(crate) fn write_page(&self, page: &HeapPage) -> DbResult<()> {
        self.disk.write_page(page.page_id().page_no, &page.data())
    }

    /// Probes pages 0, 1, 2, … under READ_WRITE until one has an empty
    /// slot. Reading one page past the current end yields an empty page,
    /// which is how the file grows. Returns the dirtied page id.
    pub fn insert_tuple(
        &self,
        buffer_pool: &BufferPool,
        txn_id: TransactionID,
        tuple: Tuple,
    ) -> DbResult<PageID> {
        if !tuple.fits(&self.schema) {
            return Err(DbError::Db(
                "tuple does not match the table schema".to_string(),
            ));
        }
        let mut page_no = 0;
        loop {
            let page_id = PageID::new(self.table_id, page_no);
            let page = buffer_pool.get_page(txn_id, page_id, Permission::ReadWrite)?;
            let mut page = page.write().unwrap();
            if page.empty_slot_count() > 0 {
                page.insert_tuple(txn_id, tuple)?;
                return Ok(page_id);
            }
            page_no += 1;
        }
    }

    /// Deletes the tuple at `rid` under READ_WRITE. Returns the dirtied
    /// page id.
    pub fn delete_tuple(
        &self,
        buffer_pool: &BufferPool,
        txn_id: TransactionID,
        rid: RID,
    ) -> DbResult<PageID> {
        let page_id = rid.0;
        if page_id.table_id != self.table_id {
            return Err(DbError::Db(format!(
                "tuple {:?} does not belong to table {}",
                rid, self.table_id.0
            )));
        }
        let page = buffer_pool.get_page(txn_id, page_id, Permission::ReadWrite)?;
        page.write().unwrap().delete_tuple(txn_id, rid)?;
        Ok(page_id)
    }
}

/// Restartable scan over a table's occupied slots, in page order then slot
/// order. Takes READ_ONLY on each page as it is reached.
pub struct TableIterator {
    table: Arc<TableHeap>,
    buffer_pool: Arc<BufferPool>,
    txn_id: TransactionID,
    page_no: u32,
    tuples: Vec<Tuple>,
    tuple_index: usize,
}

impl TableIterator {
    pub fn new(table: Arc<TableHeap>, buffer_pool: Arc<BufferPool>, txn_id: TransactionID) -> Self {
        Self {
            table,
            buffer_pool,
            txn_id,
            page_no: 0,
            tuples: Vec::new(),
            tuple_index: 0,
        }
    }

    pub fn reset(&mut self) {
        self.page_no = 0;
        self.tuples = Vec::new();
        self.tuple_index = 0;
    }

    pub fn next(&mut self) -> DbResult<Option<Tuple>> {
        loop {
            if self.tuple_index < self.tuples.len() {
                let tuple = self.tuples[self.tuple_index].clone();
                self.tuple_index += 1;
                return Ok(Some(tuple));
            }
            if self.page_no >= self.table.num_pages()? {
                return Ok(None);
            }
            let page_id = PageID::new(self.table.table_id(), self.page_no);
            let page = self
                .buffer_pool
                .get_page(self.txn_id, page_id, Permission::ReadOnly)?;
            self.tuples = page.read().unwrap().tuples().cloned().collect();
            self.tuple_index = 0;
            self.page_no += 1;
        }
    }
}
