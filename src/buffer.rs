use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

use log::debug;

use crate::catalog::Catalog;
use crate::common::{PageID, TableID, TransactionID};
use crate::error::{DbError, DbResult};
use crate::lock::{LockManager, Permission};
use crate::page::HeapPage;
use crate::tuple::Tuple;

/// Bounded cache of heap pages. Every tuple access goes through here: a
/// page lock is taken on behalf of the caller before the page is served,
/// and per-transaction dirty pages are tracked for commit (FORCE: flush
/// them all) and abort (discard the in-memory copies). Dirty pages are
/// never evicted or written back before commit (NO-STEAL).
pub struct BufferPool {
    pool_size: usize,
    catalog: Arc<Catalog>,
    lock_manager: Arc<LockManager>,
    frames: Mutex<FrameTable>,
}

#[derive(Default)]
struct FrameTable {
    pages: HashMap<PageID, Arc<RwLock<HeapPage>>>,
    replacer: Replacer,
    dirty_pages: HashMap<TransactionID, HashSet<PageID>>,
}

impl BufferPool {
    pub fn new(catalog: Arc<Catalog>, lock_manager: Arc<LockManager>, pool_size: usize) -> Self {
        Self {
            pool_size,
            catalog,
            lock_manager,
            frames: Mutex::new(FrameTable::default()),
        }
    }

    /// Acquires the page lock implied by `permission` (blocking, and
    /// failing with `TransactionAborted` if the transaction loses a
    /// wound-wait conflict), then serves the page from the pool, loading
    /// and, if necessary, evicting first.
    pub fn get_page(
        &self,
        txn_id: TransactionID,
        page_id: PageID,
        permission: Permission,
    ) -> DbResult<Arc<RwLock<HeapPage>>> {
        self.lock_manager.lock(txn_id, page_id, permission.to_lock())?;

        let mut frames = self.frames.lock().unwrap();
        if let Some(page) = frames.pages.get(&page_id) {
            let page = page.clone();
            frames.replacer.touch(page_id);
            return Ok(page);
        }

        if frames.pages.len() >= self.pool_size {
            self.evict_page(&mut frames)?;
        }

        let table = self.catalog.table(page_id.table_id)?;
        let page = Arc::new(RwLock::new(table.read_page(page_id)?));
        frames.pages.insert(page_id, page.clone());
        frames.replacer.touch(page_id);
        Ok(page)
    }

    // NO-STEAL: only clean pages are eviction candidates, and a clean page
    // matches its on-disk bytes, so eviction is a plain drop.
    fn evict_page(&self, frames: &mut FrameTable) -> DbResult<()> {
        let FrameTable {
            pages, replacer, ..
        } = frames;
        let victim = replacer.victim(|page_id| {
            pages
                .get(page_id)
                .map_or(false, |page| !page.read().unwrap().is_dirty())
        });
        match victim {
            Some(page_id) => {
                debug!("evict {:?}", page_id);
                pages.remove(&page_id);
                Ok(())
            }
            None => Err(DbError::Db(
                "buffer pool is full and every resident page is dirty".to_string(),
            )),
        }
    }

    /// Routes the tuple to the owning table's insert path and records the
    /// dirtied page against the transaction.
    pub fn insert_tuple(
        &self,
        txn_id: TransactionID,
        table_id: TableID,
        tuple: Tuple,
    ) -> DbResult<()> {
        let table = self.catalog.table(table_id)?;
        let dirtied = table.insert_tuple(self, txn_id, tuple)?;
        let mut frames = self.frames.lock().unwrap();
        frames.dirty_pages.entry(txn_id).or_default().insert(dirtied);
        Ok(())
    }

    pub fn delete_tuple(&self, txn_id: TransactionID, tuple: &Tuple) -> DbResult<()> {
        let rid = tuple
            .rid
            .ok_or_else(|| DbError::Db("cannot delete a tuple with no record id".to_string()))?;
        let table = self.catalog.table(rid.0.table_id)?;
        let dirtied = table.delete_tuple(self, txn_id, rid)?;
        let mut frames = self.frames.lock().unwrap();
        frames.dirty_pages.entry(txn_id).or_default().insert(dirtied);
        Ok(())
    }

    /// Ends the transaction. On commit every page it dirtied is forced to
    /// disk and marked clean; on abort the in-memory copies are discarded
    /// so the next access re-reads the committed bytes. Either way all of
    /// the transaction's locks are released. Call exactly once per
    /// transaction.
    pub fn transaction_complete(&self, txn_id: TransactionID, commit: bool) -> DbResult<()> {
        let mut frames = self.frames.lock().unwrap();
        if let Some(dirty) = frames.dirty_pages.remove(&txn_id) {
            for page_id in dirty {
                if commit {
                    self.flush_page(&mut frames, page_id)?;
                } else {
                    debug!("discard {:?} on abort of {:?}", page_id, txn_id);
                    frames.pages.remove(&page_id);
                    frames.replacer.remove(page_id);
                }
            }
        }
        drop(frames);
        self.lock_manager.release_all(txn_id);
        Ok(())
    }

    fn flush_page(&self, frames: &mut FrameTable, page_id: PageID) -> DbResult<()> {
        if let Some(page) = frames.pages.get(&page_id) {
            let mut page = page.write().unwrap();
            if page.is_dirty() {
                debug!("flush {:?}", page_id);
                let table = self.catalog.table(page_id.table_id)?;
                table.write_page(&page)?;
                page.mark_clean();
            }
        }
        Ok(())
    }

    /// Writes every dirty resident page to disk, bypassing transaction
    /// boundaries. Test-harness use only.
    pub fn flush_all_pages(&self) -> DbResult<()> {
        let mut frames = self.frames.lock().unwrap();
        let page_ids = frames.pages.keys().copied().collect::<Vec<_>>();
        for page_id in page_ids {
            self.flush_page(&mut frames, page_id)?;
        }
        Ok(())
    }

    /// Drops a page from the pool without flushing it.
    pub fn discard_page(&self, page_id: PageID) {
        let mut frames = self.frames.lock().unwrap();
        frames.pages.remove(&page_id);
        frames.replacer.remove(page_id);
    }

    #[cfg(test)]
    pub(crate) fn resident_page_count(&self) -> usize {
        self.frames.lock().unwrap().pages.len()
    }
}

enum Replacer {
    Lru(LruReplacer),
}
impl Replacer {
    fn victim<F>(&mut self, evictable: F) -> Option<PageID>
    where
        F: Fn(&PageID) -> bool,
    {
        match self {
            Self::Lru(replacer) => replacer.victim(evictable),
        }
    }
    fn touch(&mut self, page_id: PageID) {
        match self {
            Self::Lru(replacer) => replacer.touch(page_id),
        }
    }
    fn remove(&mut self, page_id: PageID) {
        match self {
            Self::Lru(replacer) => replacer.remove(page_id),
        }
    }
}
impl Default for Replacer {
    fn default() -> Self {
        Self::Lru(LruReplacer::default())
    }
}

#[derive(Default)]
struct LruReplacer {
    page_map: HashMap<PageID, u128>,
    counter: u128,
}
impl LruReplacer {
    /// Least-recently-touched page for which `evictable` holds.
    fn victim<F>(&mut self, evictable: F) -> Option<PageID>
    where
        F: Fn(&PageID) -> bool,
    {
        let mut min_page_id = None;
        let mut min_counter = u128::MAX;
        for (&page_id, &counter) in self.page_map.iter() {
            if counter < min_counter && evictable(&page_id) {
                min_page_id = Some(page_id);
                min_counter = counter;
            }
        }
        if let Some(page_id) = min_page_id {
            self.page_map.remove(&page_id);
        }
        min_page_id
    }
    fn touch(&mut self, page_id: PageID) {
        self.page_map.insert(page_id, self.counter);
        self.counter = self.counter.wrapping_add(1);
    }
    fn remove(&mut self, page_id: PageID) {
        self.page_map.remove(&page_id);
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::*;
    use crate::common::TableID;
    use crate::table::{TableHeap, TableIterator};
    use crate::test_helpers::{int_tuple, two_int_schema};

    fn page(table_id: TableID, page_no: u32) -> PageID {
        PageID::new(table_id, page_no)
    }

    #[test]
    fn test_lru_replacer() {
        let mut replacer = LruReplacer::default();

        assert_eq!(replacer.victim(|_| true), None);
        let p = |n| PageID::new(TableID(1), n);
        replacer.touch(p(1));
        replacer.touch(p(2));
        replacer.touch(p(3));
        replacer.touch(p(1));
        assert_eq!(replacer.victim(|_| true), Some(p(2)));
        assert_eq!(replacer.victim(|page_id| *page_id != p(3)), Some(p(1)));
        assert_eq!(replacer.victim(|page_id| *page_id != p(3)), None);
        assert_eq!(replacer.victim(|_| true), Some(p(3)));
        assert_eq!(replacer.victim(|_| true), None);
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        catalog: Arc<Catalog>,
        buffer_pool: Arc<BufferPool>,
        table: Arc<TableHeap>,
    }

    fn setup(pool_size: usize) -> Result<Fixture> {
        let dir = tempdir()?;
        let catalog = Arc::new(Catalog::new());
        let lock_manager = Arc::new(LockManager::new());
        let buffer_pool = Arc::new(BufferPool::new(catalog.clone(), lock_manager, pool_size));
        let table = catalog.register(
            "t1",
            TableHeap::open(&dir.path().join("t1.tbl"), two_int_schema())?,
        )?;
        Ok(Fixture {
            _dir: dir,
            catalog,
            buffer_pool,
            table,
        })
    }

    fn scan_values(fixture: &Fixture, txn_id: TransactionID) -> Result<Vec<Vec<i32>>> {
        use crate::value::{IntValue, Value};
        let mut iter = TableIterator::new(
            fixture.table.clone(),
            fixture.buffer_pool.clone(),
            txn_id,
        );
        let mut rows = vec![];
        while let Some(tuple) = iter.next()? {
            rows.push(
                tuple
                    .values()
                    .iter()
                    .map(|v| match v {
                        Value::Int(IntValue(i)) => *i,
                        other => panic!("unexpected value {:?}", other),
                    })
                    .collect(),
            );
        }
        Ok(rows)
    }

    #[test]
    fn test_commit_makes_insert_visible_and_durable() -> Result<()> {
        let fixture = setup(8)?;
        let t1 = TransactionID(1);
        fixture
            .buffer_pool
            .insert_tuple(t1, fixture.table.table_id(), int_tuple(42, 42))?;
        fixture.buffer_pool.transaction_complete(t1, true)?;

        let t2 = TransactionID(2);
        assert_eq!(scan_values(&fixture, t2)?, vec![vec![42, 42]]);
        fixture.buffer_pool.transaction_complete(t2, false)?;

        // A cold pool over the same file still sees the committed row.
        let cold_pool = Arc::new(BufferPool::new(
            fixture.catalog.clone(),
            Arc::new(LockManager::new()),
            8,
        ));
        let t3 = TransactionID(3);
        let mut iter = TableIterator::new(fixture.table.clone(), cold_pool, t3);
        let row = iter.next()?.unwrap();
        assert_eq!(row.values(), int_tuple(42, 42).values());
        Ok(())
    }

    #[test]
    fn test_abort_rolls_back_insert() -> Result<()> {
        let fixture = setup(8)?;
        let t1 = TransactionID(1);
        fixture
            .buffer_pool
            .insert_tuple(t1, fixture.table.table_id(), int_tuple(99, 99))?;
        fixture.buffer_pool.transaction_complete(t1, false)?;

        let t2 = TransactionID(2);
        assert_eq!(scan_values(&fixture, t2)?, Vec::<Vec<i32>>::new());
        Ok(())
    }

    #[test]
    fn test_delete_without_rid_fails() -> Result<()> {
        let fixture = setup(8)?;
        let result = fixture
            .buffer_pool
            .delete_tuple(TransactionID(1), &int_tuple(1, 1));
        assert!(matches!(result, Err(DbError::Db(_))));
        Ok(())
    }

    #[test]
    fn test_full_pool_of_dirty_pages_rejects_new_page() -> Result<()> {
        let fixture = setup(1)?;
        let dir = tempdir()?;
        let other = fixture.catalog.register(
            "t2",
            TableHeap::open(&dir.path().join("t2.tbl"), two_int_schema())?,
        )?;

        let t1 = TransactionID(1);
        fixture
            .buffer_pool
            .insert_tuple(t1, fixture.table.table_id(), int_tuple(1, 1))?;

        // The only frame is dirty; a second transaction cannot page in.
        let t2 = TransactionID(2);
        let result = fixture
            .buffer_pool
            .get_page(t2, page(other.table_id(), 0), Permission::ReadOnly);
        assert!(matches!(result, Err(DbError::Db(_))));

        // The dirtied page was not pushed to disk to make room.
        let on_disk = fixture
            .table
            .read_page(page(fixture.table.table_id(), 0))?;
        assert_eq!(on_disk.tuples().count(), 0);

        // Once the writer commits, the frame is clean and evictable.
        fixture.buffer_pool.transaction_complete(t1, true)?;
        fixture
            .buffer_pool
            .get_page(t2, page(other.table_id(), 0), Permission::ReadOnly)?;
        assert_eq!(fixture.buffer_pool.resident_page_count(), 1);
        Ok(())
    }

    #[test]
    fn test_eviction_respects_pool_size() -> Result<()> {
        let fixture = setup(2)?;
        let t1 = TransactionID(1);
        // Materialize four clean pages by reading past the current end.
        for page_no in 0..4 {
            fixture.buffer_pool.get_page(
                t1,
                page(fixture.table.table_id(), page_no),
                Permission::ReadOnly,
            )?;
            assert!(fixture.buffer_pool.resident_page_count() <= 2);
        }
        fixture.buffer_pool.transaction_complete(t1, true)?;
        Ok(())
    }

    #[test]
    fn test_discard_page_drops_without_flush() -> Result<()> {
        let fixture = setup(8)?;
        let t1 = TransactionID(1);
        fixture
            .buffer_pool
            .insert_tuple(t1, fixture.table.table_id(), int_tuple(5, 5))?;
        let page_id = page(fixture.table.table_id(), 0);
        fixture.buffer_pool.discard_page(page_id);
        assert_eq!(fixture.buffer_pool.resident_page_count(), 0);

        let on_disk = fixture.table.read_page(page_id)?;
        assert_eq!(on_disk.tuples().count(), 0);
        Ok(())
    }

    #[test]
    fn test_flush_all_pages() -> Result<()> {
        let fixture = setup(8)?;
        let t1 = TransactionID(1);
        fixture
            .buffer_pool
            .insert_tuple(t1, fixture.table.table_id(), int_tuple(7, 7))?;
        fixture.buffer_pool.flush_all_pages()?;

        let on_disk = fixture
            .table
            .read_page(page(fixture.table.table_id(), 0))?;
        assert_eq!(on_disk.tuples().count(), 1);
        Ok(())
    }
}
