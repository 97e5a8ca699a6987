use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::buffer::BufferPool;
use crate::common::TransactionID;
use crate::error::DbResult;

/// Hands out monotonically increasing transaction ids and funnels commit
/// and abort into the buffer pool. The id order doubles as wound-wait age:
/// an earlier id always wins conflicts.
pub struct TransactionManager {
    next_txn_id: AtomicU64,
    buffer_pool: Arc<BufferPool>,
}

impl TransactionManager {
    pub fn new(buffer_pool: Arc<BufferPool>) -> Self {
        Self {
            next_txn_id: AtomicU64::new(1),
            buffer_pool,
        }
    }

    pub fn begin(&self) -> TransactionID {
        TransactionID(self.next_txn_id.fetch_add(1, Ordering::Relaxed))
    }

    pub fn commit(&self, txn_id: TransactionID) -> DbResult<()> {
        self.buffer_pool.transaction_complete(txn_id, true)
    }

    pub fn abort(&self, txn_id: TransactionID) -> DbResult<()> {
        self.buffer_pool.transaction_complete(txn_id, false)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::Catalog;
    use crate::lock::LockManager;

    #[test]
    fn test_begin_is_monotonic() {
        let catalog = Arc::new(Catalog::new());
        let buffer_pool = Arc::new(BufferPool::new(
            catalog,
            Arc::new(LockManager::new()),
            4,
        ));
        let transaction_manager = TransactionManager::new(buffer_pool);
        let a = transaction_manager.begin();
        let b = transaction_manager.begin();
        let c = transaction_manager.begin();
        assert!(a < b && b < c);
    }
}
