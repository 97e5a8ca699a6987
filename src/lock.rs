use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Condvar, Mutex};

use log::debug;

use crate::common::{PageID, TransactionID};
use crate::error::{DbError, DbResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lock {
    Shared,
    Exclusive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ReadOnly,
    ReadWrite,
}

impl Permission {
    pub fn to_lock(&self) -> Lock {
        match self {
            Permission::ReadOnly => Lock::Shared,
            Permission::ReadWrite => Lock::Exclusive,
        }
    }
}

struct LockRequest {
    txn_id: TransactionID,
    lock: Lock,
}

struct PageLockState {
    // Meaningful only while `holders` is non-empty; exclusive implies a
    // single holder.
    exclusive: bool,
    holders: HashSet<TransactionID>,
    queue: VecDeque<LockRequest>,
    condvar: Arc<Condvar>,
}

impl PageLockState {
    fn new() -> Self {
        Self {
            exclusive: false,
            holders: HashSet::new(),
            queue: VecDeque::new(),
            condvar: Arc::new(Condvar::new()),
        }
    }
}

#[derive(Default)]
struct TxnLockState {
    wounded: bool,
    waiting_on: Option<PageID>,
    wait_granted: bool,
    held: HashSet<PageID>,
}

#[derive(Default)]
struct LockTable {
    pages: HashMap<PageID, PageLockState>,
    txns: HashMap<TransactionID, TxnLockState>,
}

impl LockTable {
    /// Marks the victim for abort and pulls its outstanding request (if
    /// any) out of whatever queue holds it, waking the victim's thread.
    fn wound(&mut self, victim: TransactionID) {
        let txn = self.txns.entry(victim).or_default();
        txn.wounded = true;
        if let Some(page_id) = txn.waiting_on.take() {
            let page = self
                .pages
                .get_mut(&page_id)
                .expect("waiting transaction with no page lock state");
            page.queue.retain(|r| r.txn_id != victim);
            page.condvar.notify_all();
            self.remove_if_idle(page_id);
        }
    }

    /// Wound-wait step: abort every younger transaction that holds or
    /// awaits this page in a mode incompatible with `requested`.
    fn wound_younger(&mut self, txn_id: TransactionID, page_id: PageID, requested: Lock) {
        let Some(page) = self.pages.get(&page_id) else {
            return;
        };
        let mut victims: Vec<TransactionID> = Vec::new();
        if requested == Lock::Exclusive || page.exclusive {
            victims.extend(page.holders.iter().copied().filter(|h| *h > txn_id));
        }
        victims.extend(
            page.queue
                .iter()
                .filter(|r| {
                    r.txn_id > txn_id
                        && (r.lock == Lock::Exclusive || requested == Lock::Exclusive)
                })
                .map(|r| r.txn_id),
        );
        for victim in victims {
            debug!("wound {:?} on behalf of {:?} at {:?}", victim, txn_id, page_id);
            self.wound(victim);
        }
    }

    /// Grants from the head of the queue while the head is compatible:
    /// nobody holds the page, the head is a reader joining readers, or the
    /// sole holder is the head itself (self-upgrade).
    fn make_progress(&mut self, page_id: PageID) {
        let Some(page) = self.pages.get_mut(&page_id) else {
            return;
        };
        let mut granted: Vec<TransactionID> = Vec::new();
        while let Some(head) = page.queue.front() {
            let grantable = page.holders.is_empty()
                || (!page.exclusive && head.lock == Lock::Shared)
                || (page.holders.len() == 1 && page.holders.contains(&head.txn_id));
            if !grantable {
                break;
            }
            let request = page.queue.pop_front().unwrap();
            if request.lock == Lock::Exclusive {
                page.exclusive = true;
            } else if page.holders.is_empty() {
                page.exclusive = false;
            }
            page.holders.insert(request.txn_id);
            granted.push(request.txn_id);
        }
        if granted.is_empty() {
            return;
        }
        page.condvar.notify_all();
        for txn_id in granted {
            debug!("grant {:?} at {:?}", txn_id, page_id);
            let txn = self.txns.get_mut(&txn_id).expect("granted unknown transaction");
            txn.waiting_on = None;
            txn.wait_granted = true;
            txn.held.insert(page_id);
        }
    }

    fn release(&mut self, txn_id: TransactionID, page_id: PageID) {
        let page = self
            .pages
            .get_mut(&page_id)
            .expect("release of a page with no lock state");
        let removed = page.holders.remove(&txn_id);
        assert!(removed, "release of a page not held");
        if page.holders.is_empty() {
            page.exclusive = false;
        }
        self.make_progress(page_id);
        self.remove_if_idle(page_id);
    }

    fn remove_if_idle(&mut self, page_id: PageID) {
        if let Some(page) = self.pages.get(&page_id) {
            if page.holders.is_empty() && page.queue.is_empty() {
                self.pages.remove(&page_id);
            }
        }
    }
}

/// Page-granular shared/exclusive locks with wound-wait deadlock avoidance.
/// One mutex guards the whole table; waiters park on a per-page condvar.
/// Locks are strict two-phase: `release_all` at commit or abort is the only
/// release path.
pub struct LockManager {
    table: Mutex<LockTable>,
}

impl LockManager {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(LockTable::default()),
        }
    }

    pub fn lock(&self, txn_id: TransactionID, page_id: PageID, lock: Lock) -> DbResult<()> {
        let mut table = self.table.lock().unwrap();

        if table.txns.entry(txn_id).or_default().wounded {
            return Err(DbError::TransactionAborted(txn_id));
        }

        // Already holding a sufficient lock.
        if let Some(page) = table.pages.get(&page_id) {
            if page.holders.contains(&txn_id) && (page.exclusive || lock == Lock::Shared) {
                return Ok(());
            }
        }

        table.wound_younger(txn_id, page_id, lock);

        let upgrading = table
            .pages
            .get(&page_id)
            .map_or(false, |p| p.holders.contains(&txn_id));
        if upgrading {
            // Every incompatible waiter was either younger (wounded above)
            // or older (in which case its request already wounded us and
            // the entry check failed), so the queue must drain.
            table.make_progress(page_id);
            debug_assert!(table
                .pages
                .get(&page_id)
                .map_or(true, |p| p.queue.is_empty()));
        }

        {
            let page = table.pages.entry(page_id).or_insert_with(PageLockState::new);
            debug_assert!(
                !page.queue.iter().any(|r| r.txn_id == txn_id),
                "transaction already queued on this page"
            );
            page.queue.push_back(LockRequest { txn_id, lock });
        }
        let txn = table.txns.get_mut(&txn_id).unwrap();
        txn.waiting_on = Some(page_id);
        txn.wait_granted = false;
        let condvar = table.pages[&page_id].condvar.clone();

        loop {
            table.make_progress(page_id);
            let txn = table.txns.get(&txn_id).unwrap();
            if txn.waiting_on.is_none() {
                if txn.wait_granted {
                    return Ok(());
                }
                return Err(DbError::TransactionAborted(txn_id));
            }
            table = condvar.wait(table).unwrap();
        }
    }

    /// Releases every page the transaction holds and forgets the
    /// transaction. Must not be called while the transaction has an
    /// outstanding request.
    pub fn release_all(&self, txn_id: TransactionID) {
        let mut table = self.table.lock().unwrap();
        let Some(txn) = table.txns.remove(&txn_id) else {
            return;
        };
        debug_assert!(txn.waiting_on.is_none(), "release_all with a pending request");
        for page_id in txn.held {
            debug!("release {:?} at {:?}", txn_id, page_id);
            table.release(txn_id, page_id);
        }
    }

    pub fn holds_lock(&self, txn_id: TransactionID, page_id: PageID) -> Option<Lock> {
        let table = self.table.lock().unwrap();
        let page = table.pages.get(&page_id)?;
        if !page.holders.contains(&txn_id) {
            return None;
        }
        if page.exclusive {
            Some(Lock::Exclusive)
        } else {
            Some(Lock::Shared)
        }
    }
}

impl Default for LockManager {
    fn default() -> Self {
        Self::new()
    }
}
