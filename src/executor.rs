use std::sync::Arc;

use crate::buffer::BufferPool;
use crate::catalog::{Catalog, Schema};
use crate::common::TransactionID;
use crate::error::DbResult;
use crate::tuple::Tuple;

use self::{
    delete_executor::DeleteExecutor, filter_executor::FilterExecutor,
    insert_executor::InsertExecutor, nested_loop_join_executor::NestedLoopJoinExecutor,
    project_executor::ProjectExecutor, seq_scan_executor::SeqScanExecutor,
};

pub mod delete_executor;
pub mod filter_executor;
pub mod insert_executor;
pub mod nested_loop_join_executor;
pub mod project_executor;
pub mod seq_scan_executor;

pub struct ExecutorContext {
    pub transaction_id: TransactionID,
    pub buffer_pool: Arc<BufferPool>,
    pub catalog: Arc<Catalog>,
}

/// A node in a pull-based executor tree. `init` opens the node, `next`
/// yields tuples until it returns None (and keeps returning None past the
/// end), `rewind` restarts the node from the first tuple. Calling `next`
/// before `init` is a programmer error. `TransactionAborted` from a lock
/// acquisition below is never swallowed; it unwinds the whole tree so the
/// driver can abort the transaction.
pub enum Executor<'a> {
    SeqScan(SeqScanExecutor<'a>),
    Filter(FilterExecutor<'a>),
    Project(ProjectExecutor<'a>),
    NestedLoopJoin(NestedLoopJoinExecutor<'a>),
    Insert(InsertExecutor<'a>),
    Delete(DeleteExecutor<'a>),
}

impl Executor<'_> {
    pub fn init(&mut self) -> DbResult<()> {
        match self {
            Executor::SeqScan(executor) => executor.init(),
            Executor::Filter(executor) => executor.init(),
            Executor::Project(executor) => executor.init(),
            Executor::NestedLoopJoin(executor) => executor.init(),
            Executor::Insert(executor) => executor.init(),
            Executor::Delete(executor) => executor.init(),
        }
    }
    pub fn next(&mut self) -> DbResult<Option<Tuple>> {
        match self {
            Executor::SeqScan(executor) => executor.next(),
            Executor::Filter(executor) => executor.next(),
            Executor::Project(executor) => executor.next(),
            Executor::NestedLoopJoin(executor) => executor.next(),
            Executor::Insert(executor) => executor.next(),
            Executor::Delete(executor) => executor.next(),
        }
    }
    pub fn rewind(&mut self) -> DbResult<()> {
        match self {
            Executor::SeqScan(executor) => executor.rewind(),
            Executor::Filter(executor) => executor.rewind(),
            Executor::Project(executor) => executor.rewind(),
            Executor::NestedLoopJoin(executor) => executor.rewind(),
            Executor::Insert(executor) => executor.rewind(),
            Executor::Delete(executor) => executor.rewind(),
        }
    }
    pub fn schema(&self) -> &Schema {
        match self {
            Executor::SeqScan(executor) => executor.schema(),
            Executor::Filter(executor) => executor.schema(),
            Executor::Project(executor) => executor.schema(),
            Executor::NestedLoopJoin(executor) => executor.schema(),
            Executor::Insert(executor) => executor.schema(),
            Executor::Delete(executor) => executor.schema(),
        }
    }
}
