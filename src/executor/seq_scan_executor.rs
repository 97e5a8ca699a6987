use std::sync::Arc;

use crate::catalog::Schema;
use crate::error::DbResult;
use crate::table::{TableHeap, TableIterator};
use crate::tuple::Tuple;

use super::ExecutorContext;

pub struct SeqScanExecutor<'a> {
    pub table: Arc<TableHeap>,
    pub executor_context: &'a ExecutorContext,
    schema: Schema,
    table_iterator: Option<TableIterator>,
}

impl<'a> SeqScanExecutor<'a> {
    pub fn new(executor_context: &'a ExecutorContext, table: Arc<TableHeap>) -> Self {
        let schema = table.schema().clone();
        Self {
            table,
            executor_context,
            schema,
            table_iterator: None,
        }
    }

    pub fn init(&mut self) -> DbResult<()> {
        self.table_iterator = Some(TableIterator::new(
            self.table.clone(),
            self.executor_context.buffer_pool.clone(),
            self.executor_context.transaction_id,
        ));
        Ok(())
    }

    pub fn next(&mut self) -> DbResult<Option<Tuple>> {
        self.table_iterator
            .as_mut()
            .expect("seq scan used before init")
            .next()
    }

    pub fn rewind(&mut self) -> DbResult<()> {
        self.table_iterator
            .as_mut()
            .expect("seq scan used before init")
            .reset();
        Ok(())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}
