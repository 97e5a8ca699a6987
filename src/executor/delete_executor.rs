use crate::catalog::Schema;
use crate::error::DbResult;
use crate::tuple::Tuple;
use crate::value::{IntValue, Value};

use super::insert_executor::count_schema;
use super::{Executor, ExecutorContext};

/// Routes every tuple the child produces to the delete path of the table
/// owning its record id, then yields a single one-column tuple with the
/// number of deleted rows. Rewinding re-runs the deletion (test-harness
/// contract, same as the insert side).
pub struct DeleteExecutor<'a> {
    pub child: Box<Executor<'a>>,
    pub executor_context: &'a ExecutorContext,
    count: i32,
    executed: bool,
    schema: Schema,
}

impl<'a> DeleteExecutor<'a> {
    pub fn new(executor_context: &'a ExecutorContext, child: Box<Executor<'a>>) -> Self {
        Self {
            child,
            executor_context,
            count: 0,
            executed: false,
            schema: count_schema(),
        }
    }

    pub fn init(&mut self) -> DbResult<()> {
        self.child.init()?;
        self.drain_child()
    }

    fn drain_child(&mut self) -> DbResult<()> {
        self.count = 0;
        self.executed = false;
        while let Some(tuple) = self.child.next()? {
            self.executor_context
                .buffer_pool
                .delete_tuple(self.executor_context.transaction_id, &tuple)?;
            self.count += 1;
        }
        Ok(())
    }

    pub fn next(&mut self) -> DbResult<Option<Tuple>> {
        if self.executed {
            return Ok(None);
        }
        self.executed = true;
        Ok(Some(Tuple::new(vec![Value::Int(IntValue(self.count))])))
    }

    pub fn rewind(&mut self) -> DbResult<()> {
        self.child.rewind()?;
        self.drain_child()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}
