use crate::catalog::{Column, DataType, Schema};
use crate::common::TableID;
use crate::error::{DbError, DbResult};
use crate::tuple::Tuple;
use crate::value::{IntValue, Value};

use super::{Executor, ExecutorContext};

/// Drains its child into the target table when initialized, then yields a
/// single one-column tuple holding the number of inserted rows. Rewinding
/// re-runs the insertion; that exists for test harnesses and offers no
/// protection against double insertion.
pub struct InsertExecutor<'a> {
    pub table_id: TableID,
    pub child: Box<Executor<'a>>,
    pub executor_context: &'a ExecutorContext,
    count: i32,
    executed: bool,
    schema: Schema,
}

impl<'a> InsertExecutor<'a> {
    pub fn new(
        executor_context: &'a ExecutorContext,
        child: Box<Executor<'a>>,
        table_id: TableID,
    ) -> Self {
        Self {
            table_id,
            child,
            executor_context,
            count: 0,
            executed: false,
            schema: count_schema(),
        }
    }

    pub fn init(&mut self) -> DbResult<()> {
        let table = self.executor_context.catalog.table(self.table_id)?;
        if self.child.schema() != table.schema() {
            return Err(DbError::Db(format!(
                "cannot insert: child schema {:?} does not match table schema {:?}",
                self.child.schema(),
                table.schema()
            )));
        }
        self.child.init()?;
        self.drain_child()
    }

    fn drain_child(&mut self) -> DbResult<()> {
        self.count = 0;
        self.executed = false;
        while let Some(tuple) = self.child.next()? {
            self.executor_context.buffer_pool.insert_tuple(
                self.executor_context.transaction_id,
                self.table_id,
                tuple,
            )?;
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

pub(super) fn count_schema() -> Schema {
    Schema {
        columns: vec![Column {
            name: "count".to_string(),
            data_type: DataType::Int,
        }],
    }
}
