use crate::catalog::Schema;
use crate::error::DbResult;
use crate::tuple::Tuple;

use super::{Executor, ExecutorContext};

/// Reorders or subsets the child's columns by index.
pub struct ProjectExecutor<'a> {
    pub column_indexes: Vec<usize>,
    pub child: Box<Executor<'a>>,
    pub executor_context: &'a ExecutorContext,
    schema: Schema,
}

impl<'a> ProjectExecutor<'a> {
    pub fn new(
        executor_context: &'a ExecutorContext,
        child: Box<Executor<'a>>,
        column_indexes: Vec<usize>,
    ) -> Self {
        let schema = Schema {
            columns: column_indexes
                .iter()
                .map(|&i| child.schema().columns[i].clone())
                .collect(),
        };
        Self {
            column_indexes,
            child,
            executor_context,
            schema,
        }
    }

    pub fn init(&mut self) -> DbResult<()> {
        self.child.init()
    }

    pub fn next(&mut self) -> DbResult<Option<Tuple>> {
        let Some(tuple) = self.child.next()? else {
            return Ok(None);
        };
        let values = self
            .column_indexes
            .iter()
            .map(|&i| tuple.value(i).clone())
            .collect();
        Ok(Some(Tuple::new(values)))
    }

    pub fn rewind(&mut self) -> DbResult<()> {
        self.child.rewind()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}
