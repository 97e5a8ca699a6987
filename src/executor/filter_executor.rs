use crate::catalog::Schema;
use crate::error::DbResult;
use crate::predicate::Predicate;
use crate::tuple::Tuple;

use super::{Executor, ExecutorContext};

pub struct FilterExecutor<'a> {
    pub predicate: Predicate,
    pub child: Box<Executor<'a>>,
    pub executor_context: &'a ExecutorContext,
}

impl<'a> FilterExecutor<'a> {
    pub fn new(
        executor_context: &'a ExecutorContext,
        child: Box<Executor<'a>>,
        predicate: Predicate,
    ) -> Self {
        Self {
            predicate,
            child,
            executor_context,
        }
    }

    pub fn init(&mut self) -> DbResult<()> {
        self.child.init()
    }

    pub fn next(&mut self) -> DbResult<Option<Tuple>> {
        while let Some(tuple) = self.child.next()? {
            if self.predicate.matches(&tuple) {
                return Ok(Some(tuple));
            }
        }
        Ok(None)
    }

    pub fn rewind(&mut self) -> DbResult<()> {
        self.child.rewind()
    }

    pub fn schema(&self) -> &Schema {
        self.child.schema()
    }
}
