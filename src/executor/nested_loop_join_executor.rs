use crate::catalog::Schema;
use crate::error::DbResult;
use crate::predicate::JoinPredicate;
use crate::tuple::Tuple;

use super::{Executor, ExecutorContext};

/// Nested-loops join: every outer tuple is matched against the full inner
/// child, which is rewound once per outer tuple. Output columns are the
/// outer columns followed by the inner columns.
pub struct NestedLoopJoinExecutor<'a> {
    pub predicate: JoinPredicate,
    pub outer_child: Box<Executor<'a>>,
    pub inner_child: Box<Executor<'a>>,
    pub executor_context: &'a ExecutorContext,
    outer_tuple: Option<Tuple>,
    schema: Schema,
}

impl<'a> NestedLoopJoinExecutor<'a> {
    pub fn new(
        executor_context: &'a ExecutorContext,
        outer_child: Box<Executor<'a>>,
        inner_child: Box<Executor<'a>>,
        predicate: JoinPredicate,
    ) -> Self {
        let mut columns = outer_child.schema().columns.clone();
        columns.extend(inner_child.schema().columns.iter().cloned());
        Self {
            predicate,
            outer_child,
            inner_child,
            executor_context,
            outer_tuple: None,
            schema: Schema { columns },
        }
    }

    pub fn init(&mut self) -> DbResult<()> {
        self.outer_child.init()?;
        self.inner_child.init()?;
        self.outer_tuple = self.outer_child.next()?;
        Ok(())
    }

    pub fn next(&mut self) -> DbResult<Option<Tuple>> {
        while let Some(outer) = &self.outer_tuple {
            while let Some(inner) = self.inner_child.next()? {
                if self.predicate.matches(outer, &inner) {
                    let mut values = outer.values().to_vec();
                    values.extend(inner.into_values());
                    return Ok(Some(Tuple::new(values)));
                }
            }
            self.outer_tuple = self.outer_child.next()?;
            self.inner_child.rewind()?;
        }
        Ok(None)
    }

    pub fn rewind(&mut self) -> DbResult<()> {
        self.outer_child.rewind()?;
        self.inner_child.rewind()?;
        self.outer_tuple = self.outer_child.next()?;
        Ok(())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}
