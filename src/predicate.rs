use std::cmp::Ordering;

use crate::tuple::Tuple;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEq,
    LessThan,
    LessThanOrEq,
}

impl Op {
    fn matches(&self, ordering: Option<Ordering>) -> bool {
        // Values of different types never compare.
        let Some(ordering) = ordering else {
            return false;
        };
        match self {
            Op::Equals => ordering == Ordering::Equal,
            Op::NotEquals => ordering != Ordering::Equal,
            Op::GreaterThan => ordering == Ordering::Greater,
            Op::GreaterThanOrEq => ordering != Ordering::Less,
            Op::LessThan => ordering == Ordering::Less,
            Op::LessThanOrEq => ordering != Ordering::Greater,
        }
    }
}

/// Compares one column of a tuple against a constant.
#[derive(Debug, Clone)]
pub struct Predicate {
    pub column_index: usize,
    pub op: Op,
    pub operand: Value,
}

impl Predicate {
    pub fn new(column_index: usize, op: Op, operand: Value) -> Self {
        Self {
            column_index,
            op,
            operand,
        }
    }

    pub fn matches(&self, tuple: &Tuple) -> bool {
        self.op
            .matches(tuple.value(self.column_index).compare(&self.operand))
    }
}

/// Compares one column of the left tuple against one column of the right.
#[derive(Debug, Clone)]
pub struct JoinPredicate {
    pub left_index: usize,
    pub op: Op,
    pub right_index: usize,
}

impl JoinPredicate {
    pub fn new(left_index: usize, op: Op, right_index: usize) -> Self {
        Self {
            left_index,
            op,
            right_index,
        }
    }

    pub fn matches(&self, left: &Tuple, right: &Tuple) -> bool {
        self.op
            .matches(left.value(self.left_index).compare(right.value(self.right_index)))
    }
}
