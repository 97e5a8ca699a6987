use std::cmp::Ordering;
use std::fmt;

use crate::catalog::DataType;

#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Value {
    Int(IntValue),
    Varchar(VarcharValue),
}
impl Value {
    pub fn serialize(&self, data_type: &DataType) -> Box<[u8]> {
        debug_assert!(self.fits(data_type));
        match self {
            Value::Int(value) => value.serialize(),
            Value::Varchar(value) => value.serialize(data_type.size() - 4),
        }
    }
    pub fn deserialize(data_type: &DataType, bytes: &[u8]) -> Self {
        match data_type {
            DataType::Int => Value::Int(IntValue::from(bytes)),
            DataType::Varchar(_) => Value::Varchar(VarcharValue::from(bytes)),
        }
    }
    // A value fits a column when the variant matches and, for varchars, the
    // string fits the column capacity.
    pub fn fits(&self, data_type: &DataType) -> bool {
        match (self, data_type) {
            (Value::Int(_), DataType::Int) => true,
            (Value::Varchar(value), DataType::Varchar(capacity)) => value.0.len() <= *capacity,
            _ => false,
        }
    }
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.0.cmp(&b.0)),
            (Value::Varchar(a), Value::Varchar(b)) => Some(a.0.cmp(&b.0)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{}", value.0),
            Value::Varchar(value) => write!(f, "{}", value.0),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct IntValue(pub i32);
impl From<&[u8]> for IntValue {
    fn from(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= 4);
        let mut buffer = [0u8; 4];
        buffer.copy_from_slice(&bytes[0..4]);
        IntValue(i32::from_be_bytes(buffer))
    }
}
impl IntValue {
    fn serialize(&self) -> Box<[u8]> {
        self.0.to_be_bytes().into()
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct VarcharValue(pub String);
impl From<&[u8]> for VarcharValue {
    fn from(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= 4);
        let mut buffer = [0u8; 4];
        buffer.copy_from_slice(&bytes[0..4]);
        let size = u32::from_be_bytes(buffer) as usize;
        let mut buffer = vec![0u8; size];
        buffer.copy_from_slice(&bytes[4..(4 + size)]);
        VarcharValue(String::from_utf8_lossy(&buffer).into_owned())
    }
}
impl VarcharValue {
    // Fixed-width encoding: a big-endian length prefix followed by exactly
    // `capacity` bytes, zero-padded past the string.
    fn serialize(&self, capacity: usize) -> Box<[u8]> {
        let bytes = self.0.as_bytes();
        let mut buffer = Vec::with_capacity(4 + capacity);
        buffer.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
        buffer.extend_from_slice(bytes);
        buffer.resize(4 + capacity, 0);
        buffer.into()
    }
}
