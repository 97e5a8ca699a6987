use crate::catalog::Schema;
use crate::common::RID;
use crate::value::Value;

/// One row. The RID is set while the tuple sits in a slot on a page and is
/// absent on tuples synthesized by executors (projections, join output,
/// mutation counts).
#[derive(Debug, PartialEq, Clone)]
pub struct Tuple {
    pub rid: Option<RID>,
    values: Vec<Value>,
}

impl Tuple {
    pub fn new(values: Vec<Value>) -> Tuple {
        Tuple { rid: None, values }
    }

    pub fn value(&self, index: usize) -> &Value {
        &self.values[index]
    }

    pub fn set_value(&mut self, index: usize, value: Value) {
        self.values[index] = value;
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// True when every value fits the corresponding column of `schema`.
    pub fn fits(&self, schema: &Schema) -> bool {
        self.values.len() == schema.columns.len()
            && self
                .values
                .iter()
                .zip(&schema.columns)
                .all(|(value, column)| value.fits(&column.data_type))
    }

    pub fn serialize(&self, schema: &Schema) -> Box<[u8]> {
        let mut bytes = Vec::with_capacity(schema.tuple_size());
        for (value, column) in self.values.iter().zip(&schema.columns) {
            bytes.extend_from_slice(&value.serialize(&column.data_type));
        }
        bytes.into()
    }

    pub fn deserialize(schema: &Schema, bytes: &[u8]) -> Tuple {
        let mut values = Vec::with_capacity(schema.columns.len());
        let mut offset = 0;
        for column in &schema.columns {
            values.push(Value::deserialize(&column.data_type, &bytes[offset..]));
            offset += column.data_type.size();
        }
        Tuple::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Column, DataType};
    use crate::value::{IntValue, VarcharValue};

    fn test_schema() -> Schema {
        Schema {
            columns: vec![
                Column {
                    name: "id".to_string(),
                    data_type: DataType::Int,
                },
                Column {
                    name: "name".to_string(),
                    data_type: DataType::Varchar(8),
                },
                Column {
                    name: "age".to_string(),
                    data_type: DataType::Int,
                },
            ],
        }
    }

    #[test]
    fn test_serialize_roundtrip() {
        let schema = test_schema();
        let tuple = Tuple::new(vec![
            Value::Int(IntValue(1)),
            Value::Varchar(VarcharValue("foo".to_string())),
            Value::Int(IntValue(20)),
        ]);
        let bytes = tuple.serialize(&schema);
        assert_eq!(bytes.len(), schema.tuple_size());
        let decoded = Tuple::deserialize(&schema, &bytes);
        assert_eq!(decoded, tuple);
    }

    #[test]
    fn test_fits() {
        let schema = test_schema();
        let tuple = Tuple::new(vec![
            Value::Int(IntValue(1)),
            Value::Varchar(VarcharValue("foo".to_string())),
            Value::Int(IntValue(20)),
        ]);
        assert!(tuple.fits(&schema));

        let too_few = Tuple::new(vec![Value::Int(IntValue(1))]);
        assert!(!too_few.fits(&schema));

        let wrong_type = Tuple::new(vec![
            Value::Int(IntValue(1)),
            Value::Int(IntValue(2)),
            Value::Int(IntValue(20)),
        ]);
        assert!(!wrong_type.fits(&schema));
    }

    #[test]
    fn test_set_value() {
        let mut tuple = Tuple::new(vec![Value::Int(IntValue(1)), Value::Int(IntValue(2))]);
        tuple.set_value(1, Value::Int(IntValue(7)));
        assert_eq!(tuple.value(1), &Value::Int(IntValue(7)));
    }
}
