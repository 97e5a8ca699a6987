use anyhow::Result;
use tempfile::{tempdir, TempDir};

use crate::catalog::{Column, DataType, Schema};
use crate::common::DEFAULT_POOL_SIZE;
use crate::instance::Instance;
use crate::tuple::Tuple;
use crate::value::{IntValue, Value};

pub fn two_int_schema() -> Schema {
    Schema {
        columns: vec![
            Column {
                name: "c1".to_string(),
                data_type: DataType::Int,
            },
            Column {
                name: "c2".to_string(),
                data_type: DataType::Int,
            },
        ],
    }
}

pub fn int_tuple(a: i32, b: i32) -> Tuple {
    Tuple::new(vec![Value::Int(IntValue(a)), Value::Int(IntValue(b))])
}

/// Fresh instance over a temp directory with an empty two-int-column table
/// `t1`. The TempDir keeps the files alive for the test's duration.
pub fn setup_test_instance() -> Result<(Instance, TempDir)> {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempdir()?;
    let instance = Instance::new(dir.path(), DEFAULT_POOL_SIZE)?;
    instance.create_table("t1", two_int_schema())?;
    Ok((instance, dir))
}
