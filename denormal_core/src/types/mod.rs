pub mod datatype;
pub mod value;

use value::Value;

/// A row is a vector of values, one per column
pub type Row = Vec<Value>;

/// A stored row together with its primary key
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub pk: i64,
    pub values: Row,
}

impl Record {
    pub fn new(pk: i64, values: Row) -> Self {
        Self { pk, values }
    }
}
