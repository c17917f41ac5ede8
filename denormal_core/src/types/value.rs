use std::fmt;
use std::str::FromStr;

use crate::types::datatype::DataType;
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Text(String),
}

impl Value {
    /// Type of a non-null value. `Null` has no type of its own.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(DataType::Bool),
            Value::Int(_) => Some(DataType::Int),
            Value::Decimal(_) => Some(DataType::Decimal),
            Value::Text(_) => Some(DataType::Text),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.data_type().map(|t| t.as_str()).unwrap_or("null")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&value_to_string(self))
    }
}

pub fn value_to_string(v: &Value) -> String {
    match v {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Decimal(d) => d.normalize().to_string(),
        Value::Text(s) => s.clone(),
    }
}

/// Encodes a value for the row files. Decimals are written as strings so
/// no precision is lost through JSON numbers.
pub fn value_to_json(v: &Value) -> JsonValue {
    match v {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(n) => JsonValue::from(*n),
        Value::Decimal(d) => JsonValue::String(d.to_string()),
        Value::Text(s) => JsonValue::String(s.clone()),
    }
}

pub fn value_from_json(dtype: &DataType, json: &JsonValue) -> Result<Value, String> {
    if json.is_null() {
        return Ok(Value::Null);
    }
    match dtype {
        DataType::Int => json
            .as_i64()
            .map(Value::Int)
            .ok_or_else(|| format!("Expected int but got '{json}'")),
        DataType::Bool => json
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| format!("Expected bool but got '{json}'")),
        DataType::Text => json
            .as_str()
            .map(|s| Value::Text(s.to_string()))
            .ok_or_else(|| format!("Expected text but got '{json}'")),
        DataType::Decimal => {
            let parsed = match json {
                JsonValue::String(s) => Decimal::from_str(s).ok(),
                JsonValue::Number(n) => Decimal::from_str(&n.to_string()).ok(),
                _ => None,
            };
            parsed
                .map(Value::Decimal)
                .ok_or_else(|| format!("Expected decimal but got '{json}'"))
        }
    }
}
