//! Token kind enumeration

use serde_json::Value;
use std::fmt;

/// Kind of a JSON value as seen by an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// `null`
    Null,
    /// `true` or `false`
    Bool,
    /// Number literal
    Number,
    /// String literal
    String,
    /// Array
    Array,
    /// Object
    Object,
}

impl Token {
    /// Classify a parsed JSON value
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Token::Null,
            Value::Bool(_) => Token::Bool,
            Value::Number(_) => Token::Number,
            Value::String(_) => Token::String,
            Value::Array(_) => Token::Array,
            Value::Object(_) => Token::Object,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Token::Null => "NULL",
            Token::Bool => "BOOLEAN",
            Token::Number => "NUMBER",
            Token::String => "STRING",
            Token::Array => "ARRAY",
            Token::Object => "OBJECT",
        };
        f.write_str(name)
    }
}
