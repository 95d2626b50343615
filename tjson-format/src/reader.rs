//! Path-aware cursor over a parsed JSON document

use crate::error::{JsonError, RangeError, RangeReason, TypeError};
use crate::path::JsonPath;
use crate::token::Token;
use serde_json::Value;

/// Longest rendering of a value embedded in an error message
const MAX_RENDERED_LEN: usize = 128;

/// Read access to one JSON value together with its location
#[derive(Debug, Clone)]
pub struct JsonReader<'a> {
    value: &'a Value,
    path: JsonPath,
}

impl<'a> JsonReader<'a> {
    /// Reader positioned at the document root
    pub fn new(value: &'a Value) -> Self {
        Self {
            value,
            path: JsonPath::root(),
        }
    }

    /// Reader for `value` located at `path`
    pub fn at(value: &'a Value, path: JsonPath) -> Self {
        Self { value, path }
    }

    /// The raw value
    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// Location of the value
    pub fn path(&self) -> &JsonPath {
        &self.path
    }

    /// Kind of the value
    pub fn peek(&self) -> Token {
        Token::of(self.value)
    }

    /// True for `null`
    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    /// Literal text of a number token
    pub fn number_text(&self) -> Option<String> {
        match self.value {
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }

    /// Member `key` of an object value
    pub fn field(&self, key: &str) -> Option<JsonReader<'a>> {
        self.value
            .as_object()
            .and_then(|object| object.get(key))
            .map(|value| JsonReader::at(value, self.path.key(key)))
    }

    /// Elements of an array value, in order
    pub fn elements(&self) -> Option<impl Iterator<Item = JsonReader<'a>> + '_> {
        let array = self.value.as_array()?;
        Some(
            array
                .iter()
                .enumerate()
                .map(move |(index, value)| JsonReader::at(value, self.path.index(index))),
        )
    }

    /// Members of an object value, in document order
    pub fn entries(&self) -> Option<impl Iterator<Item = (&'a str, JsonReader<'a>)> + '_> {
        let object = self.value.as_object()?;
        Some(object.iter().map(move |(key, value)| {
            (key.as_str(), JsonReader::at(value, self.path.key(key.as_str())))
        }))
    }

    /// Compact rendering of the value for diagnostics
    pub fn render(&self) -> String {
        render_value(self.value)
    }

    /// Fail unless the value has the given kind
    pub fn expect(&self, token: Token, expected: &str) -> Result<(), JsonError> {
        if self.peek() == token {
            Ok(())
        } else {
            Err(self.type_error(expected))
        }
    }

    /// A [`TypeError`] describing this value
    pub fn type_error(&self, expected: impl Into<String>) -> JsonError {
        JsonError::Type(TypeError {
            expected: expected.into(),
            found: self.peek(),
            value: self.render(),
            path: self.path.clone(),
        })
    }

    /// A [`RangeError`] describing this value
    pub fn range_error(&self, target: impl Into<String>, reason: RangeReason) -> JsonError {
        JsonError::Range(RangeError {
            detail: self
                .number_text()
                .map(truncate)
                .unwrap_or_else(|| self.render()),
            target: target.into(),
            reason,
            path: self.path.clone(),
        })
    }
}

/// Compact JSON text of `value`, truncated for error messages
pub fn render_value(value: &Value) -> String {
    truncate(value.to_string())
}

fn truncate(mut text: String) -> String {
    if text.len() > MAX_RENDERED_LEN {
        let mut cut = MAX_RENDERED_LEN;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push('…');
    }
    text
}
