//! Typed parameter values carried by workflow tasks.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single parameter value bound to a pipeline component.
///
/// Values stay typed through serialization: a replica count is written as
/// a YAML integer and read back as one, a flag stays a boolean. Untagged
/// variants are tried in declaration order, so scalars resolve before the
/// string fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<ParamValue>),
}

impl ParamValue {
    /// String slice view, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view, if this is an integer value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Boolean view, if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Str(s) => write!(f, "{}", s),
            ParamValue::List(items) => {
                let joined: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", joined.join(", "))
            }
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Int(i64::from(v))
    }
}

impl From<u16> for ParamValue {
    fn from(v: u16) -> Self {
        ParamValue::Int(i64::from(v))
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

impl From<&[String]> for ParamValue {
    fn from(items: &[String]) -> Self {
        ParamValue::List(items.iter().map(|s| ParamValue::from(s.clone())).collect())
    }
}
