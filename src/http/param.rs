// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Query and form parameter values

use std::fmt;

use serde::{Serialize, Serializer};

/// A scalar query or form parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Normalize a parameter to its canonical wire form.
///
/// Booleans become the literal strings `"true"` / `"false"`. Every other
/// scalar passes through unchanged.
pub fn normalize(value: ParamValue) -> ParamValue {
    match value {
        ParamValue::Bool(b) => ParamValue::Str(if b { "true" } else { "false" }.to_string()),
        other => other,
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(x) => write!(f, "{}", x),
            ParamValue::Str(s) => f.write_str(s),
        }
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

macro_rules! int_param {
    ($($t:ty),*) => {
        $(impl From<$t> for ParamValue {
            fn from(i: $t) -> Self {
                ParamValue::Int(i as i64)
            }
        })*
    };
}

int_param!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for ParamValue {
    fn from(x: f32) -> Self {
        ParamValue::Float(x as f64)
    }
}

impl From<f64> for ParamValue {
    fn from(x: f64) -> Self {
        ParamValue::Float(x)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

impl From<&String> for ParamValue {
    fn from(s: &String) -> Self {
        ParamValue::Str(s.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booleans_become_strings() {
        assert_eq!(normalize(true.into()), ParamValue::Str("true".into()));
        assert_eq!(normalize(false.into()), ParamValue::Str("false".into()));
    }

    #[test]
    fn test_other_scalars_pass_through() {
        for value in [
            ParamValue::Int(-7),
            ParamValue::Float(1.5),
            ParamValue::Str("yes".into()),
            ParamValue::Str(String::new()),
        ] {
            assert_eq!(normalize(value.clone()), value);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(ParamValue::from(42u16).to_string(), "42");
        assert_eq!(ParamValue::from(0.25).to_string(), "0.25");
        assert_eq!(ParamValue::from("a b").to_string(), "a b");
    }
}
