//! Dynamic value produced by unstructured decode.
//!
//! A [`Value`] is a closed union of everything an assignment can hold: a
//! quoted string, a signed 64-bit integer, a list of strings, or an empty
//! list.
//!
//! ## Examples
//!
//! ```rust
//! use lvmconf::Value;
//!
//! let size = Value::from(4096);
//! assert_eq!(size.as_i64(), Some(4096));
//!
//! let filter = Value::from(vec!["a|.*|", "r|.*|"]);
//! assert_eq!(filter.to_string(), r#"["a|.*|", "r|.*|"]"#);
//! assert_eq!(Value::EmptyList.to_string(), "[]");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A value decoded from one assignment.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    String(String),
    Int64(i64),
    /// Non-empty bracketed list, `[ "a", "b" ]`
    List(Vec<String>),
    /// `[]`
    EmptyList,
}

impl Value {
    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_i64(&self) -> bool {
        matches!(self, Value::Int64(_))
    }

    /// Returns `true` for both non-empty and empty lists.
    #[inline]
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Value::List(_) | Value::EmptyList)
    }

    /// If the value is a string, returns it. Otherwise returns `None`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lvmconf::Value;
    ///
    /// assert_eq!(Value::from("/etc/lvm").as_str(), Some("/etc/lvm"));
    /// assert_eq!(Value::from(1).as_str(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the list elements; an empty list yields an empty slice.
    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items),
            Value::EmptyList => Some(&[]),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Int64(_) => "int64",
            Value::List(_) => "list",
            Value::EmptyList => "empty list",
        }
    }
}

/// The default text form: what unstructured encode writes for the value.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Int64(i) => write!(f, "{}", i),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "\"{}\"", item)?;
                }
                f.write_str("]")
            }
            Value::EmptyList => f.write_str("[]"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Int64(i) => serializer.serialize_i64(*i),
            Value::List(items) => items.serialize(serializer),
            Value::EmptyList => {
                use serde::ser::SerializeSeq;
                serializer.serialize_seq(Some(0))?.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string, a 64-bit integer or a list of strings")
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Value::Int64(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                i64::try_from(value)
                    .map(Value::Int64)
                    .map_err(|_| E::custom(format!("integer {} out of range for int64", value)))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Value::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(Value::String(value))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element::<String>()? {
                    items.push(item);
                }
                Ok(Value::from(items))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl TryFrom<Value> for i64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Int64(i) => Ok(i),
            other => Err(crate::Error::custom(format!(
                "expected int64, found {}",
                other.kind()
            ))),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(crate::Error::custom(format!(
                "expected string, found {}",
                other.kind()
            ))),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int64(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int64(value as i64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int64(value as i64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Int64(value as i64)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

/// An empty vector becomes [`Value::EmptyList`].
impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        if items.is_empty() {
            Value::EmptyList
        } else {
            Value::List(items)
        }
    }
}

impl From<Vec<&str>> for Value {
    fn from(items: Vec<&str>) -> Self {
        Value::from(items.into_iter().map(String::from).collect::<Vec<_>>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tryfrom() {
        assert_eq!(i64::try_from(Value::Int64(42)).unwrap(), 42);
        assert!(i64::try_from(Value::from("42")).is_err());
        assert_eq!(String::try_from(Value::from("vg0")).unwrap(), "vg0");
        assert!(String::try_from(Value::EmptyList).is_err());
    }

    #[test]
    fn test_from_collections() {
        assert_eq!(Value::from(Vec::<String>::new()), Value::EmptyList);
        assert_eq!(
            Value::from(vec!["a"]),
            Value::List(vec!["a".to_string()])
        );
        assert_eq!(Value::from(true), Value::Int64(1));
    }

    #[test]
    fn test_display_is_default_text_form() {
        assert_eq!(Value::from("plain").to_string(), "plain");
        assert_eq!(Value::from(-7).to_string(), "-7");
        assert_eq!(
            Value::from(vec!["a", "b"]).to_string(),
            "[\"a\", \"b\"]"
        );
        assert_eq!(Value::EmptyList.to_string(), "[]");
    }

    #[test]
    fn test_list_accessors() {
        assert_eq!(Value::EmptyList.as_list(), Some(&[][..]));
        assert!(Value::EmptyList.is_list());
        assert_eq!(Value::from(3).as_list(), None);
        assert_eq!(Value::from(3).kind(), "int64");
    }

    #[test]
    fn test_serde_bridge() {
        let json = serde_json::to_string(&Value::from(vec!["x", "y"])).unwrap();
        assert_eq!(json, r#"["x","y"]"#);
        assert_eq!(serde_json::to_string(&Value::EmptyList).unwrap(), "[]");

        let back: Value = serde_json::from_str("[]").unwrap();
        assert_eq!(back, Value::EmptyList);
        let back: Value = serde_json::from_str("12").unwrap();
        assert_eq!(back, Value::Int64(12));
        let back: Value = serde_json::from_str("\"s\"").unwrap();
        assert_eq!(back, Value::from("s"));
        assert!(serde_json::from_str::<Value>("18446744073709551615").is_err());
    }
}
