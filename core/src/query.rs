//! Query-string serialization.
//!
//! Arrays repeat their key (`status=a&status=b`), never `status[]=a`. Null
//! values, including null array elements, are dropped. Keys keep insertion
//! order.

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

/// One query parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Null,
    Scalar(String),
    List(Vec<String>),
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        QueryValue::Scalar(v.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        QueryValue::Scalar(v)
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(QueryValue::Null)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(v: Vec<String>) -> Self {
        QueryValue::List(v)
    }
}

impl From<&[&str]> for QueryValue {
    fn from(v: &[&str]) -> Self {
        QueryValue::List(v.iter().map(|s| s.to_string()).collect())
    }
}

macro_rules! scalar_from_display {
    ($($t:ty),*) => {
        $(impl From<$t> for QueryValue {
            fn from(v: $t) -> Self {
                QueryValue::Scalar(v.to_string())
            }
        })*
    };
}

scalar_from_display!(bool, u8, u16, u32, u64, usize, i32, i64, f64, uuid::Uuid);

/// Ordered query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, QueryValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter. Builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Build from any struct or map that serializes to a JSON object.
    ///
    /// Serializing to `null` (e.g. `None`) yields no parameters.
    pub fn from_serialize<T: Serialize + ?Sized>(params: &T) -> Result<Self, ApiError> {
        let value =
            serde_json::to_value(params).map_err(|e| ApiError::Serialization(e.to_string()))?;
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(map) => Ok(Self {
                pairs: map
                    .into_iter()
                    .map(|(k, v)| (k, query_value(v)))
                    .collect(),
            }),
            other => Err(ApiError::Serialization(format!(
                "query parameters must serialize to an object, got {other}"
            ))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.iter().all(|(_, v)| match v {
            QueryValue::Null => true,
            QueryValue::Scalar(_) => false,
            QueryValue::List(items) => items.is_empty(),
        })
    }

    /// Encode as `application/x-www-form-urlencoded`, without a leading `?`.
    pub fn encode(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.pairs {
            match value {
                QueryValue::Null => {}
                QueryValue::Scalar(v) => {
                    serializer.append_pair(key, v);
                }
                QueryValue::List(items) => {
                    for item in items {
                        serializer.append_pair(key, item);
                    }
                }
            }
        }
        serializer.finish()
    }
}

fn query_value(value: Value) -> QueryValue {
    match value {
        Value::Null => QueryValue::Null,
        Value::Array(items) => {
            QueryValue::List(items.into_iter().filter_map(scalar_text).collect())
        }
        other => scalar_text(other).map_or(QueryValue::Null, QueryValue::Scalar),
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested => Some(nested.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn arrays_repeat_the_key() {
        let q = QueryParams::from_serialize(&json!({"status": ["ACTIVE", "DRAFT"], "page": 2})).unwrap();
        assert_eq!(q.encode(), "status=ACTIVE&status=DRAFT&page=2");
        assert!(!q.encode().contains("%5B"));
    }

    #[test]
    fn nulls_are_omitted() {
        let q = QueryParams::from_serialize(&json!({"a": null, "b": "x", "c": [null, "y"]})).unwrap();
        assert_eq!(q.encode(), "b=x&c=y");
    }

    #[test]
    fn struct_with_none_fields() {
        #[derive(Serialize)]
        struct Filter {
            search: Option<String>,
            active: Option<bool>,
            tags: Vec<String>,
        }
        let q = QueryParams::from_serialize(&Filter {
            search: Some("yoga class".to_string()),
            active: None,
            tags: vec!["a&b".to_string()],
        })
        .unwrap();
        assert_eq!(q.encode(), "search=yoga+class&tags=a%26b");
    }

    #[test]
    fn empty_array_and_all_nulls_is_empty() {
        let q = QueryParams::new().with("a", QueryValue::Null).with("b", Vec::<String>::new());
        assert!(q.is_empty());
        assert_eq!(q.encode(), "");
    }

    #[test]
    fn builder_keeps_insertion_order() {
        let q = QueryParams::new()
            .with("z", 1u32)
            .with("a", Some("x"))
            .with("m", None::<&str>)
            .with("types", &["HEART_RATE", "WEIGHT"][..]);
        assert_eq!(q.encode(), "z=1&a=x&types=HEART_RATE&types=WEIGHT");
    }

    #[test]
    fn non_object_is_rejected() {
        let err = QueryParams::from_serialize(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, ApiError::Serialization(_)));
    }

    #[test]
    fn none_yields_no_params() {
        let q = QueryParams::from_serialize(&None::<serde_json::Value>).unwrap();
        assert!(q.is_empty());
    }
}
