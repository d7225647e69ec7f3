//! Query-string construction for the options-bearing verbs.
//!
//! `QueryOptions` keeps insertion order, so the emitted string follows the
//! order in which the caller added keys. `FilterQuery` only knows the two
//! options the filter endpoint understands.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A scalar option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(value) => write!(f, "{value}"),
            Scalar::Int(value) => write!(f, "{value}"),
            Scalar::Float(value) => write!(f, "{value}"),
            Scalar::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(i64::from(value))
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Scalar::Int(i64::from(value))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

/// Ordered key/value options for search, list, listAll and summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryOptions(IndexMap<String, Scalar>);

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a key. A replaced key keeps its original position.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Scalar>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders `?k1=v1&k2=v2`. No options renders a bare `?`.
    pub fn to_query_string(&self) -> String {
        let pairs = self
            .0
            .iter()
            .map(|(key, value)| pair(key, &value.to_string()))
            .collect::<Vec<_>>();
        format!("?{}", pairs.join("&"))
    }
}

impl<K, V> FromIterator<(K, V)> for QueryOptions
where
    K: Into<String>,
    V: Into<Scalar>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// The two options understood by the filter endpoint. Empty strings count as
/// absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equal: Option<String>,
}

impl FilterQuery {
    pub fn new(filter: impl Into<String>, equal: impl Into<String>) -> Self {
        Self {
            filter: Some(filter.into()),
            equal: Some(equal.into()),
        }
    }

    pub fn to_query_string(&self) -> String {
        let pairs = [("filter", &self.filter), ("equal", &self.equal)]
            .into_iter()
            .filter_map(|(key, value)| {
                value
                    .as_deref()
                    .filter(|v| !v.is_empty())
                    .map(|v| pair(key, v))
            })
            .collect::<Vec<_>>();
        format!("?{}", pairs.join("&"))
    }
}

fn pair(key: &str, value: &str) -> String {
    format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_keep_insertion_order() {
        let options = QueryOptions::new().with("a", 1).with("b", "two");
        assert_eq!(options.to_query_string(), "?a=1&b=two");

        let reversed = QueryOptions::new().with("b", "two").with("a", 1);
        assert_eq!(reversed.to_query_string(), "?b=two&a=1");
    }

    #[test]
    fn empty_options_render_bare_question_mark() {
        assert_eq!(QueryOptions::new().to_query_string(), "?");
    }

    #[test]
    fn replacing_a_key_keeps_its_position() {
        let options = QueryOptions::new()
            .with("page", 1)
            .with("items", 10)
            .with("page", 3);
        assert_eq!(options.to_query_string(), "?page=3&items=10");
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn scalars_render_plainly() {
        let options = QueryOptions::new()
            .with("enabled", true)
            .with("ratio", 0.5)
            .with("count", -4);
        assert_eq!(options.to_query_string(), "?enabled=true&ratio=0.5&count=-4");
    }

    #[test]
    fn reserved_characters_are_percent_encoded() {
        let options = QueryOptions::new().with("q", "acme & sons");
        assert_eq!(options.to_query_string(), "?q=acme%20%26%20sons");
    }

    #[test]
    fn options_deserialize_from_json_object_in_order() {
        let options: QueryOptions =
            serde_json::from_str(r#"{"q":"acme","fields":"name","page":2}"#).unwrap();
        assert_eq!(options.to_query_string(), "?q=acme&fields=name&page=2");
    }

    #[test]
    fn filter_emits_both_options() {
        let query = FilterQuery::new("status", "draft");
        assert_eq!(query.to_query_string(), "?filter=status&equal=draft");
    }

    #[test]
    fn filter_skips_missing_and_empty_options() {
        let only_filter = FilterQuery {
            filter: Some("status".to_string()),
            equal: None,
        };
        assert_eq!(only_filter.to_query_string(), "?filter=status");

        let empty_filter = FilterQuery {
            filter: Some(String::new()),
            equal: Some("draft".to_string()),
        };
        assert_eq!(empty_filter.to_query_string(), "?equal=draft");

        assert_eq!(FilterQuery::default().to_query_string(), "?");
    }

    #[test]
    fn filter_ignores_unknown_keys_when_deserialized() {
        let query: FilterQuery =
            serde_json::from_str(r#"{"filter":"x","equal":"y","other":"z"}"#).unwrap();
        assert_eq!(query.to_query_string(), "?filter=x&equal=y");
    }
}
