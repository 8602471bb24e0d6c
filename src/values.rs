//! Query-string and form-body values that may be left unset.
//!
//! Each key maps to a [`Value`], a list of optional strings. Unset entries are
//! dropped when encoding, set entries (including empty strings) are kept. This
//! is how Kick endpoints tell "not provided" apart from "provided but empty".
//!
//! Optional JSON fields use plain [`Option`]: serde writes `null` for `None`.

use std::collections::BTreeMap;

/// The optional values stored under a single key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Value(Vec<Option<String>>);

impl Value {
    /// A single value that is always set.
    pub fn single(value: impl Into<String>) -> Self {
        Self(vec![Some(value.into())])
    }

    /// A single value that is only encoded when `value` is `Some`.
    pub fn optional<S: Into<String>>(value: Option<S>) -> Self {
        Self(vec![value.map(Into::into)])
    }

    /// One set value per element, encoded as repeated keys.
    pub fn many<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(values.into_iter().map(|v| Some(v.into())).collect())
    }

    /// A single set value made of the elements joined by `separator`.
    pub fn join<I, S>(values: I, separator: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = values
            .into_iter()
            .map(|v| v.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(separator);
        Self::single(joined)
    }

    /// Iterates over the entries that are set.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|v| v.as_deref())
    }

    /// Returns `true` when no entry would be encoded.
    pub fn is_unset(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// A set of keyed optional values, encoded as `application/x-www-form-urlencoded`.
///
/// Keys are kept sorted so encoding the same values always yields the same bytes.
///
/// ```
/// use kick_sdk::values::{Value, Values};
///
/// let values = Values::new()
///     .with("token_hint_type", Value::optional(None::<String>))
///     .with("token", Value::single("token"));
///
/// assert_eq!(values.encode(), "token=token");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Values(BTreeMap<String, Value>);

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value for `key`, replacing any previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Builder form of [`Values::insert`].
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encodes the set entries as `key=value` pairs joined by `&`.
    pub fn encode(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.0 {
            for entry in value.iter() {
                serializer.append_pair(key, entry);
            }
        }
        serializer.finish()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Values {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_entries_are_omitted() {
        let values = Values::new()
            .with("token", Value::single("token"))
            .with("token_hint_type", Value::optional(None::<&str>));

        assert_eq!(values.encode(), "token=token");
    }

    #[test]
    fn test_empty_string_is_still_set() {
        let values = Values::new().with("q", Value::single(""));
        assert_eq!(values.encode(), "q=");
        assert!(!values.get("q").unwrap().is_unset());
    }

    #[test]
    fn test_many_repeats_the_key() {
        let values = Values::new().with("id", Value::many(["1", "2", "3"]));
        assert_eq!(values.encode(), "id=1&id=2&id=3");
    }

    #[test]
    fn test_join_uses_separator() {
        let values = Values::new().with("scope", Value::join(["user:read", "chat:write"], " "));
        assert_eq!(values.encode(), "scope=user%3Aread+chat%3Awrite");
    }

    #[test]
    fn test_keys_are_sorted_and_encoding_is_stable() {
        let values: Values = [
            ("state", Value::single("s")),
            ("client_id", Value::single("c")),
            ("response_type", Value::single("code")),
        ]
        .into_iter()
        .collect();

        let first = values.encode();
        assert_eq!(first, "client_id=c&response_type=code&state=s");
        assert_eq!(first, values.clone().encode());
    }

    #[test]
    fn test_set_values_survive_query_decoding() {
        let values = Values::new()
            .with("a b", Value::single("x&y=z"))
            .with("emoji", Value::single("héllo wörld"))
            .with("skip", Value::optional(None::<String>));

        let decoded: Vec<(String, String)> = url::form_urlencoded::parse(values.encode().as_bytes())
            .into_owned()
            .collect();

        assert_eq!(
            decoded,
            vec![
                ("a b".to_string(), "x&y=z".to_string()),
                ("emoji".to_string(), "héllo wörld".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_values_encode_to_empty_string() {
        assert_eq!(Values::new().encode(), "");
        assert_eq!(Values::new().with("id", Value::many(Vec::<String>::new())).encode(), "");
    }
}
