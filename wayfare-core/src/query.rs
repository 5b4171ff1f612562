use tracing::warn;

use crate::{CoreError, CoreResult};

/// An ordered `application/x-www-form-urlencoded` parameter list holding at
/// most one value per key. Setting an existing key replaces it in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string (leading `?` allowed). The first occurrence of a
    /// repeated key wins.
    pub fn try_parse(query: &str) -> CoreResult<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let decoded: Vec<(String, String)> = serde_urlencoded::from_str(query)
            .map_err(|e| CoreError::QueryError(e.to_string()))?;

        let mut params = Self::new();
        for (key, value) in decoded {
            if params.get(&key).is_none() {
                params.pairs.push((key, value));
            }
        }
        Ok(params)
    }

    /// Lenient parse: a malformed query yields an empty parameter list.
    pub fn parse(query: &str) -> Self {
        Self::try_parse(query).unwrap_or_else(|e| {
            warn!("Ignoring malformed query string: {}", e);
            Self::new()
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.pairs.iter().position(|(k, _)| k == key)?;
        Some(self.pairs.remove(index).1)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, &str) -> bool) {
        self.pairs.retain(|(k, v)| keep(k, v));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Serialize without the leading `?`.
    pub fn to_query_string(&self) -> String {
        match serde_urlencoded::to_string(&self.pairs) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Failed to encode query parameters: {}", e);
                String::new()
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.set(key, value);
        }
        params
    }
}
