use std::marker::PhantomData;
use tracing::debug;
use wayfare_core::QueryParams;

/// Query key written on every mutation so a URL always says which search
/// form it belongs to.
pub const DISCRIMINATOR_KEY: &str = "tab";

/// One independent search-parameter namespace (hotels, flights).
pub trait FilterDomain {
    type Criteria;

    /// Value written under [`DISCRIMINATOR_KEY`].
    const NAME: &'static str;

    /// Keys kept by [`FilterParamStore::reset_all_filters`].
    const ESSENTIAL_KEYS: &'static [&'static str];

    /// Values for essential keys that are missing after a reset.
    fn essential_defaults(params: &QueryParams) -> Vec<(&'static str, String)>;

    fn decode(params: &QueryParams) -> Self::Criteria;
}

/// Receives the URL after every filter change.
pub trait Navigator {
    /// Overwrite the current history entry.
    fn replace(&mut self, href: &str);

    /// Append a new history entry.
    fn push(&mut self, href: &str);
}

/// In-memory history stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingNavigator {
    entries: Vec<String>,
}

impl RecordingNavigator {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: vec![initial.into()],
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl Navigator for RecordingNavigator {
    fn replace(&mut self, href: &str) {
        match self.entries.last_mut() {
            Some(current) => *current = href.to_string(),
            None => self.entries.push(href.to_string()),
        }
    }

    fn push(&mut self, href: &str) {
        self.entries.push(href.to_string());
    }
}

/// A filter value as handed to [`FilterParamStore::update_filter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    List(Vec<String>),
    Clear,
}

impl FilterValue {
    /// Serialized form, or `None` when the key should be deleted.
    fn encode(self) -> Option<String> {
        let encoded = match self {
            FilterValue::Text(text) => text,
            FilterValue::List(items) => items.join(","),
            FilterValue::Clear => return None,
        };
        if encoded.is_empty() {
            None
        } else {
            Some(encoded)
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FilterValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FilterValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(items: Vec<String>) -> Self {
        FilterValue::List(items)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(items: Vec<&str>) -> Self {
        FilterValue::List(items.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for FilterValue {
    fn from(items: &[&str]) -> Self {
        FilterValue::List(items.iter().map(|item| item.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FilterValue {
    fn from(items: [&str; N]) -> Self {
        FilterValue::from(&items[..])
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FilterValue::Clear)
    }
}

macro_rules! filter_value_from_number {
    ($($ty:ty),+) => {
        $(impl From<$ty> for FilterValue {
            fn from(value: $ty) -> Self {
                FilterValue::Text(value.to_string())
            }
        })+
    };
}

filter_value_from_number!(u8, u32, u64, i32, i64, f64);

/// URL-backed search criteria for one domain. The query string is the only
/// state: every mutation rewrites it and replaces the current history entry,
/// so back-navigation skips intermediate filter states.
pub struct FilterParamStore<D, N> {
    path: String,
    params: QueryParams,
    navigator: N,
    _domain: PhantomData<D>,
}

impl<D: FilterDomain, N: Navigator> FilterParamStore<D, N> {
    pub fn new(path: impl Into<String>, params: QueryParams, navigator: N) -> Self {
        Self {
            path: path.into(),
            params,
            navigator,
            _domain: PhantomData,
        }
    }

    /// Merge one field into the criteria. Empty and cleared values delete the key.
    pub fn update_filter(&mut self, key: &str, value: impl Into<FilterValue>) {
        if key == DISCRIMINATOR_KEY {
            debug!("Ignoring write to reserved key {}", key);
        } else {
            match value.into().encode() {
                Some(encoded) => self.params.set(key, encoded),
                None => {
                    self.params.remove(key);
                }
            }
        }
        self.commit();
    }

    /// Read a value. Comma-joined values come back as a list; anything else
    /// is returned as text without further parsing.
    pub fn get_filter_value(&self, key: &str, default: impl Into<FilterValue>) -> FilterValue {
        match self.params.get(key) {
            Some(raw) if key != DISCRIMINATOR_KEY => {
                if raw.contains(',') {
                    FilterValue::List(raw.split(',').map(str::to_string).collect())
                } else {
                    FilterValue::Text(raw.to_string())
                }
            }
            _ => default.into(),
        }
    }

    pub fn reset_filter(&mut self, key: &str) {
        self.update_filter(key, FilterValue::Clear);
    }

    /// Drop every non-essential key, filling in defaults for missing essentials.
    pub fn reset_all_filters(&mut self) {
        self.params
            .retain(|key, _| key == DISCRIMINATOR_KEY || D::ESSENTIAL_KEYS.iter().any(|k| *k == key));
        for (key, value) in D::essential_defaults(&self.params) {
            if !self.params.contains_key(key) {
                self.params.set(key, value);
            }
        }
        self.commit();
    }

    /// Current criteria without the discriminator.
    pub fn params(&self) -> QueryParams {
        let mut params = self.params.clone();
        params.remove(DISCRIMINATOR_KEY);
        params
    }

    pub fn criteria(&self) -> D::Criteria {
        D::decode(&self.params)
    }

    pub fn href(&self) -> String {
        if self.params.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.params.to_query_string())
        }
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn into_navigator(self) -> N {
        self.navigator
    }

    fn commit(&mut self) {
        self.params.set(DISCRIMINATOR_KEY, D::NAME);
        let href = self.href();
        debug!(domain = D::NAME, %href, "Filters updated");
        self.navigator.replace(&href);
    }
}
