use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use wayfare_filters::{FlightCriteria, HotelCriteria};
use wayfare_shared::{FlightResult, HotelResult};

use crate::dataset::Dataset;
use crate::filtering::{filter_flights, filter_hotels, sort_flights, sort_hotels};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

/// 1-based page selector. A missing limit uses the service default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }
}

/// Shape every search backend returns, mock or real.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage<T> {
    pub results: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub limit: u32,
    pub has_more: bool,
}

impl<T> SearchPage<T> {
    pub fn paginate(items: Vec<T>, page: u32, limit: u32) -> Self {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let total = items.len();
        let start = ((page - 1) as usize).saturating_mul(limit as usize);
        let results: Vec<T> = items.into_iter().skip(start).take(limit as usize).collect();
        Self {
            results,
            total,
            page,
            limit,
            has_more: (page as usize).saturating_mul(limit as usize) < total,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> SearchPage<U> {
        SearchPage {
            results: self.results.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            has_more: self.has_more,
        }
    }
}

#[async_trait]
pub trait SearchService: Send + Sync {
    async fn search_hotels(&self, criteria: &HotelCriteria, page: PageRequest) -> SearchPage<HotelResult>;

    async fn search_flights(&self, criteria: &FlightCriteria, page: PageRequest) -> SearchPage<FlightResult>;
}

/// Simulated network delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Latency {
    None,
    Fixed(Duration),
    /// Uniformly random between the bounds, inclusive.
    Random { min: Duration, max: Duration },
}

impl Latency {
    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        match (min_ms, max_ms) {
            (0, 0) => Latency::None,
            (min, max) if min >= max => Latency::Fixed(Duration::from_millis(min)),
            (min, max) => Latency::Random {
                min: Duration::from_millis(min),
                max: Duration::from_millis(max),
            },
        }
    }

    fn sample(&self) -> Duration {
        match *self {
            Latency::None => Duration::ZERO,
            Latency::Fixed(delay) => delay,
            Latency::Random { min, max } => rand::thread_rng().gen_range(min..=max),
        }
    }

    async fn wait(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Searches the static dataset. Results are shuffled on every call before
/// sorting so that code relying on a stable unsorted order shows up early.
pub struct MockSearchService {
    dataset: Dataset,
    latency: Latency,
    default_limit: u32,
}

impl MockSearchService {
    pub fn new(dataset: Dataset, latency: Latency) -> Self {
        Self {
            dataset,
            latency,
            default_limit: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_default_limit(mut self, limit: u32) -> Self {
        self.default_limit = limit.clamp(1, MAX_PAGE_SIZE);
        self
    }

    fn shuffled<T>(mut items: Vec<T>) -> Vec<T> {
        items.shuffle(&mut rand::thread_rng());
        items
    }
}

#[async_trait]
impl SearchService for MockSearchService {
    async fn search_hotels(&self, criteria: &HotelCriteria, page: PageRequest) -> SearchPage<HotelResult> {
        self.latency.wait().await;

        let mut hotels = Self::shuffled(filter_hotels(&self.dataset.hotels, criteria));
        sort_hotels(&mut hotels, criteria.sort);
        debug!(location = %criteria.location, matches = hotels.len(), "Hotel search");

        SearchPage::paginate(hotels, page.page.unwrap_or(1), page.limit.unwrap_or(self.default_limit))
    }

    async fn search_flights(&self, criteria: &FlightCriteria, page: PageRequest) -> SearchPage<FlightResult> {
        self.latency.wait().await;

        let mut flights = Self::shuffled(filter_flights(&self.dataset.flights, criteria));
        sort_flights(&mut flights, criteria.sort_by);
        debug!(from = %criteria.from, to = %criteria.to, matches = flights.len(), "Flight search");

        SearchPage::paginate(flights, page.page.unwrap_or(1), page.limit.unwrap_or(self.default_limit))
    }
}
