pub mod dataset;
pub mod filtering;
pub mod latest;
pub mod search;

pub use dataset::{CatalogError, Dataset};
pub use latest::{LatestSearch, SearchOutcome};
pub use search::{Latency, MockSearchService, PageRequest, SearchPage, SearchService};
