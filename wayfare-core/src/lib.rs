pub mod currency;
pub mod locale;
pub mod query;

pub use currency::{CurrencyCode, CurrencyConverter, RateTable};
pub use locale::{Country, Locale, LocaleRoute};
pub use query::QueryParams;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Malformed query string: {0}")]
    QueryError(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
