pub mod drafts;
pub mod models;
pub mod pricing;
pub mod selection;

pub use drafts::{CheckoutDraftStore, CheckoutError};
pub use models::{
    CheckoutDraft, ContactInfo, Money, Passenger, PaymentSelection, SeatSelection, TicketType,
};
pub use pricing::PriceBreakdown;
pub use selection::{SelectionCriteria, SelectionEntry, SelectionStore};
