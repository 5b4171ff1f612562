use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;
use wayfare_core::CurrencyConverter;
use wayfare_store::client_storage::{self, ClientStorage, StorageError, DRAFTS_KEY};

use crate::models::{CheckoutDraft, Money, Passenger, PaymentSelection, SeatSelection, TicketType};
use crate::pricing::{extras_total, PriceBreakdown};
use crate::selection::SelectionEntry;

pub const DRAFTS_VERSION: u32 = 1;
pub const DEFAULT_DRAFT_TTL_HOURS: i64 = 72;

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Draft not found: {0}")]
    DraftNotFound(Uuid),

    #[error("Only flight selections can be checked out")]
    NotAFlight,

    #[error("Draft persistence failed: {0}")]
    Storage(#[from] StorageError),
}

/// Checkout drafts keyed by the selection they were started from.
///
/// Setters on an unknown id are no-ops and report `false`. Every change
/// bumps the draft's expiry; expired drafts stay readable until
/// [`purge_expired`](Self::purge_expired) drops them.
pub struct CheckoutDraftStore {
    drafts: HashMap<Uuid, CheckoutDraft>,
    ttl: Duration,
}

impl CheckoutDraftStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            drafts: HashMap::new(),
            ttl,
        }
    }

    /// Start a draft. Returns `false` and leaves the existing draft alone
    /// when one is already present for `id`.
    pub fn init_draft(&mut self, id: Uuid, base_fare: Money) -> bool {
        if self.drafts.contains_key(&id) {
            return false;
        }
        self.drafts.insert(id, CheckoutDraft::new(id, base_fare, self.ttl));
        info!(%id, amount = base_fare.amount, currency = %base_fare.currency, "Draft created");
        true
    }

    /// Start a draft for a selected flight, priced in the reference currency.
    pub fn init_from_selection(
        &mut self,
        selection: &SelectionEntry,
        converter: &CurrencyConverter,
    ) -> Result<bool, CheckoutError> {
        let flight = selection.result.as_flight().ok_or(CheckoutError::NotAFlight)?;
        let base_fare = Money::new(flight.price, converter.reference());
        Ok(self.init_draft(selection.id, base_fare))
    }

    pub fn get(&self, id: &Uuid) -> Option<&CheckoutDraft> {
        self.drafts.get(id)
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    pub fn set_ticket_type(&mut self, id: &Uuid, ticket_type: TicketType) -> bool {
        self.update(id, |draft| draft.ticket_type = ticket_type)
    }

    pub fn set_passenger(&mut self, id: &Uuid, passenger: Passenger) -> bool {
        self.update(id, |draft| draft.passenger = Some(passenger))
    }

    /// `None` clears the seat.
    pub fn set_seat(&mut self, id: &Uuid, seat: Option<SeatSelection>) -> bool {
        self.update(id, |draft| draft.seat = seat)
    }

    /// `None` clears the payment method.
    pub fn set_payment_method(&mut self, id: &Uuid, payment: Option<PaymentSelection>) -> bool {
        self.update(id, |draft| draft.payment = payment)
    }

    /// Set the quantity of one extra; zero or less removes it. The extras
    /// total is re-summed from every line whenever a unit price is known for
    /// this extra, either supplied now or remembered from an earlier call.
    /// Unit prices are in the base fare's currency.
    pub fn set_extra_quantity(
        &mut self,
        id: &Uuid,
        extra_id: &str,
        quantity: i64,
        unit_price: Option<f64>,
    ) -> bool {
        self.update(id, |draft| {
            if quantity <= 0 {
                draft.extras.remove(extra_id);
            } else {
                let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
                draft.extras.insert(extra_id.to_string(), quantity);
            }

            if let Some(price) = unit_price {
                draft.extra_prices.insert(extra_id.to_string(), price);
            }
            if draft.extra_prices.contains_key(extra_id) {
                draft.pricing.extras_total = extras_total(
                    &draft.extras,
                    &draft.extra_prices,
                    draft.pricing.base_fare.currency,
                );
            } else {
                debug!(%extra_id, "No unit price known, extras total left as is");
            }
        })
    }

    /// Overwrite the cached extras total.
    pub fn set_extras_total(&mut self, id: &Uuid, total: Money) -> bool {
        self.update(id, |draft| draft.pricing.extras_total = total)
    }

    /// Price components converted to the converter's selected currency.
    /// A missing draft yields an all-zero breakdown.
    pub fn breakdown(&self, id: &Uuid, converter: &CurrencyConverter) -> PriceBreakdown {
        match self.drafts.get(id) {
            Some(draft) => PriceBreakdown::for_draft(draft, converter),
            None => PriceBreakdown::zero(converter.selected()),
        }
    }

    /// Finish checkout, removing and returning the draft.
    pub fn complete(&mut self, id: &Uuid) -> Result<CheckoutDraft, CheckoutError> {
        let draft = self.drafts.remove(id).ok_or(CheckoutError::DraftNotFound(*id))?;
        info!(%id, "Checkout completed");
        Ok(draft)
    }

    pub fn abandon(&mut self, id: &Uuid) -> bool {
        let removed = self.drafts.remove(id).is_some();
        if removed {
            info!(%id, "Checkout abandoned");
        }
        removed
    }

    /// Drop drafts whose expiry has passed. Returns how many were removed.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let initial_count = self.drafts.len();
        self.drafts.retain(|_, draft| !draft.is_expired(now));
        let removed = initial_count - self.drafts.len();
        if removed > 0 {
            info!(removed, "Purged expired drafts");
        }
        removed
    }

    /// Owned copy of every draft, oldest first, for writing out of band.
    pub fn snapshot(&self) -> Vec<CheckoutDraft> {
        let mut drafts: Vec<CheckoutDraft> = self.drafts.values().cloned().collect();
        drafts.sort_by_key(|draft| draft.created_at);
        drafts
    }

    pub fn persist(&self, storage: &dyn ClientStorage) -> Result<(), CheckoutError> {
        Self::save_snapshot(storage, &self.snapshot())
    }

    pub fn save_snapshot(storage: &dyn ClientStorage, drafts: &[CheckoutDraft]) -> Result<(), CheckoutError> {
        client_storage::save(storage, DRAFTS_KEY, DRAFTS_VERSION, &drafts)?;
        Ok(())
    }

    /// Rebuild the store from storage, skipping drafts that already expired.
    /// Nothing stored yields an empty store.
    pub fn restore(storage: &dyn ClientStorage, ttl: Duration) -> Result<Self, CheckoutError> {
        let mut store = Self::new(ttl);
        let stored: Vec<CheckoutDraft> =
            client_storage::load(storage, DRAFTS_KEY, DRAFTS_VERSION)?.unwrap_or_default();

        let now = Utc::now();
        for draft in stored {
            if draft.is_expired(now) {
                warn!(id = %draft.id, "Dropping expired draft on restore");
                continue;
            }
            store.drafts.insert(draft.id, draft);
        }
        info!(count = store.drafts.len(), "Restored checkout drafts");
        Ok(store)
    }

    fn update(&mut self, id: &Uuid, f: impl FnOnce(&mut CheckoutDraft)) -> bool {
        match self.drafts.get_mut(id) {
            Some(draft) => {
                f(draft);
                draft.touch(self.ttl);
                true
            }
            None => {
                debug!(%id, "Ignoring update to unknown draft");
                false
            }
        }
    }
}

impl Default for CheckoutDraftStore {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_DRAFT_TTL_HOURS))
    }
}
