use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use wayfare_core::CurrencyCode;
use wayfare_shared::Masked;

/// An amount tagged with the currency it is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub amount: f64,
    pub currency: CurrencyCode,
}

impl Money {
    pub fn new(amount: f64, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    pub fn zero(currency: CurrencyCode) -> Self {
        Self::new(0.0, currency)
    }
}

pub const FLEXIBLE_MULTIPLIER: f64 = 1.13;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketType {
    #[default]
    Standard,
    /// Changeable ticket, 13% on top of the base fare
    Flexible,
}

impl TicketType {
    pub fn multiplier(&self) -> f64 {
        match self {
            TicketType::Standard => 1.0,
            TicketType::Flexible => FLEXIBLE_MULTIPLIER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Masked<String>,
    pub phone: Masked<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    /// ISO 3166-1 alpha-2
    pub nationality: String,
    pub contact: ContactInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatSelection {
    pub seat_id: String,
    pub add_on_price: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSelection {
    pub method_id: String,
    pub fee: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPricing {
    /// Captured once at draft creation, never changed afterwards.
    pub base_fare: Money,
    /// Cached sum of the extras, in the base fare's currency unless
    /// overridden with a total in another currency.
    pub extras_total: Money,
}

/// An in-progress checkout for one selected flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutDraft {
    pub id: Uuid,
    pub ticket_type: TicketType,
    pub passenger: Option<Passenger>,
    /// Extra id -> quantity; never holds a zero quantity.
    pub extras: BTreeMap<String, u32>,
    /// Last unit price supplied per extra, in the base fare's currency.
    #[serde(default)]
    pub extra_prices: BTreeMap<String, f64>,
    pub seat: Option<SeatSelection>,
    pub payment: Option<PaymentSelection>,
    pub pricing: DraftPricing,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CheckoutDraft {
    pub fn new(id: Uuid, base_fare: Money, ttl: chrono::Duration) -> Self {
        let now = Utc::now();
        Self {
            id,
            ticket_type: TicketType::default(),
            passenger: None,
            extras: BTreeMap::new(),
            extra_prices: BTreeMap::new(),
            seat: None,
            payment: None,
            pricing: DraftPricing {
                base_fare,
                extras_total: Money::zero(base_fare.currency),
            },
            created_at: now,
            updated_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Record a mutation and push the expiry out by `ttl`.
    pub fn touch(&mut self, ttl: chrono::Duration) {
        self.updated_at = Utc::now();
        self.expires_at = self.updated_at + ttl;
    }
}
