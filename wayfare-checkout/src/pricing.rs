use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wayfare_core::{CurrencyCode, CurrencyConverter};

use crate::models::{CheckoutDraft, Money};

/// Price components of a draft, all in one display currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub base_fare: f64,
    pub extras: f64,
    pub seat: f64,
    pub payment_fee: f64,
    pub total: f64,
    pub currency: CurrencyCode,
}

impl PriceBreakdown {
    pub fn zero(currency: CurrencyCode) -> Self {
        Self {
            base_fare: 0.0,
            extras: 0.0,
            seat: 0.0,
            payment_fee: 0.0,
            total: 0.0,
            currency,
        }
    }

    /// Convert every component of `draft` into the converter's selected
    /// currency using the rates as they are right now.
    pub fn for_draft(draft: &CheckoutDraft, converter: &CurrencyConverter) -> Self {
        let display = |money: &Money| converter.to_display(money.amount, money.currency);

        let base = &draft.pricing.base_fare;
        let base_fare = converter.to_display(base.amount * draft.ticket_type.multiplier(), base.currency);
        let extras = display(&draft.pricing.extras_total);
        let seat = draft.seat.as_ref().map_or(0.0, |seat| display(&seat.add_on_price));
        let payment_fee = draft.payment.as_ref().map_or(0.0, |payment| display(&payment.fee));

        Self {
            base_fare,
            extras,
            seat,
            payment_fee,
            total: base_fare + extras + seat + payment_fee,
            currency: converter.selected(),
        }
    }
}

/// Sum of `quantity * unit price` over every extra. Extras without a known
/// price contribute nothing.
pub fn extras_total(
    extras: &BTreeMap<String, u32>,
    prices: &BTreeMap<String, f64>,
    currency: CurrencyCode,
) -> Money {
    let amount = extras
        .iter()
        .filter_map(|(id, quantity)| prices.get(id).map(|unit| unit * f64::from(*quantity)))
        .sum();
    Money::new(amount, currency)
}
