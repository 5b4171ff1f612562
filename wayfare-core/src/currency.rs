use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// ISO 4217 currency code, always three upper-case ASCII letters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode([u8; 3]);

impl CurrencyCode {
    /// Pivot currency: every rate in a [`RateTable`] is relative to it.
    pub const USD: CurrencyCode = CurrencyCode(*b"USD");
    /// Reference currency: raw prices are generated and stored in it.
    pub const JPY: CurrencyCode = CurrencyCode(*b"JPY");
    pub const EUR: CurrencyCode = CurrencyCode(*b"EUR");
    pub const GBP: CurrencyCode = CurrencyCode(*b"GBP");
    pub const AUD: CurrencyCode = CurrencyCode(*b"AUD");
    pub const CAD: CurrencyCode = CurrencyCode(*b"CAD");
    pub const SGD: CurrencyCode = CurrencyCode(*b"SGD");

    pub fn as_str(&self) -> &str {
        // Constructed only from ASCII letters.
        std::str::from_utf8(&self.0).unwrap_or("XXX")
    }
}

impl fmt::Debug for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid currency code: {0:?}")]
pub struct ParseCurrencyError(pub String);

impl FromStr for CurrencyCode {
    type Err = ParseCurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let bytes = trimmed.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(|b| b.is_ascii_alphabetic()) {
            return Err(ParseCurrencyError(s.to_string()));
        }
        let mut code = [0u8; 3];
        for (slot, byte) in code.iter_mut().zip(bytes) {
            *slot = byte.to_ascii_uppercase();
        }
        Ok(CurrencyCode(code))
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = ParseCurrencyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.as_str().to_string()
    }
}

/// Exchange rates relative to the pivot currency. Replaced wholesale on update.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateTable {
    rates: HashMap<CurrencyCode, f64>,
}

impl RateTable {
    pub fn new(rates: HashMap<CurrencyCode, f64>) -> Self {
        Self { rates }
    }

    pub fn get(&self, code: &CurrencyCode) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn insert(&mut self, code: CurrencyCode, rate: f64) {
        self.rates.insert(code, rate);
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CurrencyCode, &f64)> {
        self.rates.iter()
    }
}

impl RateTable {
    /// Rates shipped with the application, one US dollar in each currency.
    pub fn builtin() -> Self {
        let mut rates = HashMap::new();
        rates.insert(CurrencyCode::USD, 1.0);
        rates.insert(CurrencyCode::JPY, 150.0);
        rates.insert(CurrencyCode::EUR, 0.92);
        rates.insert(CurrencyCode::GBP, 0.79);
        rates.insert(CurrencyCode::AUD, 1.52);
        rates.insert(CurrencyCode::CAD, 1.36);
        rates.insert(CurrencyCode::SGD, 1.34);
        Self { rates }
    }
}

/// Rate table plus the currencies the application prices and displays in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyConverter {
    rates: RateTable,
    reference: CurrencyCode,
    pivot: CurrencyCode,
    selected: CurrencyCode,
}

impl CurrencyConverter {
    pub fn new(
        rates: RateTable,
        reference: CurrencyCode,
        pivot: CurrencyCode,
        selected: CurrencyCode,
    ) -> Self {
        Self {
            rates,
            reference,
            pivot,
            selected,
        }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn reference(&self) -> CurrencyCode {
        self.reference
    }

    pub fn pivot(&self) -> CurrencyCode {
        self.pivot
    }

    /// Currency prices are currently displayed in.
    pub fn selected(&self) -> CurrencyCode {
        self.selected
    }

    pub fn select(&mut self, currency: CurrencyCode) {
        self.selected = currency;
    }

    pub fn replace_rates(&mut self, rates: RateTable) {
        self.rates = rates;
    }

    /// Rate of `code` against the pivot. Unknown or unusable rates degrade to 1.0.
    pub fn rate(&self, code: &CurrencyCode) -> f64 {
        if *code == self.pivot {
            return 1.0;
        }
        match self.rates.get(code) {
            Some(rate) if rate.is_finite() && rate > 0.0 => rate,
            Some(rate) => {
                warn!("Unusable rate {} for {}, using 1.0", rate, code);
                1.0
            }
            None => {
                warn!("No exchange rate for {}, using 1.0", code);
                1.0
            }
        }
    }

    /// Convert through the pivot: `from -> pivot -> to`.
    pub fn convert(&self, amount: f64, from: CurrencyCode, to: CurrencyCode) -> f64 {
        if from == to {
            return amount;
        }
        amount / self.rate(&from) * self.rate(&to)
    }

    /// Convert an amount held in `from` into the selected display currency.
    pub fn to_display(&self, amount: f64, from: CurrencyCode) -> f64 {
        self.convert(amount, from, self.selected)
    }

    /// Format an amount already expressed in `currency`.
    pub fn format(&self, amount: f64, currency: CurrencyCode) -> String {
        CurrencyFormat::for_currency(&currency).render(amount, &currency)
    }

    /// Convert a reference-currency price to the selected currency and format it.
    pub fn format_price(&self, amount_in_reference: f64) -> String {
        let converted = self.convert(amount_in_reference, self.reference, self.selected);
        self.format(converted, self.selected)
    }
}

impl Default for CurrencyConverter {
    fn default() -> Self {
        Self::new(
            RateTable::builtin(),
            CurrencyCode::JPY,
            CurrencyCode::USD,
            CurrencyCode::USD,
        )
    }
}

/// Locale-specific rendering rules for one currency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrencyFormat {
    pub locale: &'static str,
    symbol: Option<&'static str>,
    symbol_after: bool,
    decimals: usize,
    group_separator: char,
    decimal_separator: char,
}

const GENERIC_FORMAT: CurrencyFormat = CurrencyFormat {
    locale: "en-US",
    symbol: None,
    symbol_after: false,
    decimals: 2,
    group_separator: ',',
    decimal_separator: '.',
};

impl CurrencyFormat {
    const fn english(locale: &'static str, symbol: &'static str) -> Self {
        Self {
            locale,
            symbol: Some(symbol),
            symbol_after: false,
            decimals: 2,
            group_separator: ',',
            decimal_separator: '.',
        }
    }

    pub fn for_currency(code: &CurrencyCode) -> Self {
        match code.as_str() {
            "USD" => Self::english("en-US", "$"),
            "GBP" => Self::english("en-GB", "£"),
            "AUD" => Self::english("en-AU", "A$"),
            "CAD" => Self::english("en-CA", "CA$"),
            "SGD" => Self::english("en-SG", "S$"),
            "EUR" => Self {
                locale: "de-DE",
                symbol: Some("€"),
                symbol_after: true,
                decimals: 2,
                group_separator: '.',
                decimal_separator: ',',
            },
            "JPY" => Self {
                decimals: 0,
                ..Self::english("ja-JP", "￥")
            },
            _ => GENERIC_FORMAT,
        }
    }

    pub fn decimals(&self) -> usize {
        self.decimals
    }

    pub fn render(&self, amount: f64, code: &CurrencyCode) -> String {
        let amount = if amount.is_finite() { amount } else { 0.0 };
        let fixed = format!("{:.*}", self.decimals, amount.abs());
        let (whole, fraction) = match fixed.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (fixed.as_str(), None),
        };

        let mut number = group_digits(whole, self.group_separator);
        if let Some(fraction) = fraction {
            number.push(self.decimal_separator);
            number.push_str(fraction);
        }

        let is_zero = fixed.bytes().all(|b| b == b'0' || b == b'.');
        let sign = if amount < 0.0 && !is_zero { "-" } else { "" };

        match (self.symbol, self.symbol_after) {
            (Some(symbol), false) => format!("{}{}{}", sign, symbol, number),
            (Some(symbol), true) => format!("{}{} {}", sign, number, symbol),
            (None, _) => format!("{}{} {}", sign, code, number),
        }
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(digit);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_currency_code() {
        assert_eq!("usd".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert_eq!(" EUR ".parse::<CurrencyCode>().unwrap(), CurrencyCode::EUR);
        assert!("EURO".parse::<CurrencyCode>().is_err());
        assert!("U5D".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_currency_code_serde() {
        let json = serde_json::to_string(&CurrencyCode::GBP).unwrap();
        assert_eq!(json, "\"GBP\"");
        let code: CurrencyCode = serde_json::from_str("\"sgd\"").unwrap();
        assert_eq!(code, CurrencyCode::SGD);

        let table: RateTable = serde_json::from_str(r#"{"USD": 1.0, "EUR": 0.9}"#).unwrap();
        assert_eq!(table.get(&CurrencyCode::EUR), Some(0.9));
    }

    #[test]
    fn test_reference_currency_formats_without_decimals() {
        let mut converter = CurrencyConverter::default();
        converter.select(CurrencyCode::JPY);
        assert_eq!(converter.format_price(15500.0), "￥15,500");
    }

    #[test]
    fn test_pivot_currency_formats_with_two_decimals() {
        let converter = CurrencyConverter::default();
        assert_eq!(converter.format(1.0, CurrencyCode::USD), "$1.00");
        // 150 yen is one dollar at the builtin rate
        assert_eq!(converter.format_price(150.0), "$1.00");
    }

    #[test]
    fn test_convert_goes_through_pivot() {
        let converter = CurrencyConverter::default();
        let eur = converter.convert(15000.0, CurrencyCode::JPY, CurrencyCode::EUR);
        assert!((eur - 92.0).abs() < 1e-9);
        let back = converter.convert(eur, CurrencyCode::EUR, CurrencyCode::JPY);
        assert!((back - 15000.0).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_currency_is_identity() {
        let converter = CurrencyConverter::default();
        let xyz: CurrencyCode = "XYZ".parse().unwrap();
        assert_eq!(converter.rate(&xyz), 1.0);
        assert_eq!(converter.convert(42.0, CurrencyCode::USD, xyz), 42.0);
        assert_eq!(converter.format(1234.5, xyz), "XYZ 1,234.50");
        assert_eq!(CurrencyFormat::for_currency(&xyz).locale, "en-US");
    }

    #[test]
    fn test_locale_specific_formats() {
        let converter = CurrencyConverter::default();
        assert_eq!(converter.format(1234567.891, CurrencyCode::EUR), "1.234.567,89 €");
        assert_eq!(converter.format(999.5, CurrencyCode::GBP), "£999.50");
        assert_eq!(converter.format(-12.3, CurrencyCode::AUD), "-A$12.30");
        assert_eq!(converter.format(-0.001, CurrencyCode::USD), "$0.00");
        assert_eq!(converter.format(100.0, CurrencyCode::CAD), "CA$100.00");
    }

    #[test]
    fn test_replace_rates_wholesale() {
        let mut converter = CurrencyConverter::default();
        let mut rates = HashMap::new();
        rates.insert(CurrencyCode::EUR, 0.5);
        converter.replace_rates(RateTable::new(rates));

        assert_eq!(converter.rates().len(), 1);
        // JPY was dropped with the old table
        assert_eq!(converter.rate(&CurrencyCode::JPY), 1.0);
        assert_eq!(converter.convert(10.0, CurrencyCode::USD, CurrencyCode::EUR), 5.0);
    }
}
