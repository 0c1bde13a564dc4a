//! Currencies the API can price invoices in or pay out to.

use rust_decimal::Decimal;

/// A supported currency and its payout capabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct Currency {
    pub code: String,
    pub symbol: String,
    /// Number of fractional digits of the currency's minimum unit.
    pub precision: u32,
    pub exchange_pct_fee: Decimal,
    pub payout_enabled: bool,
    pub name: String,
    pub plural_name: String,
    pub alts: Vec<String>,
    pub payout_fields: Vec<String>,
}
