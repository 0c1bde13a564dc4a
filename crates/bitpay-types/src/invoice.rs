//! Invoices: a request for payment of an [`Item`] in a given currency.
//!
//! [`InvoiceRequest`] is what a merchant submits; [`Invoice`] is what the
//! API hands back, fully populated.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use crate::item::{Buyer, Item};
use crate::timestamp::WireTime;

/// Lifecycle state of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    New,
    Paid,
    Confirmed,
    Complete,
    Expired,
    Invalid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::New => "new",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Confirmed => "confirmed",
            InvoiceStatus::Complete => "complete",
            InvoiceStatus::Expired => "expired",
            InvoiceStatus::Invalid => "invalid",
        }
    }
}

impl Display for InvoiceStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The invoice's `exceptionStatus`: `false` when nothing unusual happened,
/// otherwise a reason such as `"paidPartial"` or `"paidOver"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ExceptionStatus {
    Flag(bool),
    Reason(String),
}

impl Default for ExceptionStatus {
    fn default() -> Self {
        ExceptionStatus::Flag(false)
    }
}

/// How many confirmations the merchant waits for before an invoice is
/// considered confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionSpeed {
    High,
    #[default]
    Medium,
    Low,
}

/// An invoice as returned by the API.
///
/// Fields the API may omit carry explicit defaults: empty strings, zero
/// amounts, empty lists or `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub id: String,
    pub token: String,
    pub url: String,
    pub pos_data: String,
    pub status: InvoiceStatus,
    pub price: Decimal,
    pub btc_price: Decimal,
    pub btc_paid: Decimal,
    pub currency: String,
    pub tax_included: Decimal,
    pub order_id: String,
    pub invoice_time: WireTime,
    pub expiration_time: WireTime,
    pub current_time: WireTime,
    pub amount_paid: Decimal,
    pub rate: Decimal,
    pub exception_status: ExceptionStatus,
    pub refund_addresses: Vec<serde_json::Value>,
    pub transaction_currency: Option<String>,
    /// Passed through uninterpreted.
    pub payment_totals: Option<serde_json::Value>,
    /// Passed through uninterpreted.
    pub payment_subtotals: Option<serde_json::Value>,
    /// Passed through uninterpreted.
    pub exchange_rates: Option<serde_json::Value>,
    /// Payment-protocol URLs keyed by scheme (`BIP21`, `BIP72`, ...).
    pub payment_urls: Option<BTreeMap<String, String>>,
    pub item: Item,
    pub buyer: Buyer,
}

/// The merchant-side description of an invoice to create.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRequest {
    pub item: Item,
    pub buyer: Buyer,
    pub currency: String,
    pub pos_data: Option<String>,
    pub notification_url: Option<String>,
    pub notification_email: Option<String>,
    pub redirect_url: Option<String>,
    pub order_id: Option<String>,
    pub transaction_speed: TransactionSpeed,
    pub full_notifications: bool,
    pub extended_notifications: bool,
}

impl InvoiceRequest {
    pub fn new(item: Item, currency: impl Into<String>) -> Self {
        Self {
            item,
            buyer: Buyer::default(),
            currency: currency.into(),
            pos_data: None,
            notification_url: None,
            notification_email: None,
            redirect_url: None,
            order_id: None,
            transaction_speed: TransactionSpeed::default(),
            full_notifications: true,
            extended_notifications: false,
        }
    }

    pub fn with_buyer(mut self, buyer: Buyer) -> Self {
        self.buyer = buyer;
        self
    }

    pub fn with_pos_data(mut self, pos_data: impl Into<String>) -> Self {
        self.pos_data = Some(pos_data.into());
        self
    }

    pub fn with_notification_url(mut self, url: impl Into<String>) -> Self {
        self.notification_url = Some(url.into());
        self
    }

    pub fn with_notification_email(mut self, email: impl Into<String>) -> Self {
        self.notification_email = Some(email.into());
        self
    }

    pub fn with_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = Some(url.into());
        self
    }

    pub fn with_order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    pub fn with_transaction_speed(mut self, speed: TransactionSpeed) -> Self {
        self.transaction_speed = speed;
        self
    }

    pub fn with_full_notifications(mut self, enabled: bool) -> Self {
        self.full_notifications = enabled;
        self
    }

    pub fn with_extended_notifications(mut self, enabled: bool) -> Self {
        self.extended_notifications = enabled;
        self
    }
}
