//! Payouts: batches of outgoing payments, one [`PayoutInstruction`] per payee.

use rust_decimal::Decimal;

use crate::timestamp::{UnixTimestamp, WireTime};
use crate::util::Amount;

/// A payout as returned by the API.
#[derive(Debug, Clone, PartialEq)]
pub struct Payout {
    pub id: String,
    pub account_id: String,
    pub currency: String,
    pub amount: Decimal,
    pub effective_date: Option<WireTime>,
    pub request_date: Option<WireTime>,
    pub pricing_method: Option<String>,
    pub status: String,
    /// Payout-scoped token; required to cancel the payout later.
    pub response_token: String,
    pub rate: Option<Decimal>,
    pub btc_amount: Option<Decimal>,
    pub reference: Option<String>,
    pub notification_url: Option<String>,
    pub notification_email: Option<String>,
    /// In wire order.
    pub instructions: Vec<PayoutInstruction>,
}

/// One payee line within a payout.
#[derive(Debug, Clone, PartialEq)]
pub struct PayoutInstruction {
    pub id: String,
    pub label: String,
    pub address: String,
    pub amount: Decimal,
    pub status: String,
    /// BTC amounts broken down by the server; passed through uninterpreted.
    pub btc: Option<serde_json::Value>,
    /// In wire order; may be empty.
    pub transactions: Vec<PayoutTransaction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayoutTransaction {
    pub transaction_id: String,
    pub amount: Decimal,
    pub date: WireTime,
}

/// A payee line to include in a new payout.
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionRequest {
    pub label: String,
    pub address: String,
    pub amount: Decimal,
}

impl InstructionRequest {
    pub fn new(label: impl Into<String>, address: impl Into<String>, amount: impl Into<Amount>) -> Self {
        Self {
            label: label.into(),
            address: address.into(),
            amount: amount.into().0,
        }
    }
}

/// The description of a payout to create.
#[derive(Debug, Clone, PartialEq)]
pub struct PayoutRequest {
    pub amount: Decimal,
    pub currency: String,
    pub effective_date: UnixTimestamp,
    pub pricing_method: Option<String>,
    pub reference: Option<String>,
    pub notification_url: Option<String>,
    pub notification_email: Option<String>,
    pub instructions: Vec<InstructionRequest>,
}

impl PayoutRequest {
    pub fn new(
        amount: impl Into<Amount>,
        currency: impl Into<String>,
        effective_date: UnixTimestamp,
    ) -> Self {
        Self {
            amount: amount.into().0,
            currency: currency.into(),
            effective_date,
            pricing_method: None,
            reference: None,
            notification_url: None,
            notification_email: None,
            instructions: Vec::new(),
        }
    }

    pub fn with_instruction(mut self, instruction: InstructionRequest) -> Self {
        self.instructions.push(instruction);
        self
    }

    pub fn with_pricing_method(mut self, pricing_method: impl Into<String>) -> Self {
        self.pricing_method = Some(pricing_method.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
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

    /// The optional wire fields, by name, in the order they are encoded.
    pub fn optional_fields(&self) -> [(&'static str, Option<&str>); 3] {
        [
            ("reference", self.reference.as_deref()),
            ("notificationURL", self.notification_url.as_deref()),
            ("notificationEmail", self.notification_email.as_deref()),
        ]
    }
}
