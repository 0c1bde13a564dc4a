use serde::Deserialize;
use serde_json::{Map, Value, json};
use serde_with::{DefaultOnNull, serde_as};

use crate::payout::{Payout, PayoutInstruction, PayoutRequest, PayoutTransaction};
use crate::timestamp::WireTime;
use crate::util::{Amount, Guid, RawAmount};
use crate::wire::{DecodeError, FormatContext, from_value};

const ENTITY: &str = "payout";

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayoutWire {
    id: String,
    #[serde(alias = "accountId")]
    account: String,
    currency: String,
    amount: RawAmount,
    #[serde(default)]
    effective_date: Option<WireTime>,
    #[serde(default)]
    request_date: Option<WireTime>,
    #[serde(default)]
    pricing_method: Option<String>,
    status: String,
    #[serde(default)]
    #[serde_as(as = "DefaultOnNull")]
    token: String,
    #[serde(default)]
    rate: Option<RawAmount>,
    #[serde(default)]
    btc: Option<RawAmount>,
    #[serde(default)]
    reference: Option<String>,
    #[serde(default, rename = "notificationURL", alias = "notificationUrl")]
    notification_url: Option<String>,
    #[serde(default)]
    notification_email: Option<String>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnNull")]
    instructions: Vec<InstructionWire>,
}

#[serde_as]
#[derive(Debug, Deserialize)]
struct InstructionWire {
    id: String,
    #[serde(default)]
    #[serde_as(as = "DefaultOnNull")]
    label: String,
    #[serde(default)]
    #[serde_as(as = "DefaultOnNull")]
    address: String,
    amount: RawAmount,
    #[serde(default)]
    #[serde_as(as = "DefaultOnNull")]
    status: String,
    #[serde(default)]
    btc: Option<Value>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnNull")]
    transactions: Vec<TransactionWire>,
}

#[derive(Debug, Deserialize)]
struct TransactionWire {
    txid: String,
    amount: RawAmount,
    date: WireTime,
}

impl TryFrom<TransactionWire> for PayoutTransaction {
    type Error = DecodeError;

    fn try_from(wire: TransactionWire) -> Result<Self, Self::Error> {
        Ok(PayoutTransaction {
            transaction_id: wire.txid,
            amount: wire.amount.coerce().in_entity("payout transaction")?.0,
            date: wire.date,
        })
    }
}

impl TryFrom<InstructionWire> for PayoutInstruction {
    type Error = DecodeError;

    fn try_from(wire: InstructionWire) -> Result<Self, Self::Error> {
        let transactions = wire
            .transactions
            .into_iter()
            .map(PayoutTransaction::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PayoutInstruction {
            id: wire.id,
            label: wire.label,
            address: wire.address,
            amount: wire.amount.coerce().in_entity("payout instruction")?.0,
            status: wire.status,
            btc: wire.btc,
            transactions,
        })
    }
}

impl TryFrom<PayoutWire> for Payout {
    type Error = DecodeError;

    fn try_from(wire: PayoutWire) -> Result<Self, Self::Error> {
        // An empty string is reported the same as an absent value.
        let optional_amount = |raw: Option<RawAmount>| {
            raw.filter(|raw| !matches!(raw, RawAmount::Text(text) if text.trim().is_empty()))
                .map(|raw| raw.coerce().map(|amount| amount.0))
                .transpose()
                .in_entity(ENTITY)
        };
        let instructions = wire
            .instructions
            .into_iter()
            .map(PayoutInstruction::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Payout {
            id: wire.id,
            account_id: wire.account,
            currency: wire.currency,
            amount: wire.amount.coerce().in_entity(ENTITY)?.0,
            effective_date: wire.effective_date,
            request_date: wire.request_date,
            pricing_method: wire.pricing_method,
            status: wire.status,
            response_token: wire.token,
            rate: optional_amount(wire.rate)?,
            btc_amount: optional_amount(wire.btc)?,
            reference: wire.reference,
            notification_url: wire.notification_url,
            notification_email: wire.notification_email,
            instructions,
        })
    }
}

/// Decodes the `data` member of a single-payout response.
pub fn decode_payout(data: Value) -> Result<Payout, DecodeError> {
    let wire: PayoutWire = from_value(ENTITY, data)?;
    Payout::try_from(wire)
}

/// Decodes the `data` member of a payout listing, preserving wire order.
pub fn decode_payouts(data: Value) -> Result<Vec<Payout>, DecodeError> {
    let Value::Array(items) = data else {
        return Err(DecodeError::Shape {
            entity: ENTITY,
            reason: "expected a list of payouts".to_string(),
        });
    };
    items.into_iter().map(decode_payout).collect()
}

#[derive(Debug, Deserialize)]
struct CreatedPayoutWire {
    id: String,
    #[serde(alias = "accountId")]
    account: String,
    token: String,
    status: String,
    #[serde(default)]
    instructions: Vec<CreatedInstructionWire>,
}

#[derive(Debug, Deserialize)]
struct CreatedInstructionWire {
    id: String,
    #[serde(default)]
    status: Option<String>,
}

/// Combines a payout-creation request with the server's echo.
///
/// The echo assigns ids to the instructions; they are matched to the
/// request's instructions by position, so the counts must agree.
pub fn decode_created_payout(request: &PayoutRequest, data: Value) -> Result<Payout, DecodeError> {
    let echo: CreatedPayoutWire = from_value(ENTITY, data)?;
    if echo.instructions.len() != request.instructions.len() {
        return Err(DecodeError::Shape {
            entity: ENTITY,
            reason: format!(
                "sent {} instructions, server acknowledged {}",
                request.instructions.len(),
                echo.instructions.len()
            ),
        });
    }
    let instructions = request
        .instructions
        .iter()
        .zip(echo.instructions)
        .map(|(sent, acknowledged)| PayoutInstruction {
            id: acknowledged.id,
            label: sent.label.clone(),
            address: sent.address.clone(),
            amount: sent.amount,
            status: acknowledged.status.unwrap_or_default(),
            btc: None,
            transactions: Vec::new(),
        })
        .collect();
    Ok(Payout {
        id: echo.id,
        account_id: echo.account,
        currency: request.currency.clone(),
        amount: request.amount,
        effective_date: Some(WireTime::from(request.effective_date)),
        request_date: None,
        pricing_method: request.pricing_method.clone(),
        status: echo.status,
        response_token: echo.token,
        rate: None,
        btc_amount: None,
        reference: request.reference.clone(),
        notification_url: request.notification_url.clone(),
        notification_email: request.notification_email.clone(),
        instructions,
    })
}

#[derive(Debug, Deserialize)]
struct PayoutStatusWire {
    status: String,
}

/// Reads the status the server reports after cancelling a payout.
pub fn decode_payout_status(data: Value) -> Result<String, DecodeError> {
    let wire: PayoutStatusWire = from_value(ENTITY, data)?;
    Ok(wire.status)
}

/// Builds the body of a `POST payouts` request.
pub fn encode_payout_request(request: &PayoutRequest, token: &str, guid: &Guid) -> Value {
    let instructions: Vec<Value> = request
        .instructions
        .iter()
        .map(|instruction| {
            json!({
                "label": instruction.label,
                "address": instruction.address,
                "amount": Amount(instruction.amount),
            })
        })
        .collect();
    let mut body = Map::new();
    body.insert("token".into(), Value::from(token));
    body.insert("amount".into(), Amount(request.amount).to_json());
    body.insert("currency".into(), Value::from(request.currency.as_str()));
    body.insert("instructions".into(), Value::Array(instructions));
    body.insert("effectiveDate".into(), Value::from(request.effective_date.as_millis()));
    body.insert(
        "pricingMethod".into(),
        request.pricing_method.as_deref().map_or(Value::Null, Value::from),
    );
    body.insert("guid".into(), guid.clone().into());
    for (name, value) in request.optional_fields() {
        if let Some(value) = value {
            body.insert(name.into(), Value::from(value));
        }
    }
    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payout::InstructionRequest;
    use crate::timestamp::UnixTimestamp;
    use rust_decimal::Decimal;

    fn payout_payload() -> Value {
        json!({
            "id": "JQ9hNtG8MeDaeGhP6KaQs1",
            "account": "YJCgTf3jrXHkUVzLQ7y4eg",
            "reference": "payroll-2015-08",
            "currency": "USD",
            "amount": 10,
            "btc": 0.0399,
            "effectiveDate": "2015-09-01T00:00:00.000Z",
            "requestDate": 1440994025331i64,
            "pricingMethod": "vwap_24hr",
            "notificationEmail": "payroll@example.com",
            "notificationURL": "https://example.com/ipn",
            "rate": 250.5,
            "status": "complete",
            "token": "5ozNkZsq2nn5DUtEt5ouUZVyDgZaMoXGuyqCHQEGQZUy",
            "instructions": [
                {
                    "id": "Sra19AFU57Rx53rKQbbRKZ",
                    "amount": 4,
                    "label": "Alice",
                    "address": "mzDTjhkfJfatXHRUWKcE2BXxHt4Pfz2PK7",
                    "status": "paid",
                    "btc": {"unpaid": 0, "paid": 0.016},
                    "transactions": [
                        {"txid": "e1a8a0d3", "amount": 0.016, "date": "2015-09-01T00:10:00.000Z"},
                        {"txid": "f2b9b1e4", "amount": "0.000", "date": 1441066200000i64}
                    ]
                },
                {
                    "id": "5SCdU1xNsEwrUFqKChYuAR",
                    "amount": 6,
                    "label": "Bob",
                    "address": "n3Sx4askHoMMiBuvqdvJ3NZe5btDXhmzYk",
                    "status": "unpaid",
                    "transactions": []
                }
            ]
        })
    }

    #[test]
    fn test_decode_payout_preserves_order() {
        let payout = decode_payout(payout_payload()).unwrap();
        assert_eq!(payout.account_id, "YJCgTf3jrXHkUVzLQ7y4eg");
        assert_eq!(payout.response_token, "5ozNkZsq2nn5DUtEt5ouUZVyDgZaMoXGuyqCHQEGQZUy");
        assert_eq!(payout.btc_amount, Some(Decimal::new(399, 4)));
        assert_eq!(payout.notification_url.as_deref(), Some("https://example.com/ipn"));
        let labels: Vec<_> = payout.instructions.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, ["Alice", "Bob"]);
        let alice = &payout.instructions[0];
        assert_eq!(alice.transactions.len(), 2);
        assert_eq!(alice.transactions[0].transaction_id, "e1a8a0d3");
        assert_eq!(alice.transactions[1].date.as_unix().unwrap().as_secs(), 1441066200);
        assert!(payout.instructions[1].transactions.is_empty());
    }

    #[test]
    fn test_decode_payout_dates() {
        let payout = decode_payout(payout_payload()).unwrap();
        assert_eq!(
            payout.effective_date,
            Some(WireTime::Formatted("2015-09-01T00:00:00.000Z".into()))
        );
        assert_eq!(
            payout.request_date.and_then(|d| d.as_unix()),
            Some(UnixTimestamp::from_secs(1440994025))
        );
    }

    #[test]
    fn test_decode_payout_optional_fields_absent() {
        let payload = json!({
            "id": "p1", "account": "a1", "currency": "USD", "amount": "1.5",
            "status": "new", "token": null, "instructions": null
        });
        let payout = decode_payout(payload).unwrap();
        assert_eq!(payout.response_token, "");
        assert!(payout.rate.is_none());
        assert!(payout.reference.is_none());
        assert!(payout.instructions.is_empty());
    }

    #[test]
    fn test_decode_payout_empty_optional_amounts() {
        let payload = json!({
            "id": "p1", "account": "a1", "currency": "USD", "amount": "1.5",
            "status": "new", "rate": "", "btc": " "
        });
        let payout = decode_payout(payload).unwrap();
        assert!(payout.rate.is_none());
        assert!(payout.btc_amount.is_none());

        let malformed = json!({
            "id": "p1", "account": "a1", "currency": "USD", "amount": "1.5",
            "status": "new", "rate": "n/a"
        });
        assert!(matches!(decode_payout(malformed), Err(DecodeError::Format { .. })));
    }

    #[test]
    fn test_decode_payouts_requires_list() {
        assert!(decode_payouts(json!([payout_payload(), payout_payload()])).unwrap().len() == 2);
        assert!(matches!(
            decode_payouts(payout_payload()),
            Err(DecodeError::Shape { .. })
        ));
    }

    fn payout_request() -> PayoutRequest {
        PayoutRequest::new(10, "USD", UnixTimestamp::from_secs(1441065600))
            .with_pricing_method("vwap_24hr")
            .with_notification_email("payroll@example.com")
            .with_instruction(InstructionRequest::new("Alice", "mzDTjhkfJfatXHRUWKcE2BXxHt4Pfz2PK7", 4))
            .with_instruction(InstructionRequest::new("Bob", "n3Sx4askHoMMiBuvqdvJ3NZe5btDXhmzYk", 6))
    }

    #[test]
    fn test_encode_payout_request() {
        let guid = Guid::generate();
        let body = encode_payout_request(&payout_request(), "payroll-token", &guid);
        assert_eq!(body["token"], "payroll-token");
        assert_eq!(body["amount"], json!(10));
        assert_eq!(body["effectiveDate"], json!(1441065600000i64));
        assert_eq!(body["pricingMethod"], "vwap_24hr");
        assert_eq!(body["notificationEmail"], "payroll@example.com");
        assert!(body.get("reference").is_none());
        assert!(body.get("notificationURL").is_none());
        assert_eq!(body["guid"], guid.as_str());
        assert_eq!(body["instructions"][0]["label"], "Alice");
        assert_eq!(body["instructions"][1]["amount"], json!(6));
    }

    #[test]
    fn test_created_payout_assigns_instruction_ids_in_order() {
        let echo = json!({
            "id": "JQ9hNtG8MeDaeGhP6KaQs1",
            "account": "YJCgTf3jrXHkUVzLQ7y4eg",
            "token": "5ozNkZsq2nn5DUtEt5ouUZVyDgZaMoXGuyqCHQEGQZUy",
            "status": "new",
            "instructions": [{"id": "first"}, {"id": "second", "status": "unpaid"}]
        });
        let payout = decode_created_payout(&payout_request(), echo).unwrap();
        assert_eq!(payout.status, "new");
        assert_eq!(payout.instructions.len(), 2);
        assert_eq!(payout.instructions[0].id, "first");
        assert_eq!(payout.instructions[0].label, "Alice");
        assert_eq!(payout.instructions[1].id, "second");
        assert_eq!(payout.instructions[1].status, "unpaid");
    }

    #[test]
    fn test_decode_payout_status() {
        let status = decode_payout_status(json!({"status": "cancelled", "id": "p1"})).unwrap();
        assert_eq!(status, "cancelled");
        assert!(decode_payout_status(json!({"id": "p1"})).is_err());
    }

    #[test]
    fn test_created_payout_rejects_count_mismatch() {
        let echo = json!({
            "id": "p", "account": "a", "token": "t", "status": "new",
            "instructions": [{"id": "only-one"}]
        });
        assert!(matches!(
            decode_created_payout(&payout_request(), echo),
            Err(DecodeError::Shape { .. })
        ));
    }
}
