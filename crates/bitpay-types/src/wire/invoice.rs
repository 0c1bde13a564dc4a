use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;

use crate::invoice::{ExceptionStatus, Invoice, InvoiceRequest, InvoiceStatus};
use crate::item::{Buyer, Item};
use crate::timestamp::WireTime;
use crate::util::{Amount, Guid, RawAmount, coerce_or_zero};
use crate::wire::{DecodeError, FormatContext, from_value};

const ENTITY: &str = "invoice";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvoiceWire {
    id: String,
    #[serde(default)]
    token: Option<String>,
    url: String,
    #[serde(default)]
    pos_data: Option<Value>,
    status: InvoiceStatus,
    price: RawAmount,
    #[serde(default)]
    btc_price: Option<RawAmount>,
    #[serde(default)]
    btc_paid: Option<RawAmount>,
    currency: String,
    tax_included: RawAmount,
    #[serde(default)]
    order_id: Option<Value>,
    invoice_time: WireTime,
    expiration_time: WireTime,
    current_time: WireTime,
    #[serde(default)]
    amount_paid: Option<RawAmount>,
    #[serde(default)]
    rate: Option<RawAmount>,
    #[serde(default)]
    exception_status: Option<ExceptionStatus>,
    #[serde(default)]
    refund_addresses: Option<Vec<Value>>,
    #[serde(default)]
    transaction_currency: Option<String>,
    #[serde(default)]
    payment_totals: Option<Value>,
    #[serde(default)]
    payment_subtotals: Option<Value>,
    #[serde(default)]
    exchange_rates: Option<Value>,
    #[serde(default)]
    payment_urls: Option<BTreeMap<String, String>>,
    #[serde(default)]
    item_desc: Option<String>,
    #[serde(default)]
    item_code: Option<String>,
    #[serde(default)]
    physical: Option<bool>,
    #[serde(default)]
    buyer: Option<BuyerWire>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuyerWire {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    address1: Option<String>,
    #[serde(default)]
    address2: Option<String>,
    #[serde(default, alias = "city")]
    locality: Option<String>,
    #[serde(default, alias = "state")]
    region: Option<String>,
    #[serde(default, alias = "zip")]
    postal_code: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    notify: Option<bool>,
}

impl From<BuyerWire> for Buyer {
    fn from(wire: BuyerWire) -> Self {
        Buyer {
            name: wire.name,
            address: [wire.address1, wire.address2]
                .into_iter()
                .flatten()
                .filter(|line| !line.is_empty())
                .collect(),
            city: wire.locality,
            state: wire.region,
            zip: wire.postal_code,
            country: wire.country,
            email: wire.email,
            phone: wire.phone,
            notify: wire.notify.unwrap_or(false),
        }
    }
}

/// Free-form fields the API may echo as a string, a number or an object.
fn scalar_text(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    }
}

impl TryFrom<InvoiceWire> for Invoice {
    type Error = DecodeError;

    fn try_from(wire: InvoiceWire) -> Result<Self, Self::Error> {
        let price = wire.price.coerce().in_entity(ENTITY)?.0;
        let tax_included = wire.tax_included.coerce_lenient().in_entity(ENTITY)?.0;
        let item = Item {
            code: wire.item_code,
            description: wire.item_desc,
            price,
            tax_included,
            quantity: None,
            physical: wire.physical.unwrap_or(false),
        };
        Ok(Invoice {
            id: wire.id,
            token: wire.token.unwrap_or_default(),
            url: wire.url,
            pos_data: scalar_text(wire.pos_data),
            status: wire.status,
            price,
            btc_price: coerce_or_zero(wire.btc_price.as_ref()).in_entity(ENTITY)?,
            btc_paid: coerce_or_zero(wire.btc_paid.as_ref()).in_entity(ENTITY)?,
            currency: wire.currency,
            tax_included,
            order_id: scalar_text(wire.order_id),
            invoice_time: wire.invoice_time,
            expiration_time: wire.expiration_time,
            current_time: wire.current_time,
            amount_paid: coerce_or_zero(wire.amount_paid.as_ref()).in_entity(ENTITY)?,
            rate: coerce_or_zero(wire.rate.as_ref()).in_entity(ENTITY)?,
            exception_status: wire.exception_status.unwrap_or_default(),
            refund_addresses: wire.refund_addresses.unwrap_or_default(),
            transaction_currency: wire.transaction_currency,
            payment_totals: wire.payment_totals,
            payment_subtotals: wire.payment_subtotals,
            exchange_rates: wire.exchange_rates,
            payment_urls: wire.payment_urls,
            item,
            buyer: wire.buyer.map(Buyer::from).unwrap_or_default(),
        })
    }
}

/// Decodes the `data` member of an invoice response.
pub fn decode_invoice(data: Value) -> Result<Invoice, DecodeError> {
    let wire: InvoiceWire = from_value(ENTITY, data)?;
    Invoice::try_from(wire)
}

/// Builds the body of a `POST invoices` request.
pub fn encode_invoice_request(request: &InvoiceRequest, token: Option<&str>, guid: &Guid) -> Value {
    let item = &request.item;
    let buyer = &request.buyer;
    let address_line = |index: usize| buyer.address.get(index).cloned().unwrap_or_default();
    let mut body = json!({
        "price": Amount(item.price),
        "taxIncluded": Amount(item.tax_included),
        "currency": request.currency,
        "posData": request.pos_data.as_deref().unwrap_or_default(),
        "notificationURL": request.notification_url.as_deref().unwrap_or_default(),
        "transactionSpeed": request.transaction_speed,
        "fullNotifications": request.full_notifications,
        "extendedNotifications": request.extended_notifications,
        "notificationEmail": request.notification_email.as_deref().unwrap_or_default(),
        "redirectURL": request.redirect_url.as_deref().unwrap_or_default(),
        "orderID": request.order_id.as_deref().unwrap_or_default(),
        "itemDesc": item.description,
        "itemCode": item.code,
        "physical": item.physical,
        "buyerName": buyer.name.as_deref().map(str::trim).unwrap_or_default(),
        "buyerAddress1": address_line(0),
        "buyerAddress2": address_line(1),
        "buyerCity": buyer.city,
        "buyerState": buyer.state,
        "buyerZip": buyer.zip,
        "buyerCountry": buyer.country,
        "buyerEmail": buyer.email,
        "buyerPhone": buyer.phone,
        "buyerNotify": buyer.notify,
        "guid": guid.as_str(),
    });
    if let (Some(token), Some(map)) = (token, body.as_object_mut()) {
        map.insert("token".to_string(), Value::String(token.to_string()));
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::TransactionSpeed;
    use rust_decimal::Decimal;

    fn full_invoice() -> Value {
        json!({
            "url": "https://bitpay.com/invoice?id=AtA1ktYxBsKWp5Qu5X8xvt",
            "status": "new",
            "btcPrice": "0.039843",
            "btcDue": "0.039843",
            "price": 9.99,
            "currency": "USD",
            "exRates": {"USD": 250.73},
            "invoiceTime": 1440994025331i64,
            "expirationTime": 1440994925331i64,
            "currentTime": 1440994025425i64,
            "guid": "7ff9a2e6-d4e1-4e7c-b8e2-3b6d8e5e6a2e",
            "id": "AtA1ktYxBsKWp5Qu5X8xvt",
            "btcPaid": "0.000000",
            "rate": 250.73,
            "exceptionStatus": false,
            "paymentUrls": {
                "BIP21": "bitcoin:1Lq8Z3rXjbdFMp6czZDsMMzUv8HoGhSmh6?amount=0.039843",
                "BIP72": "bitcoin:1Lq8Z3rXjbdFMp6czZDsMMzUv8HoGhSmh6?amount=0.039843&r=https://bitpay.com/i/AtA1ktYxBsKWp5Qu5X8xvt"
            },
            "taxIncluded": "0.00",
            "posData": "{\"ref\":711}",
            "orderId": "100001",
            "token": "8GtcRqBwLFHxWMSDrDuyUmdoeTnbNy9AvW4bsbKzzA7cexkGZyeEGs2g7EjFkbrQkU",
            "itemDesc": "Lawn mower",
            "physical": true,
            "buyer": {"name": "Jane Doe", "address1": "1 Main St", "locality": "Atlanta", "notify": true}
        })
    }

    #[test]
    fn test_decode_full_invoice() {
        let invoice = decode_invoice(full_invoice()).unwrap();
        assert_eq!(invoice.id, "AtA1ktYxBsKWp5Qu5X8xvt");
        assert_eq!(invoice.status, InvoiceStatus::New);
        assert_eq!(invoice.price, Decimal::new(999, 2));
        assert_eq!(invoice.btc_price, Decimal::new(39843, 6));
        assert_eq!(invoice.rate, Decimal::new(25073, 2));
        assert_eq!(invoice.order_id, "100001");
        assert_eq!(invoice.pos_data, "{\"ref\":711}");
        assert_eq!(invoice.exception_status, ExceptionStatus::Flag(false));
        assert_eq!(invoice.payment_urls.as_ref().map(|urls| urls.len()), Some(2));
        assert_eq!(invoice.item.description.as_deref(), Some("Lawn mower"));
        assert!(invoice.item.physical);
        assert_eq!(invoice.buyer.city.as_deref(), Some("Atlanta"));
        assert_eq!(invoice.buyer.address, vec!["1 Main St".to_string()]);
        assert!(invoice.buyer.notify);
    }

    #[test]
    fn test_times_are_normalized_to_seconds() {
        let invoice = decode_invoice(full_invoice()).unwrap();
        assert_eq!(invoice.invoice_time.as_unix().unwrap().as_secs(), 1440994025);
        assert_eq!(invoice.expiration_time.as_unix().unwrap().as_secs(), 1440994925);
        assert_eq!(invoice.current_time.as_unix().unwrap().as_secs(), 1440994025);
    }

    #[test]
    fn test_missing_optional_fields_use_defaults() {
        let mut payload = full_invoice();
        let map = payload.as_object_mut().unwrap();
        for key in ["posData", "btcPrice", "orderId", "amountPaid", "rate", "btcPaid", "token",
            "exceptionStatus", "paymentUrls", "buyer", "itemDesc", "physical"]
        {
            map.remove(key);
        }
        let invoice = decode_invoice(payload).unwrap();
        assert_eq!(invoice.pos_data, "");
        assert_eq!(invoice.order_id, "");
        assert_eq!(invoice.token, "");
        assert_eq!(invoice.btc_price, Decimal::ZERO);
        assert_eq!(invoice.amount_paid, Decimal::ZERO);
        assert_eq!(invoice.rate, Decimal::ZERO);
        assert_eq!(invoice.exception_status, ExceptionStatus::Flag(false));
        assert!(invoice.refund_addresses.is_empty());
        assert!(invoice.transaction_currency.is_none());
        assert!(invoice.payment_urls.is_none());
        assert_eq!(invoice.buyer, Buyer::default());
    }

    #[test]
    fn test_null_optional_fields_use_defaults() {
        let mut payload = full_invoice();
        payload["posData"] = Value::Null;
        payload["rate"] = Value::Null;
        payload["exceptionStatus"] = Value::Null;
        let invoice = decode_invoice(payload).unwrap();
        assert_eq!(invoice.pos_data, "");
        assert_eq!(invoice.rate, Decimal::ZERO);
        assert_eq!(invoice.exception_status, ExceptionStatus::default());
    }

    #[test]
    fn test_numeric_order_id_is_accepted() {
        let mut payload = full_invoice();
        payload["orderId"] = json!(100001);
        payload["posData"] = json!({"ref": 711});
        let invoice = decode_invoice(payload).unwrap();
        assert_eq!(invoice.order_id, "100001");
        assert_eq!(invoice.pos_data, "{\"ref\":711}");
    }

    #[test]
    fn test_formatted_times_pass_through() {
        let mut payload = full_invoice();
        payload["invoiceTime"] = json!("2015-08-31T04:07:05.331Z");
        let invoice = decode_invoice(payload).unwrap();
        assert_eq!(
            invoice.invoice_time,
            WireTime::Formatted("2015-08-31T04:07:05.331Z".to_string())
        );
    }

    #[test]
    fn test_missing_price_fails() {
        let mut payload = full_invoice();
        payload.as_object_mut().unwrap().remove("price");
        assert!(matches!(
            decode_invoice(payload),
            Err(DecodeError::Field { entity: "invoice", .. })
        ));
    }

    #[test]
    fn test_malformed_price_is_a_format_error() {
        let mut payload = full_invoice();
        payload["price"] = json!("nine ninety-nine");
        assert!(matches!(
            decode_invoice(payload),
            Err(DecodeError::Format { entity: "invoice", .. })
        ));
    }

    #[test]
    fn test_exception_status_reason() {
        let mut payload = full_invoice();
        payload["exceptionStatus"] = json!("paidPartial");
        let invoice = decode_invoice(payload).unwrap();
        assert_eq!(invoice.exception_status, ExceptionStatus::Reason("paidPartial".into()));
    }

    #[test]
    fn test_encode_invoice_request() {
        let item = Item::new(Amount::parse("1,000.50").unwrap())
            .with_code("sku-1")
            .with_description("Widget");
        let buyer = Buyer::default()
            .with_name("Jane", "Doe")
            .with_address_line("1 Main St")
            .with_email("jane@example.com");
        let request = InvoiceRequest::new(item, "USD")
            .with_buyer(buyer)
            .with_order_id("A-1")
            .with_transaction_speed(TransactionSpeed::High);
        let guid = Guid::generate();
        let body = encode_invoice_request(&request, Some("merchant-token"), &guid);

        assert_eq!(body["price"], json!(1000.5));
        assert_eq!(body["taxIncluded"], json!(0));
        assert_eq!(body["currency"], "USD");
        assert_eq!(body["orderID"], "A-1");
        assert_eq!(body["transactionSpeed"], "high");
        assert_eq!(body["fullNotifications"], true);
        assert_eq!(body["itemCode"], "sku-1");
        assert_eq!(body["buyerName"], "Jane Doe");
        assert_eq!(body["buyerAddress1"], "1 Main St");
        assert_eq!(body["buyerAddress2"], "");
        assert_eq!(body["buyerCity"], Value::Null);
        assert_eq!(body["posData"], "");
        assert_eq!(body["guid"], guid.as_str());
        assert_eq!(body["token"], "merchant-token");
    }

    #[test]
    fn test_encode_without_token_omits_field() {
        let request = InvoiceRequest::new(Item::new(5), "BTC");
        let body = encode_invoice_request(&request, None, &Guid::generate());
        assert!(body.get("token").is_none());
        assert!(body.get("guid").is_some());
    }
}
