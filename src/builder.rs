//! Assembles the request for each API operation.
//!
//! Building validates caller input and never touches a key: whether and how
//! a request is signed is decided later by the dispatcher, from the
//! request's [`Auth`] mode.

use bitpay_types::invoice::InvoiceRequest;
use bitpay_types::payout::{Payout, PayoutRequest};
use bitpay_types::token::{Facade, Token, TokenRequest};
use bitpay_types::util::Guid;
use bitpay_types::wire;
use http::Method;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ClientError, ValidationError};
use crate::request::{ApiHost, ApiRequest, Auth, with_query};

static PAIRING_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{7}$").expect("valid regex"));
static RESOURCE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid regex"));

/// Builds [`ApiRequest`]s against a fixed host.
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder<'a> {
    host: &'a ApiHost,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(host: &'a ApiHost) -> Self {
        Self { host }
    }

    /// `POST invoices`, signed when keys are available.
    pub fn create_invoice(&self, request: &InvoiceRequest, token: Option<&Token>) -> Result<ApiRequest, ClientError> {
        let body = wire::encode_invoice_request(request, token.map(Token::as_str), &Guid::generate());
        Ok(ApiRequest::new(Method::POST, self.host, "invoices", Auth::Optional)?.with_json_body(&body))
    }

    /// `GET invoices/{id}`; signed and scoped to the token only when a
    /// merchant token is held.
    pub fn get_invoice(&self, invoice_id: &str, token: Option<&Token>) -> Result<ApiRequest, ClientError> {
        validate_resource_id("invoice", invoice_id)?;
        let path = format!("invoices/{invoice_id}");
        let request = match token.filter(|token| token.facade == Facade::Merchant) {
            Some(token) => ApiRequest::new(
                Method::GET,
                self.host,
                with_query(&path, &[("token", token.as_str())]),
                Auth::Required,
            )?,
            None => ApiRequest::new(Method::GET, self.host, path, Auth::Anonymous)?,
        };
        Ok(request)
    }

    /// `POST payouts`.
    pub fn create_payout(&self, request: &PayoutRequest, token: &Token) -> Result<ApiRequest, ClientError> {
        if request.instructions.is_empty() {
            return Err(ValidationError::EmptyInstructions.into());
        }
        let body = wire::encode_payout_request(request, token.as_str(), &Guid::generate());
        Ok(ApiRequest::new(Method::POST, self.host, "payouts", Auth::Required)?.with_json_body(&body))
    }

    /// `GET payouts?token=..[&status=..]`.
    pub fn get_payouts(&self, token: &Token, status: Option<&str>) -> Result<ApiRequest, ClientError> {
        let mut params = vec![("token", token.as_str())];
        if let Some(status) = status {
            params.push(("status", status));
        }
        Ok(ApiRequest::new(
            Method::GET,
            self.host,
            with_query("payouts", &params),
            Auth::Required,
        )?)
    }

    /// `GET payouts/{id}?token=..`.
    pub fn get_payout(&self, payout_id: &str, token: &Token) -> Result<ApiRequest, ClientError> {
        validate_resource_id("payout", payout_id)?;
        let path = with_query(&format!("payouts/{payout_id}"), &[("token", token.as_str())]);
        Ok(ApiRequest::new(Method::GET, self.host, path, Auth::Required)?)
    }

    /// `DELETE payouts/{id}?token=..`, authorized by the payout's own token.
    pub fn delete_payout(&self, payout: &Payout) -> Result<ApiRequest, ClientError> {
        validate_resource_id("payout", &payout.id)?;
        let path = with_query(
            &format!("payouts/{}", payout.id),
            &[("token", payout.response_token.as_str())],
        );
        Ok(ApiRequest::new(Method::DELETE, self.host, path, Auth::Required)?)
    }

    /// `GET tokens`.
    pub fn get_tokens(&self) -> Result<ApiRequest, ClientError> {
        Ok(ApiRequest::new(Method::GET, self.host, "tokens", Auth::Required)?)
    }

    /// `POST tokens`. Unsigned: during pairing no key has been associated yet.
    pub fn create_token(&self, request: &TokenRequest) -> Result<ApiRequest, ClientError> {
        if let Some(code) = &request.pairing_code {
            validate_pairing_code(code)?;
        }
        let body = wire::encode_token_request(request, &Guid::generate());
        Ok(ApiRequest::new(Method::POST, self.host, "tokens", Auth::Anonymous)?.with_json_body(&body))
    }

    /// `GET currencies`.
    pub fn get_currencies(&self) -> Result<ApiRequest, ClientError> {
        Ok(ApiRequest::new(Method::GET, self.host, "currencies", Auth::Anonymous)?)
    }
}

/// Pairing codes are exactly seven ASCII letters or digits.
pub fn validate_pairing_code(code: &str) -> Result<(), ValidationError> {
    if PAIRING_CODE.is_match(code) {
        Ok(())
    } else {
        Err(ValidationError::PairingCode(code.to_string()))
    }
}

fn validate_resource_id(kind: &'static str, value: &str) -> Result<(), ValidationError> {
    if RESOURCE_ID.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::ResourceId {
            kind,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitpay_types::item::Item;
    use bitpay_types::payout::InstructionRequest;
    use bitpay_types::timestamp::UnixTimestamp;
    use serde_json::Value;

    fn body(request: &ApiRequest) -> Value {
        serde_json::from_slice(request.body()).unwrap()
    }

    #[test]
    fn test_pairing_codes() {
        assert!(validate_pairing_code("AB12345").is_ok());
        assert_eq!(
            validate_pairing_code("AB123"),
            Err(ValidationError::PairingCode("AB123".into()))
        );
        assert!(validate_pairing_code("AB12345!").is_err());
        assert!(validate_pairing_code("AB1234é").is_err());
    }

    #[test]
    fn test_create_token_rejects_bad_pairing_code() {
        let host = ApiHost::test();
        let builder = RequestBuilder::new(&host);
        let err = builder
            .create_token(&TokenRequest::default().with_pairing_code("AB123"))
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(ValidationError::PairingCode(_))));

        let request = builder
            .create_token(&TokenRequest::default().with_id("Tf2yYi7fvGFS4gYXz5sZwHrmvCvyn5PpDrE").with_pairing_code("AB12345"))
            .unwrap();
        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.auth(), Auth::Anonymous);
        assert_eq!(body(&request)["pairingCode"], "AB12345");
        assert!(body(&request)["guid"].is_string());
    }

    #[test]
    fn test_get_invoice_depends_on_merchant_token() {
        let host = ApiHost::test();
        let builder = RequestBuilder::new(&host);

        let anonymous = builder.get_invoice("abc123", None).unwrap();
        assert_eq!(anonymous.url().as_str(), "https://test.bitpay.com/invoices/abc123");
        assert_eq!(anonymous.auth(), Auth::Anonymous);

        let pos = Token::new(Facade::Pos, "pos-token");
        assert_eq!(builder.get_invoice("abc123", Some(&pos)).unwrap().auth(), Auth::Anonymous);

        let merchant = Token::new(Facade::Merchant, "merchant-token");
        let signed = builder.get_invoice("abc123", Some(&merchant)).unwrap();
        assert_eq!(signed.path(), "invoices/abc123?token=merchant-token");
        assert_eq!(signed.auth(), Auth::Required);
    }

    #[test]
    fn test_resource_ids_are_validated() {
        let host = ApiHost::test();
        let builder = RequestBuilder::new(&host);
        let err = builder.get_invoice("../tokens", None).unwrap_err();
        assert!(matches!(err, ClientError::Validation(ValidationError::ResourceId { .. })));
        let token = Token::new(Facade::Payroll, "t");
        assert!(builder.get_payout("a?b", &token).is_err());
    }

    #[test]
    fn test_get_payouts_query() {
        let host = ApiHost::test();
        let builder = RequestBuilder::new(&host);
        let token = Token::new(Facade::Payroll, "payroll-token");
        assert_eq!(builder.get_payouts(&token, None).unwrap().path(), "payouts?token=payroll-token");
        assert_eq!(
            builder.get_payouts(&token, Some("complete")).unwrap().url().as_str(),
            "https://test.bitpay.com/payouts?token=payroll-token&status=complete"
        );
    }

    #[test]
    fn test_create_payout() {
        let host = ApiHost::test();
        let builder = RequestBuilder::new(&host);
        let token = Token::new(Facade::Payroll, "payroll-token");
        let empty = PayoutRequest::new(10, "USD", UnixTimestamp::from_secs(1441065600));
        assert!(matches!(
            builder.create_payout(&empty, &token),
            Err(ClientError::Validation(ValidationError::EmptyInstructions))
        ));

        let request = empty.with_instruction(InstructionRequest::new("Alice", "mzDTjhkfJfatXHRUWKcE2BXxHt4Pfz2PK7", 10));
        let built = builder.create_payout(&request, &token).unwrap();
        assert_eq!(built.auth(), Auth::Required);
        assert_eq!(body(&built)["token"], "payroll-token");
    }

    #[test]
    fn test_delete_payout_uses_payout_token() {
        let host = ApiHost::test();
        let payout = bitpay_types::wire::decode_payout(serde_json::json!({
            "id": "JQ9hNtG8MeDaeGhP6KaQs1", "account": "a", "currency": "USD",
            "amount": 10, "status": "new", "token": "payout-token"
        }))
        .unwrap();
        let request = RequestBuilder::new(&host).delete_payout(&payout).unwrap();
        assert_eq!(request.method(), Method::DELETE);
        assert_eq!(request.path(), "payouts/JQ9hNtG8MeDaeGhP6KaQs1?token=payout-token");
    }

    #[test]
    fn test_create_invoice_is_optionally_signed() {
        let host = ApiHost::test();
        let invoice = InvoiceRequest::new(Item::new(5), "USD");
        let request = RequestBuilder::new(&host).create_invoice(&invoice, None).unwrap();
        assert_eq!(request.auth(), Auth::Optional);
        assert!(body(&request).get("token").is_none());
    }
}
