#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Entity model and wire codec for the BitPay payment-processing API.
//!
//! This crate has no I/O. It describes what the API talks about (invoices,
//! payouts, tokens, currencies) and how those map to and from the JSON the
//! API exchanges. The HTTP client, request signing and transports live in the
//! `bitpay-rs` crate.
//!
//! # Modules
//!
//! - [`config`] - Configuration values resolved from literals or environment variables
//! - [`currency`] - Supported currencies
//! - [`invoice`] - Invoices, their lifecycle status, and invoice-creation requests
//! - [`item`] - The item being sold and the buyer's details
//! - [`payout`] - Payouts, payout instructions, and payout-creation requests
//! - [`timestamp`] - Unix timestamps and the API's mixed time representation
//! - [`token`] - API tokens and facades
//! - [`util`] - Amount coercion and request GUIDs
//! - [`wire`] - Response envelope, entity decoders, and request body encoders

pub mod config;
pub mod currency;
pub mod invoice;
pub mod item;
pub mod payout;
pub mod timestamp;
pub mod token;
pub mod util;
pub mod wire;
