#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Client for the BitPay payment-processing API.
//!
//! Requests are built per operation, optionally signed with a secp256k1 key,
//! sent through a pluggable [`Transport`], and their JSON responses decoded
//! into the entity types of the [`bitpay_types`] crate.
//!
//! # Authentication
//!
//! Signed requests carry the caller's public key in `x-identity` and, in
//! `x-signature`, a signature over the full request URI followed by the body.
//! No secret ever leaves the process. See [`dispatcher`] for the details.
//!
//! # Modules
//!
//! - [`builder`] - Per-operation request assembly and input validation
//! - [`client`] - The [`ApiClient`] façade
//! - [`config`] - JSON client configuration with environment variable resolution
//! - [`dispatcher`] - Standard headers, request signing and dispatch
//! - [`error`] - Error taxonomy
//! - [`request`] - Request, response and host values
//! - [`signer`] - Signing capabilities and the [`EcdsaKeyPair`] implementation
//! - [`transport`] - The [`Transport`] capability
//!
//! # Feature Flags
//!
//! - `telemetry` - Wraps operations in `tracing` spans

pub mod builder;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod request;
pub mod signer;
pub mod transport;

pub use bitpay_types as types;
pub use client::ApiClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, ConfigurationError, ProtocolError, ValidationError};
pub use request::{ApiHost, ApiRequest, ApiResponse, Auth};
pub use signer::{EcdsaKeyPair, PublicKeyRef, SignerError, SigningKey};
pub use transport::{Transport, TransportError};
