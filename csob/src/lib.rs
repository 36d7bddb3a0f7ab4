#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Payment request model for the ČSOB card payment gateway.
//!
//! This crate assembles, validates and signs `payment/init` requests. The
//! cryptographic primitive and the HTTP transport are left to the integrator
//! behind the [`signature::Signer`] and [`client::Transport`] traits; the
//! crate owns everything in between: field constraints, default resolution,
//! the canonical field order and the signature base string.
//!
//! # Overview
//!
//! A request is built as a [`payment::PaymentRequest`], finalized against a
//! [`config::MerchantConfig`] into a [`payment::PreparedPayment`], and then
//! turned into a signed payload. The gateway rebuilds the signature base
//! from the fields it receives, so the payload and the base always come
//! from the same ordered field table.
//!
//! # Modules
//!
//! - [`canonical`] - Canonical field order, payload and signature entries
//! - [`cart`] - Cart items and amount rounding
//! - [`client`] - Payment initialization through a [`client::Transport`]
//! - [`config`] - Merchant configuration and key material
//! - [`customer`] - Extended customer data
//! - [`error`] - Validation and collaborator errors
//! - [`order`] - Extended order data and addresses
//! - [`payment`] - The request builder and the prepared payment
//! - [`proto`] - Wire enums, defaults, API versions and merchant data encoding
//! - [`signature`] - Signature base flattening and the signer trait
//! - [`timestamp`] - Gateway timestamps
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod canonical;
pub mod cart;
pub mod client;
pub mod config;
pub mod customer;
pub mod error;
pub mod order;
pub mod payment;
pub mod proto;
pub mod signature;
mod text;
pub mod timestamp;

pub use client::{Client, Transport};
pub use config::MerchantConfig;
pub use error::{PaymentError, ValidationError};
pub use payment::{PaymentRequest, PreparedPayment};
pub use signature::Signer;
