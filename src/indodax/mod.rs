//! Indodax Exchange API Library
//!
//! Thin client for the Indodax REST API.
//!
//! # Modules
//!
//! - [`auth`]: HMAC-SHA512 signing and credentials
//! - [`payload`]: ordered form payload builder
//! - [`requests`]: typed private method requests
//! - [`public`]: public market data endpoints
//! - [`client`]: HTTP client with the signed and public primitives

pub mod auth;
pub mod client;
pub(crate) mod de;
pub mod payload;
pub mod public;
pub mod requests;

pub use auth::{sign_request, verify_signature, Credentials};
pub use client::{ClientConfig, IndodaxClient, SignedRequest, PRIVATE_API_URL, PUBLIC_API_URL};
pub use payload::{ParamValue, Payload};
pub use public::PublicEndpoint;
pub use requests::{OrderSide, OrderType, PrivateRequest, SortOrder};
