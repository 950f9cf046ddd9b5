//! Weibo Pay merchant API client.
//!
//! The library builds signed requests toward the Weibo merchant payment API,
//! dispatches caller operations to the sub-gateway that shapes them, and
//! verifies the signature on the provider's asynchronous notifications.
//!
//! # Features
//!
//! - **Canonical signing**: RSA PKCS#1 v1.5 over a sorted, filtered `key=value&...` string
//! - **Sub-gateways**: web cashier checkout, transfer confirmation, order/refund/transfer lookup
//! - **Result classification**: provider answers become success or a typed business failure
//! - **Notification intake**: form body or query string, verified before use
//!
//! # Example
//!
//! ```ignore
//! use weibopay_lib::{FieldMap, MerchantConfig, PayResponse, WeiboPay};
//!
//! let config = MerchantConfig::new("appkey", "seller_id")
//!     .with_notify_url("https://shop.example/weibo/notify")
//!     .with_private_key("/etc/weibo/merchant_private.pem")
//!     .with_public_key("/etc/weibo/weibo_public.pem");
//! let client = WeiboPay::new(config)?;
//!
//! let order = FieldMap::new().with("out_pay_id", "1001").with("total_amount", 100);
//! if let PayResponse::Redirect(url) = client.web(order).await? {
//!     // send the payer's browser to `url`
//! }
//!
//! // In the notify handler
//! let fields = client.verify_request(&InboundRequest::from_parts(&body, &query))?;
//! respond(client.success());
//! ```

pub mod client;
pub mod errors;
pub mod fields;
pub mod gateways;
pub mod notify;
pub mod prelude;
pub mod response;
pub mod signing;

/// Test utilities: fixed key pair, merchant fixtures and assertions.
///
/// This module is only available with the `test-utils` feature or in test builds.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use client::{ApiClient, HttpOptions, MerchantConfig, PayResponse, WeiboPay};
pub use errors::{WeiboPayError, WeiboPayErrorCode};
pub use fields::{FieldMap, FieldValue};
pub use gateways::{Operation, OrderRef, SubGateway};
pub use notify::{InboundRequest, NOTIFY_ACK};
pub use response::{classify, ApiResponse, ApiResult};
pub use signing::{CanonicalSigner, KeyMaterial, SignDigest, SignedPayload};

/// Common result alias for Weibo Pay operations.
pub type Result<T> = std::result::Result<T, WeiboPayError>;
