//! Test utilities for Weibo Pay.
//!
//! A fixed RSA key pair with known signature vectors, merchant
//! configuration fixtures and assertion helpers.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use weibopay_lib::test_utils::{test_client_for, signed_notification};
//!
//! // Point a client at a mock server
//! let client = test_client_for(&server.uri());
//!
//! // Build a notification the client will accept
//! let notification = signed_notification([("out_pay_id", "1001"), ("status", "PAY_SUCCESS")]);
//! assert!(client.verify(notification).is_ok());
//! ```

mod assertions;
mod fixtures;

pub use fixtures::{
    signed_notification, test_client, test_client_for, test_merchant_config, test_signer, TestKeys,
};

pub use assertions::{assert_business_failure, assert_unsupported, assert_verifies};
