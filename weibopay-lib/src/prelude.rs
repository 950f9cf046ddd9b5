//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use weibopay_lib::prelude::*;
//! ```

// Client and configuration
pub use crate::client::{HttpOptions, MerchantConfig, PayResponse, WeiboPay};

// Error handling
pub use crate::errors::{WeiboPayError, WeiboPayErrorCode};
pub use crate::Result;

// Payloads
pub use crate::fields::{FieldMap, FieldValue};
pub use crate::notify::InboundRequest;
pub use crate::response::{ApiResponse, ApiResult};

// Signing
pub use crate::signing::{canonical_string, CanonicalSigner, KeyMaterial, SignDigest};

// Gateways
pub use crate::gateways::{Operation, OrderRef};
