//! Sub-gateways: operation-specific payload and endpoint shaping.
//!
//! Callers pick an operation by name (`"web"`, `"refund"`,
//! `"transfer_confirm"`, ...). The name resolves to an [`Operation`], and the
//! operation to the [`SubGateway`] that knows which fields the provider
//! expects and where to send them. Signing and transport stay with the
//! caller, see [`crate::WeiboPay`].

mod refund;
mod transfer;
mod web;

pub use refund::{RefundGateway, REFUND_QUERY_ENDPOINT, REFUND_QUERY_KEYS};
pub use transfer::{TransferConfirmGateway, TRANSFER_CONFIRM_ENDPOINT, TRANSFER_QUERY_ENDPOINT};
pub use web::{OrderQueryGateway, WebGateway, CASHIER_PATH, ORDER_QUERY_ENDPOINT};

use std::fmt;

use url::Url;

use crate::signing::{CanonicalSigner, SignedPayload};
use crate::{FieldMap, Result, WeiboPayError};

/// Endpoint of the refund application call.
pub const REFUND_APPLY_ENDPOINT: &str = "refund/apply";

/// A provider operation, resolved from a caller-supplied name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Web cashier checkout.
    Web,
    /// Refund status query.
    RefundQuery,
    /// Order status query.
    OrderQuery,
    /// Refund application.
    RefundApply,
    /// Transfer confirmation.
    TransferConfirm,
    /// An operation the provider does not offer (`cancel`, `close`).
    Unsupported(&'static str),
}

impl Operation {
    /// Resolve an operation name.
    ///
    /// Matching ignores ASCII case, `_`, `-` and spaces, so `transfer_confirm`,
    /// `TransferConfirm` and `transferConfirm` are the same operation.
    /// Returns `None` for names that map to nothing.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "web" => Some(Self::Web),
            "refund" | "refundquery" => Some(Self::RefundQuery),
            "query" | "orderquery" => Some(Self::OrderQuery),
            "refundapply" => Some(Self::RefundApply),
            "transfer" | "transferconfirm" => Some(Self::TransferConfirm),
            "cancel" => Some(Self::Unsupported("cancel")),
            "close" => Some(Self::Unsupported("close")),
            _ => None,
        }
    }

    /// Canonical name, used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::RefundQuery => "refund_query",
            Self::OrderQuery => "order_query",
            Self::RefundApply => "refund_apply",
            Self::TransferConfirm => "transfer_confirm",
            Self::Unsupported(name) => name,
        }
    }

    /// The sub-gateway serving this operation.
    ///
    /// Refund application is built by the client itself, and unsupported
    /// operations have no gateway.
    pub fn gateway(&self) -> Option<&'static dyn SubGateway> {
        match self {
            Self::Web => Some(&WebGateway),
            Self::OrderQuery => Some(&OrderQueryGateway),
            Self::RefundQuery => Some(&RefundGateway),
            Self::TransferConfirm => Some(&TransferConfirmGateway),
            Self::RefundApply | Self::Unsupported(_) => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a sub-gateway's pay step produced.
#[derive(Clone, Debug, PartialEq)]
pub enum PayRequest {
    /// Send the payer's browser here.
    Redirect(String),
    /// POST this signed payload to `endpoint` (relative to the base URI).
    Submit {
        endpoint: &'static str,
        payload: SignedPayload,
    },
}

/// Query fields for a lookup, before `sign_type`, `seller_id` and `sign`
/// are added.
#[derive(Clone, Debug, PartialEq)]
pub struct FindQuery {
    pub endpoint: &'static str,
    pub fields: FieldMap,
}

impl FindQuery {
    pub fn new(endpoint: &'static str) -> Self {
        Self {
            endpoint,
            fields: FieldMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.insert(key, value.into());
        self
    }
}

/// An order reference: a bare identifier or a map of identifying fields.
#[derive(Clone, Debug, PartialEq)]
pub enum OrderRef {
    Id(String),
    Fields(FieldMap),
}

impl OrderRef {
    /// The value `key` stands for: a bare id is taken as that key, verbatim.
    pub fn require(&self, key: &str) -> Result<String> {
        let value = match self {
            Self::Id(id) => Some(id.clone()).filter(|id| !id.is_empty()),
            Self::Fields(fields) => fields.get_text(key),
        };
        value.ok_or_else(|| WeiboPayError::invalid_data(key, "order reference has no value for this key"))
    }
}

impl From<&str> for OrderRef {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for OrderRef {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

impl From<FieldMap> for OrderRef {
    fn from(fields: FieldMap) -> Self {
        Self::Fields(fields)
    }
}

/// Operation-specific strategy shaping payloads and endpoints.
///
/// Both capabilities are optional; the defaults report the gateway as not
/// supporting them.
pub trait SubGateway: Send + Sync {
    /// The operation this gateway serves.
    fn operation(&self) -> Operation;

    /// Turn the merged, filtered payload into a pay request.
    fn pay(&self, _base_uri: &Url, _payload: FieldMap, _signer: &CanonicalSigner) -> Result<PayRequest> {
        Err(WeiboPayError::UnsupportedGateway(self.operation().name().to_string()))
    }

    /// Build the query for looking up `order`.
    fn find(&self, _order: &OrderRef) -> Result<FindQuery> {
        Err(WeiboPayError::UnsupportedGateway(self.operation().name().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_normalization() {
        for name in ["transfer_confirm", "TransferConfirm", "transferConfirm", "transfer-confirm"] {
            assert_eq!(Operation::from_name(name), Some(Operation::TransferConfirm));
        }
        assert_eq!(Operation::from_name("WEB"), Some(Operation::Web));
        assert_eq!(Operation::from_name("refund"), Some(Operation::RefundQuery));
        assert_eq!(Operation::from_name("refund_apply"), Some(Operation::RefundApply));
        assert_eq!(Operation::from_name("query"), Some(Operation::OrderQuery));
        assert_eq!(Operation::from_name("Cancel"), Some(Operation::Unsupported("cancel")));
        assert_eq!(Operation::from_name("close"), Some(Operation::Unsupported("close")));
        assert_eq!(Operation::from_name("wap"), None);
        assert_eq!(Operation::from_name(""), None);
    }

    #[test]
    fn test_gateway_table() {
        assert_eq!(Operation::Web.gateway().unwrap().operation(), Operation::Web);
        assert_eq!(
            Operation::RefundQuery.gateway().unwrap().operation(),
            Operation::RefundQuery
        );
        assert!(Operation::RefundApply.gateway().is_none());
        assert!(Operation::Unsupported("cancel").gateway().is_none());
    }

    #[test]
    fn test_default_capabilities_are_unsupported() {
        let err = RefundGateway
            .pay(
                &Url::parse("https://pay.sc.weibo.com/api/merchant/").unwrap(),
                FieldMap::new(),
                &crate::test_utils::test_signer(),
            )
            .unwrap_err();
        assert!(matches!(err, WeiboPayError::UnsupportedGateway(ref name) if name == "refund_query"));
    }

    #[test]
    fn test_order_ref_require() {
        assert_eq!(OrderRef::from("1001").require("out_pay_id").unwrap(), "1001");
        let map = OrderRef::from(FieldMap::from([("out_pay_id", "1002")]));
        assert_eq!(map.require("out_pay_id").unwrap(), "1002");
        assert!(matches!(
            map.require("transfer_id"),
            Err(WeiboPayError::InvalidData { .. })
        ));
        assert!(OrderRef::from("").require("out_pay_id").is_err());
    }

    #[test]
    fn test_bare_id_is_sent_verbatim() {
        assert_eq!(
            OrderRef::from(" 1001 ").require("out_pay_id").unwrap(),
            " 1001 "
        );
    }
}
