//! The merchant-facing client.
//!
//! [`WeiboPay`] owns the merchant configuration, the parsed keys and the
//! HTTP client. It merges caller parameters over the base payload, resolves
//! operation names to sub-gateways, signs, sends and classifies.
//!
//! # Example
//!
//! ```rust,ignore
//! use weibopay_lib::{FieldMap, MerchantConfig, PayResponse, WeiboPay};
//!
//! let client = WeiboPay::new(MerchantConfig::from_env()?)?;
//!
//! // Browser checkout
//! let order = FieldMap::new()
//!     .with("out_pay_id", "20240101-0001")
//!     .with("total_amount", 100)
//!     .with("subject", "Membership");
//! if let PayResponse::Redirect(url) = client.web(order).await? {
//!     println!("send the payer to {}", url);
//! }
//!
//! // Order lookup
//! let status = client.find_order("20240101-0001").await?;
//! println!("{:?}", status.get("data.status"));
//! ```

pub mod config;
pub mod http;

pub use config::{HttpOptions, MerchantConfig, DEFAULT_BASE_URI};
pub use http::ApiClient;

use url::Url;

use crate::gateways::{Operation, OrderRef, PayRequest, SubGateway, REFUND_APPLY_ENDPOINT};
use crate::notify::{InboundRequest, NOTIFY_ACK};
use crate::response::ApiResponse;
use crate::signing::{CanonicalSigner, SignedPayload, SIGN_TYPE_RSA};
use crate::{FieldMap, FieldValue, Result, WeiboPayError};

/// Fields copied from the refund order into the refund application.
const REFUND_ORDER_KEYS: [&str; 4] = ["pay_id", "out_refund_id", "notify_url", "detail_data"];

/// Outcome of [`WeiboPay::pay`].
#[derive(Clone, Debug, PartialEq)]
pub enum PayResponse {
    /// Checkout URL the payer's browser should be sent to.
    Redirect(String),
    /// The provider accepted a server-to-server call.
    Completed(ApiResponse),
}

/// Weibo Pay client.
///
/// Immutable after construction; share it freely across tasks.
#[derive(Clone, Debug)]
pub struct WeiboPay {
    config: MerchantConfig,
    signer: CanonicalSigner,
    http: ApiClient,
    payload: FieldMap,
}

impl WeiboPay {
    /// Resolve keys, build the HTTP client and the base payload.
    pub fn new(config: MerchantConfig) -> Result<Self> {
        let signer = CanonicalSigner::new(
            config.private_key.as_ref(),
            config.public_key.as_ref(),
            config.sign_digest,
        )?;
        let http = ApiClient::new(&config.http)?;

        let payload = FieldMap::new()
            .with("sign_type", SIGN_TYPE_RSA)
            .with("appkey", &config.appkey)
            .with("seller_id", &config.seller_id)
            .with("notify_url", &config.notify_url)
            .with("return_url", &config.return_url);

        tracing::debug!(
            seller_id = %config.seller_id,
            base_uri = %http.base_url(),
            private_key = config.private_key.as_ref().map(|k| k.kind()).unwrap_or("none"),
            public_key = config.public_key.as_ref().map(|k| k.kind()).unwrap_or("none"),
            digest = %config.sign_digest,
            "Weibo Pay client configured"
        );

        Ok(Self {
            config,
            signer,
            http,
            payload,
        })
    }

    pub fn config(&self) -> &MerchantConfig {
        &self.config
    }

    pub fn signer(&self) -> &CanonicalSigner {
        &self.signer
    }

    pub fn base_url(&self) -> &Url {
        self.http.base_url()
    }

    /// The fields every pay request starts from.
    pub fn base_payload(&self) -> &FieldMap {
        &self.payload
    }

    /// Pay through the named sub-gateway.
    ///
    /// `params` is merged over the base payload (caller values win) and
    /// empty or absent fields are dropped before the gateway sees it.
    #[tracing::instrument(skip(self, params), fields(seller_id = %self.config.seller_id))]
    pub async fn pay(&self, gateway: &str, params: FieldMap) -> Result<PayResponse> {
        tracing::info!(params = params.len(), "Weibo pay starting");

        let operation = resolve(gateway)?;
        let sub = operation
            .gateway()
            .ok_or_else(|| WeiboPayError::UnsupportedGateway(gateway.to_string()))?;

        let mut payload = self.payload.clone();
        payload.merge(params);
        let payload = payload.filtered();

        match sub.pay(self.http.base_url(), payload, &self.signer)? {
            PayRequest::Redirect(url) => {
                tracing::info!(operation = %operation, "Weibo pay started");
                Ok(PayResponse::Redirect(url))
            }
            PayRequest::Submit { endpoint, payload } => {
                tracing::info!(operation = %operation, endpoint, "Weibo pay started");
                self.request(endpoint, &payload).await.map(PayResponse::Completed)
            }
        }
    }

    /// Web cashier checkout.
    pub async fn web(&self, params: FieldMap) -> Result<PayResponse> {
        self.pay(Operation::Web.name(), params).await
    }

    /// Confirm a transfer.
    pub async fn transfer_confirm(&self, params: FieldMap) -> Result<PayResponse> {
        self.pay(Operation::TransferConfirm.name(), params).await
    }

    /// Look up an order, refund or transfer through the named sub-gateway.
    #[tracing::instrument(skip(self, order), fields(seller_id = %self.config.seller_id))]
    pub async fn find(&self, order: impl Into<OrderRef>, gateway: &str) -> Result<ApiResponse> {
        let order = order.into();
        let operation = resolve(gateway)?;
        let sub = operation
            .gateway()
            .ok_or_else(|| WeiboPayError::UnsupportedGateway(gateway.to_string()))?;

        let query = sub.find(&order)?;
        let mut fields = query.fields;
        fields.insert("sign_type", self.base_field("sign_type"));
        fields.insert("seller_id", self.base_field("seller_id"));
        let payload = self.signer.sign_payload(fields)?;

        tracing::info!(operation = %operation, endpoint = query.endpoint, "Weibo find called");
        self.request(query.endpoint, &payload).await
    }

    /// Look up a web order by `out_pay_id`.
    pub async fn find_order(&self, order: impl Into<OrderRef>) -> Result<ApiResponse> {
        self.find(order, Operation::Web.name()).await
    }

    /// Apply for a refund.
    ///
    /// `pay_id`, `out_refund_id`, `notify_url` and `detail_data` are taken
    /// from `order`; missing ones are sent empty.
    #[tracing::instrument(skip(self, order), fields(seller_id = %self.config.seller_id))]
    pub async fn refund(&self, order: &FieldMap) -> Result<ApiResponse> {
        let mut fields = FieldMap::new()
            .with("sign_type", SIGN_TYPE_RSA)
            .with("seller_id", &self.config.seller_id);
        for key in REFUND_ORDER_KEYS {
            fields.insert(key, order.get_text(key).unwrap_or_default());
        }
        let payload = self.signer.sign_payload(fields)?;

        tracing::info!(endpoint = REFUND_APPLY_ENDPOINT, "Weibo refund called");
        self.request(REFUND_APPLY_ENDPOINT, &payload).await
    }

    /// Orders cannot be cancelled through the provider API.
    pub fn cancel(&self, _order: impl Into<OrderRef>) -> Result<ApiResponse> {
        Err(WeiboPayError::UnsupportedOperation("cancel".to_string()))
    }

    /// Orders cannot be closed through the provider API.
    pub fn close(&self, _order: impl Into<OrderRef>) -> Result<ApiResponse> {
        Err(WeiboPayError::UnsupportedOperation("close".to_string()))
    }

    /// Verify a notification payload, returning it when the signature holds.
    pub fn verify(&self, content: FieldMap) -> Result<FieldMap> {
        tracing::info!(fields = content.len(), "Weibo request received");

        if self.signer.verify_sign(&content, None)? {
            return Ok(content);
        }

        tracing::warn!(
            out_pay_id = content.get_text("out_pay_id").as_deref().unwrap_or(""),
            "Weibo sign verify failed"
        );
        Err(WeiboPayError::InvalidSignature { fields: content })
    }

    /// Verify an inbound request: the form body when present, else the query string.
    pub fn verify_request(&self, request: &InboundRequest) -> Result<FieldMap> {
        tracing::debug!(source = request.source(), "reading notification");
        self.verify(request.fields().clone())
    }

    /// Acknowledgment body for a verified notification.
    pub fn success(&self) -> &'static str {
        NOTIFY_ACK
    }

    async fn request(&self, endpoint: &str, payload: &SignedPayload) -> Result<ApiResponse> {
        self.http.post(endpoint, payload).await?.into_result()
    }

    fn base_field(&self, key: &str) -> FieldValue {
        self.payload.get(key).cloned().unwrap_or(FieldValue::Null)
    }
}

/// Resolve a gateway name, reporting unknown and unsupported names.
fn resolve(name: &str) -> Result<Operation> {
    match Operation::from_name(name) {
        Some(Operation::Unsupported(op)) => Err(WeiboPayError::UnsupportedOperation(op.to_string())),
        Some(operation) => Ok(operation),
        None => Err(WeiboPayError::UnsupportedGateway(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{test_client, test_merchant_config, TestKeys};

    #[test]
    fn test_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WeiboPay>();
    }

    #[test]
    fn test_base_payload() {
        let client = test_client();
        let payload = client.base_payload();
        assert_eq!(payload.get_text("sign_type").as_deref(), Some("rsa"));
        assert_eq!(payload.get_text("appkey").as_deref(), Some("appkey"));
        assert_eq!(payload.get_text("seller_id").as_deref(), Some("seller_id"));
        assert!(payload.contains_key("notify_url"));
    }

    #[tokio::test]
    async fn test_web_pay_redirect() {
        let client = test_client();
        let response = client
            .pay("web", FieldMap::from([("out_pay_id", "1001"), ("subject", "")]))
            .await
            .unwrap();
        let PayResponse::Redirect(url) = response else {
            panic!("expected redirect");
        };
        let prefix = "https://pay.sc.weibo.com/api/merchant/pay/cashier&";
        assert!(url.starts_with(prefix));

        let fields = FieldMap::from_form(&url[prefix.len()..]);
        assert!(!fields.contains_key("subject"));
        assert!(!fields.contains_key("notify_url"));
        assert_eq!(fields.get_text("appkey").as_deref(), Some("appkey"));
        assert!(client.signer().verify_sign(&fields, None).unwrap());
    }

    #[tokio::test]
    async fn test_pay_fixed_vector_through_base_payload() {
        // appkey and seller_id from the base payload plus one caller field
        let client = test_client();
        let PayResponse::Redirect(url) = client
            .web(FieldMap::from([("foo", "bar")]))
            .await
            .unwrap()
        else {
            panic!("expected redirect");
        };
        let fields = FieldMap::from_form(url.split_once('&').unwrap().1);
        assert_eq!(fields.get_text("sign").as_deref(), Some(TestKeys::BASE_PAYLOAD_FOO_BAR_SHA1));
    }

    #[tokio::test]
    async fn test_unknown_and_unsupported_gateways() {
        let client = test_client();
        let err = client.pay("wap", FieldMap::new()).await.unwrap_err();
        assert!(matches!(err, WeiboPayError::UnsupportedGateway(ref n) if n == "wap"));

        let err = client.pay("cancel", FieldMap::new()).await.unwrap_err();
        assert!(matches!(err, WeiboPayError::UnsupportedOperation(_)));

        let err = client.pay("refund", FieldMap::new()).await.unwrap_err();
        assert!(matches!(err, WeiboPayError::UnsupportedGateway(_)));

        let err = client.pay("refund_apply", FieldMap::new()).await.unwrap_err();
        assert!(matches!(err, WeiboPayError::UnsupportedGateway(_)));

        let err = client.find("1001", "nope").await.unwrap_err();
        assert!(matches!(err, WeiboPayError::UnsupportedGateway(_)));

        let err = client.find("1001", "close").await.unwrap_err();
        assert!(matches!(err, WeiboPayError::UnsupportedOperation(_)));
    }

    #[test]
    fn test_cancel_and_close() {
        let client = test_client();
        let err = client.cancel("1001").unwrap_err();
        assert_eq!(err.to_string(), "Weibo Pay does not support cancel orders");
        let err = client.close(FieldMap::from([("out_pay_id", "1001")])).unwrap_err();
        assert_eq!(err.to_string(), "Weibo Pay does not support close orders");
    }

    #[test]
    fn test_verify() {
        let client = test_client();
        let signed = client
            .signer()
            .sign_payload(FieldMap::from([("out_pay_id", "1001"), ("status", "PAY_SUCCESS")]))
            .unwrap();

        let verified = client.verify(signed.fields().clone()).unwrap();
        assert_eq!(verified.get_text("status").as_deref(), Some("PAY_SUCCESS"));

        let mut tampered = signed.into_fields();
        tampered.insert("status", "REFUND");
        let err = client.verify(tampered).unwrap_err();
        assert!(matches!(err, WeiboPayError::InvalidSignature { ref fields } if fields.get_text("status").as_deref() == Some("REFUND")));
    }

    #[test]
    fn test_verify_request_reads_query_when_body_empty() {
        let client = test_client();
        let signed = client
            .signer()
            .sign_payload(FieldMap::from([("out_pay_id", "1001")]))
            .unwrap();

        let request = InboundRequest::from_parts("", &signed.to_form());
        assert!(client.verify_request(&request).is_ok());
        assert_eq!(client.success(), "success");
    }

    #[test]
    fn test_verify_without_public_key() {
        let mut config = test_merchant_config();
        config.public_key = None;
        let client = WeiboPay::new(config).unwrap();
        let err = client.verify(FieldMap::from([("sign", "abc")])).unwrap_err();
        assert!(matches!(err, WeiboPayError::Config { .. }));
    }
}
