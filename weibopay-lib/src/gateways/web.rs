//! Web cashier checkout and order lookup.

use url::Url;

use super::{FindQuery, Operation, OrderRef, PayRequest, SubGateway};
use crate::signing::CanonicalSigner;
use crate::{FieldMap, Result};

/// Cashier path, appended to the base URI.
pub const CASHIER_PATH: &str = "pay/cashier";

/// Order query endpoint.
pub const ORDER_QUERY_ENDPOINT: &str = "query";

/// Browser checkout: signs the payload and produces the cashier URL.
///
/// The URL is `{base}pay/cashier&{form-encoded payload}`. The provider
/// expects `&` right after the path, not `?`.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebGateway;

impl SubGateway for WebGateway {
    fn operation(&self) -> Operation {
        Operation::Web
    }

    fn pay(&self, base_uri: &Url, payload: FieldMap, signer: &CanonicalSigner) -> Result<PayRequest> {
        let payload = signer.sign_payload(payload)?;
        Ok(PayRequest::Redirect(format!(
            "{}{}&{}",
            base_uri,
            CASHIER_PATH,
            payload.to_form()
        )))
    }

    fn find(&self, order: &OrderRef) -> Result<FindQuery> {
        order_query(order)
    }
}

/// Order lookup by `out_pay_id`, without a pay capability.
#[derive(Clone, Copy, Debug, Default)]
pub struct OrderQueryGateway;

impl SubGateway for OrderQueryGateway {
    fn operation(&self) -> Operation {
        Operation::OrderQuery
    }

    fn find(&self, order: &OrderRef) -> Result<FindQuery> {
        order_query(order)
    }
}

fn order_query(order: &OrderRef) -> Result<FindQuery> {
    Ok(FindQuery::new(ORDER_QUERY_ENDPOINT).with("out_pay_id", order.require("out_pay_id")?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_signer;
    use crate::WeiboPayError;

    #[test]
    fn test_cashier_url_carries_verifiable_sign() {
        let base = Url::parse("https://pay.sc.weibo.com/api/merchant/").unwrap();
        let signer = test_signer();
        let payload = FieldMap::from([
            ("appkey", "appkey"),
            ("seller_id", "seller_id"),
            ("out_pay_id", "1001"),
            ("subject", "test order"),
        ]);

        let PayRequest::Redirect(url) = WebGateway.pay(&base, payload, &signer).unwrap() else {
            panic!("web pay should redirect");
        };
        let prefix = "https://pay.sc.weibo.com/api/merchant/pay/cashier&";
        assert!(url.starts_with(prefix), "{}", url);

        let fields = FieldMap::from_form(&url[prefix.len()..]);
        assert_eq!(fields.get_text("subject").as_deref(), Some("test order"));
        assert_eq!(fields.get_text("sign_type").as_deref(), Some("rsa"));
        assert!(signer.verify_sign(&fields, None).unwrap());
    }

    #[test]
    fn test_find_string_and_map() {
        let by_id = WebGateway.find(&OrderRef::from("1001")).unwrap();
        let by_map = WebGateway
            .find(&OrderRef::from(FieldMap::from([("out_pay_id", "1001")])))
            .unwrap();
        assert_eq!(by_id, by_map);
        assert_eq!(by_id.endpoint, "query");
        assert_eq!(by_id.fields.get_text("out_pay_id").as_deref(), Some("1001"));
    }

    #[test]
    fn test_find_map_without_key() {
        let err = OrderQueryGateway
            .find(&OrderRef::from(FieldMap::from([("pay_id", "9")])))
            .unwrap_err();
        assert!(matches!(err, WeiboPayError::InvalidData { ref field, .. } if field == "out_pay_id"));
    }

    #[test]
    fn test_order_query_cannot_pay() {
        let base = Url::parse("https://pay.sc.weibo.com/api/merchant/").unwrap();
        let err = OrderQueryGateway
            .pay(&base, FieldMap::new(), &test_signer())
            .unwrap_err();
        assert!(matches!(err, WeiboPayError::UnsupportedGateway(_)));
    }
}
