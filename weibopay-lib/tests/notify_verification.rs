//! Notification verification through the public API.

use weibopay_lib::test_utils::{signed_notification, test_client};
use weibopay_lib::{FieldMap, InboundRequest, WeiboPayError};

fn notification() -> FieldMap {
    signed_notification([
        ("out_pay_id", "1001"),
        ("pay_id", "P-1"),
        ("status", "PAY_SUCCESS"),
        ("total_amount", "100"),
        ("subject", "Membership & more"),
    ])
}

#[test]
fn test_form_post_notification() {
    let client = test_client();
    let body = notification().to_form();

    let request = InboundRequest::from_parts(&body, "");
    let fields = client.verify_request(&request).unwrap();
    assert_eq!(fields.get_text("subject").as_deref(), Some("Membership & more"));
    assert_eq!(client.success(), "success");
}

#[test]
fn test_query_string_notification() {
    let client = test_client();
    let query = format!("?{}", notification().to_form());

    let fields = client
        .verify_request(&InboundRequest::from_parts("", &query))
        .unwrap();
    assert_eq!(fields.get_text("status").as_deref(), Some("PAY_SUCCESS"));
}

#[test]
fn test_tampered_notification_rejected() {
    let client = test_client();
    let mut fields = notification();
    fields.insert("total_amount", "1");

    let err = client.verify(fields).unwrap_err();
    assert!(matches!(err, WeiboPayError::InvalidSignature { .. }));
    assert_eq!(err.to_string(), "Weibo sign verify failed");
}

#[test]
fn test_unsigned_notification_rejected() {
    let client = test_client();
    let request = InboundRequest::from_parts("out_pay_id=1001&status=PAY_SUCCESS", "");
    assert!(matches!(
        client.verify_request(&request),
        Err(WeiboPayError::InvalidSignature { .. })
    ));
}
