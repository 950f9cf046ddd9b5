//! Shared helpers for the gateway integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use weibopay_lib::test_utils::test_signer;
use weibopay_lib::FieldMap;
use wiremock::{Match, Request};

pub fn success_body(data: Value) -> Value {
    json!({"code": "100000", "msg": "ok", "data": data})
}

pub fn form_fields(request: &Request) -> FieldMap {
    FieldMap::from_form(&String::from_utf8_lossy(&request.body))
}

/// Matches a form body carrying a valid merchant signature.
pub struct SignedForm;

impl Match for SignedForm {
    fn matches(&self, request: &Request) -> bool {
        let fields = form_fields(request);
        fields.get_text("sign_type").as_deref() == Some("rsa")
            && test_signer().verify_sign(&fields, None).unwrap_or(false)
    }
}
