//! Assertion helpers for gateway results.

use std::fmt::Debug;

use crate::signing::CanonicalSigner;
use crate::{FieldMap, Result, WeiboPayError};

/// Assert that `result` is a business failure carrying `code`.
///
/// # Panics
/// Panics on success or on any other error.
pub fn assert_business_failure<T: Debug>(result: &Result<T>, code: &str) {
    match result {
        Err(WeiboPayError::BusinessFailure { code: actual, .. }) => {
            assert_eq!(actual.as_deref(), Some(code), "unexpected business code");
        }
        other => panic!("expected business failure {}, got {:?}", code, other),
    }
}

/// Assert that `result` reports an unsupported gateway or operation.
///
/// # Panics
/// Panics on success or on any other error.
pub fn assert_unsupported<T: Debug>(result: &Result<T>) {
    assert!(
        matches!(
            result,
            Err(WeiboPayError::UnsupportedGateway(_)) | Err(WeiboPayError::UnsupportedOperation(_))
        ),
        "expected an unsupported gateway/operation error, got {:?}",
        result
    );
}

/// Assert that `fields` carries a `sign` that `signer` accepts.
///
/// # Panics
/// Panics when the signature is missing or does not verify.
pub fn assert_verifies(signer: &CanonicalSigner, fields: &FieldMap) {
    assert!(fields.get_text("sign").is_some(), "payload carries no sign");
    let verified = signer
        .verify_sign(fields, None)
        .expect("signer has a public key");
    assert!(verified, "signature does not verify: {:?}", fields);
}
