//! Fixed key pair and merchant fixtures.

use crate::signing::{CanonicalSigner, KeyMaterial, SignDigest};
use crate::{FieldMap, FieldValue, MerchantConfig, WeiboPay};

/// A 2048-bit RSA key pair in every accepted encoding, with signatures
/// produced by an independent signer.
pub struct TestKeys;

impl TestKeys {
    /// PKCS#1 private key body without PEM framing.
    pub const PRIVATE_KEY_BASE64: &'static str =
        include_str!("../../fixtures/merchant_private_key.b64");
    /// PKCS#1 private key PEM.
    pub const PRIVATE_KEY_PEM: &'static str = include_str!("../../fixtures/merchant_private_key.pem");
    /// PKCS#8 private key PEM.
    pub const PRIVATE_KEY_PKCS8_PEM: &'static str =
        include_str!("../../fixtures/merchant_private_key_pkcs8.pem");
    /// SPKI public key body without PEM framing.
    pub const PUBLIC_KEY_BASE64: &'static str = include_str!("../../fixtures/merchant_public_key.b64");
    /// SPKI public key PEM.
    pub const PUBLIC_KEY_PEM: &'static str = include_str!("../../fixtures/merchant_public_key.pem");
    /// PKCS#1 public key PEM.
    pub const PUBLIC_KEY_PKCS1_PEM: &'static str =
        include_str!("../../fixtures/merchant_public_key_pkcs1.pem");

    /// SHA-1 signature of `foo=bar`.
    pub const FOO_BAR_SHA1: &'static str = "iNVzwEIEidTWzuTCl0CwpPAEN3EP4wgplzA0sY+w8R5qJVG+ZUws4BFwfJZtEuiWj1DlkSYudOFtZkIZAhSFCZmx0GfYAaBPtdpHwFhk7kzmhmN4pJvWmcUInb/UFsYDigD8FE5XB7TnTMhLBGUqOYMUnYGX/BnJOkO9beLwO+mTc9RgPrNYBMoSAWD3JjrSvD7xnG2kTv4H13z1Cyuf0QGAtPM1+tWszGMlEuapNOx16xFVsDWwc9rnFxI3q1sBgIaAuTHuRK4i3YRA3FqhLx8PoZccb2cIl4XvAUbQoTfQIVPVYGS2fSFKvxmoat2p2YG83mdm9EqfnOVE/mWciw==";

    /// SHA-256 signature of `foo=bar`.
    pub const FOO_BAR_SHA256: &'static str = "dqV8Iq0kjI/PqvrDIgXFhlsRMzufQ8mZS+mK5qDsQC0Cd9uoYl+La1zPHxDlWf9K+DYIA7w5aARBUURILbc2axc4cJ7y0xMa47P0mRkELUWC32q+yY2k7L5MHjaeOPoGmVQH/2Nr62ppqgO8JG10Q4450MtWd1Oh3lIIrEmuYtfJv96QHRhnNu3Y8Ti84Q4p8OUQhiOlNY1XTOUiqakHi8P31a64fPkRsKE+FpFM3ZRy2ajhY+FIItu1K3cig/qlSZHyciAJK3kZkPgv3RuOrg70wRexgDoiBs83WXFGTXmo5gNR2KRRC3YoETJumSPiLGQgTfE20g1V/YPv1fVq5Q==";

    /// SHA-1 signature of `appkey=appkey&foo=bar&seller_id=seller_id`, the
    /// canonical string of a `foo=bar` pay request over [`test_merchant_config`].
    pub const BASE_PAYLOAD_FOO_BAR_SHA1: &'static str = "biElnc6hsicxqKNmzAIyVauW9E4s0J+J66bww/pLkw35EP4i89HktPLwl5KQ+8qRns03HQditTNlcpyN45FyRnOiuG/7iVDaYOQZrtcXG+S8tlXSXwQJAXwgZIe7YAla1xOYmpUZPsCWDUXgCWQSqCUBSIi0HW/xaM/PRqXFnghe0CHeUb2bj/Q618MTOHHSZF/I09s/CKB2TRbuz6dukFxht2KYJuOjSNqEgDjfArmwINopa3EQEfkYiZIo0DHi+45l2fFN1FmLy3gVKaI1pTg2NOSK/U27o3ZUo/8AMGkEt1asA58Xerntvdu+TCx1hvUICIUXjKV7wHoQogB0vg==";
}

/// A signer holding both halves of the test key pair.
///
/// The same pair plays merchant and provider, so anything it signs it
/// also verifies.
pub fn test_signer() -> CanonicalSigner {
    CanonicalSigner::new(
        Some(&KeyMaterial::RawBase64(TestKeys::PRIVATE_KEY_BASE64.to_string())),
        Some(&KeyMaterial::RawBase64(TestKeys::PUBLIC_KEY_BASE64.to_string())),
        SignDigest::Sha1,
    )
    .expect("test key pair parses")
}

/// Merchant `appkey`/`seller_id` with the test key pair and no callback URLs.
pub fn test_merchant_config() -> MerchantConfig {
    MerchantConfig::new("appkey", "seller_id")
        .with_private_key(KeyMaterial::RawBase64(TestKeys::PRIVATE_KEY_BASE64.to_string()))
        .with_public_key(KeyMaterial::RawBase64(TestKeys::PUBLIC_KEY_BASE64.to_string()))
}

/// A client for [`test_merchant_config`] against the production base URI.
pub fn test_client() -> WeiboPay {
    WeiboPay::new(test_merchant_config()).expect("test client builds")
}

/// A client for [`test_merchant_config`] against `base_uri` (e.g. a mock server).
pub fn test_client_for(base_uri: &str) -> WeiboPay {
    WeiboPay::new(test_merchant_config().with_base_uri(base_uri).with_timeout(2))
        .expect("test client builds")
}

/// Fields signed with the test key, as the provider would send them.
pub fn signed_notification<K, V, I>(fields: I) -> FieldMap
where
    K: Into<String>,
    V: Into<FieldValue>,
    I: IntoIterator<Item = (K, V)>,
{
    test_signer()
        .sign_payload(fields.into_iter().collect())
        .expect("test key signs")
        .into_fields()
}
