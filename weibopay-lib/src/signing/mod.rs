//! Canonical-string RSA signing.
//!
//! Outbound payloads and inbound notifications are signed over the same
//! canonical string (see [`canonical_string`]) with RSA PKCS#1 v1.5. The
//! signature travels base64 encoded in the `sign` field, next to
//! `sign_type=rsa`.
//!
//! # Example
//!
//! ```rust,ignore
//! use weibopay_lib::signing::{CanonicalSigner, KeyMaterial, SignDigest};
//!
//! let private = KeyMaterial::detect("/etc/weibo/merchant_private.pem");
//! let public = KeyMaterial::detect("/etc/weibo/weibo_public.pem");
//! let signer = CanonicalSigner::new(Some(&private), Some(&public), SignDigest::Sha1)?;
//!
//! let payload = signer.sign_payload(fields)?;
//! assert!(signer.verify_sign(payload.fields(), None)?);
//! ```

mod canonical;
mod keys;

pub use canonical::{canonical_string, EXCLUDED_KEYS};
pub use keys::{wrap_pem, KeyError, KeyMaterial, KeyResult};

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use sha2::Sha256;

use crate::{FieldMap, Result, WeiboPayError};

/// Value of the `sign_type` field for RSA signatures.
pub const SIGN_TYPE_RSA: &str = "rsa";

/// Digest used under the RSA signature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignDigest {
    /// SHA-1, what the provider's reference signer uses.
    #[default]
    Sha1,
    /// SHA-256.
    Sha256,
}

impl SignDigest {
    /// Lowercase name as used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
        }
    }
}

impl FromStr for SignDigest {
    type Err = WeiboPayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            other => Err(WeiboPayError::config(
                "sign_digest",
                format!("unknown digest '{}', expected sha1 or sha256", other),
            )),
        }
    }
}

impl fmt::Display for SignDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field map carrying `sign_type` and a `sign` produced by [`CanonicalSigner`].
#[derive(Clone, Debug, PartialEq)]
pub struct SignedPayload(FieldMap);

impl SignedPayload {
    /// The signed fields, `sign` included.
    pub fn fields(&self) -> &FieldMap {
        &self.0
    }

    /// The base64 signature.
    pub fn sign(&self) -> &str {
        self.0
            .get("sign")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
    }

    /// Consume into the underlying fields.
    pub fn into_fields(self) -> FieldMap {
        self.0
    }

    /// Form-encoded body, as POSTed to the provider.
    pub fn to_form(&self) -> String {
        self.0.to_form()
    }
}

/// Signs and verifies field maps with the merchant and provider RSA keys.
///
/// Either key may be absent: a client that only verifies notifications
/// needs no private key, and one that only builds payloads needs no public
/// key. Calling the operation whose key is missing is a configuration error.
#[derive(Clone)]
pub struct CanonicalSigner {
    private_key: Option<RsaPrivateKey>,
    public_key: Option<RsaPublicKey>,
    digest: SignDigest,
}

impl CanonicalSigner {
    /// Resolve key material and build a signer.
    pub fn new(
        private_key: Option<&KeyMaterial>,
        public_key: Option<&KeyMaterial>,
        digest: SignDigest,
    ) -> Result<Self> {
        let private_key = private_key
            .map(|material| {
                material
                    .to_private_key()
                    .map_err(|e| WeiboPayError::config("private_key", e.to_string()))
            })
            .transpose()?;
        let public_key = public_key
            .map(|material| {
                material
                    .to_public_key()
                    .map_err(|e| WeiboPayError::config("public_key", e.to_string()))
            })
            .transpose()?;

        Ok(Self::from_keys(private_key, public_key).with_digest(digest))
    }

    /// Build a signer from already parsed keys.
    pub fn from_keys(private_key: Option<RsaPrivateKey>, public_key: Option<RsaPublicKey>) -> Self {
        Self {
            private_key,
            public_key,
            digest: SignDigest::default(),
        }
    }

    /// Use a different digest.
    pub fn with_digest(mut self, digest: SignDigest) -> Self {
        self.digest = digest;
        self
    }

    /// The digest in use.
    pub fn digest(&self) -> SignDigest {
        self.digest
    }

    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    pub fn has_public_key(&self) -> bool {
        self.public_key.is_some()
    }

    /// Sign the canonical string of `fields`, returning base64.
    pub fn generate_sign(&self, fields: &FieldMap) -> Result<String> {
        let key = self
            .private_key
            .as_ref()
            .ok_or_else(|| WeiboPayError::config("private_key", "no merchant private key configured"))?;

        let content = canonical_string(fields);
        tracing::trace!(digest = %self.digest, canonical = %content, "signing canonical string");

        let signature = match self.digest {
            SignDigest::Sha1 => key.sign(Pkcs1v15Sign::new::<Sha1>(), &Sha1::digest(content.as_bytes())),
            SignDigest::Sha256 => {
                key.sign(Pkcs1v15Sign::new::<Sha256>(), &Sha256::digest(content.as_bytes()))
            }
        }
        .map_err(|e| WeiboPayError::Internal(format!("RSA signing failed: {}", e)))?;

        Ok(STANDARD.encode(signature))
    }

    /// Verify `signature` (or the embedded `sign` field) against `fields`.
    ///
    /// A missing signature, one that is not base64, and a mismatch all
    /// return `Ok(false)`.
    pub fn verify_sign(&self, fields: &FieldMap, signature: Option<&str>) -> Result<bool> {
        let key = self
            .public_key
            .as_ref()
            .ok_or_else(|| WeiboPayError::config("public_key", "no provider public key configured"))?;

        let embedded = fields.get_text("sign");
        let Some(signature) = signature.or(embedded.as_deref()) else {
            return Ok(false);
        };
        let Some(signature) = decode_signature(signature) else {
            return Ok(false);
        };

        let content = canonical_string(fields);
        let verified = match self.digest {
            SignDigest::Sha1 => key.verify(
                Pkcs1v15Sign::new::<Sha1>(),
                &Sha1::digest(content.as_bytes()),
                &signature,
            ),
            SignDigest::Sha256 => key.verify(
                Pkcs1v15Sign::new::<Sha256>(),
                &Sha256::digest(content.as_bytes()),
                &signature,
            ),
        };
        Ok(verified.is_ok())
    }

    /// Set `sign_type` (when absent) and `sign` on `fields`.
    pub fn sign_payload(&self, mut fields: FieldMap) -> Result<SignedPayload> {
        if fields.get_text("sign_type").is_none() {
            fields.insert("sign_type", SIGN_TYPE_RSA);
        }
        let sign = self.generate_sign(&fields)?;
        fields.insert("sign", sign);
        Ok(SignedPayload(fields))
    }
}

impl fmt::Debug for CanonicalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanonicalSigner")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("public_key", &self.public_key.is_some())
            .field("digest", &self.digest)
            .finish()
    }
}

/// Decode a transported signature.
///
/// Line breaks are dropped. A space is read back as `+`, since an unescaped
/// `+` in a query string decodes to a space.
fn decode_signature(signature: &str) -> Option<Vec<u8>> {
    let cleaned: String = signature
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n' | '\t'))
        .map(|c| if c == ' ' { '+' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    STANDARD.decode(cleaned).ok()
}
