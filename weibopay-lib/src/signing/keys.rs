//! RSA key material resolution.
//!
//! Merchants hand over keys in three shapes: PEM text, a path to a `.pem`
//! file, or the bare base64 body of a DER key with the PEM framing stripped
//! (the form the merchant console displays). Bare bodies are wrapped into a
//! PEM envelope with 64-character lines before parsing.

use std::path::{Path, PathBuf};

use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};

const PEM_LINE_WIDTH: usize = 64;

/// Key parsing errors.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("failed to read key file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("key material is empty")]
    Empty,
    #[error("raw key is not valid base64")]
    NotBase64,
    #[error("unrecognized {kind} key encoding")]
    Unrecognized { kind: &'static str },
}

/// Result type for key operations.
pub type KeyResult<T> = std::result::Result<T, KeyError>;

/// Where RSA key material comes from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum KeyMaterial {
    /// PEM text, PKCS#1 or PKCS#8/SPKI.
    Pem(String),
    /// Path to a PEM file.
    PemFile(PathBuf),
    /// Base64 DER body without PEM framing.
    RawBase64(String),
}

impl KeyMaterial {
    /// Classify a plain configuration string.
    ///
    /// - ends with `.pem` → [`KeyMaterial::PemFile`] (a `file://` prefix is stripped)
    /// - contains `-----BEGIN` → [`KeyMaterial::Pem`]
    /// - anything else → [`KeyMaterial::RawBase64`]
    pub fn detect(input: impl Into<String>) -> Self {
        let input = input.into();
        let trimmed = input.trim();
        if trimmed.ends_with(".pem") {
            let path = trimmed.strip_prefix("file://").unwrap_or(trimmed);
            Self::PemFile(PathBuf::from(path))
        } else if trimmed.contains("-----BEGIN") {
            Self::Pem(input)
        } else {
            Self::RawBase64(input)
        }
    }

    /// Short label for logs; never includes key bytes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pem(_) => "pem",
            Self::PemFile(_) => "pem_file",
            Self::RawBase64(_) => "raw_base64",
        }
    }

    /// Parse as an RSA private key.
    pub fn to_private_key(&self) -> KeyResult<RsaPrivateKey> {
        match self {
            Self::Pem(text) => parse_private_pem(text),
            Self::PemFile(path) => parse_private_pem(&read_pem_file(path)?),
            Self::RawBase64(body) => {
                let pkcs1 = wrap_pem("RSA PRIVATE KEY", body)?;
                RsaPrivateKey::from_pkcs1_pem(&pkcs1).or_else(|_| {
                    let pkcs8 = wrap_pem("PRIVATE KEY", body)?;
                    RsaPrivateKey::from_pkcs8_pem(&pkcs8)
                        .map_err(|_| KeyError::Unrecognized { kind: "private" })
                })
            }
        }
    }

    /// Parse as an RSA public key.
    pub fn to_public_key(&self) -> KeyResult<RsaPublicKey> {
        match self {
            Self::Pem(text) => parse_public_pem(text),
            Self::PemFile(path) => parse_public_pem(&read_pem_file(path)?),
            Self::RawBase64(body) => {
                let spki = wrap_pem("PUBLIC KEY", body)?;
                RsaPublicKey::from_public_key_pem(&spki).or_else(|_| {
                    let pkcs1 = wrap_pem("RSA PUBLIC KEY", body)?;
                    RsaPublicKey::from_pkcs1_pem(&pkcs1)
                        .map_err(|_| KeyError::Unrecognized { kind: "public" })
                })
            }
        }
    }
}

impl From<&str> for KeyMaterial {
    fn from(s: &str) -> Self {
        Self::detect(s)
    }
}

impl From<String> for KeyMaterial {
    fn from(s: String) -> Self {
        Self::detect(s)
    }
}

/// Wrap a bare base64 body into a PEM envelope.
pub fn wrap_pem(label: &str, body: &str) -> KeyResult<String> {
    let body: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    if body.is_empty() {
        return Err(KeyError::Empty);
    }
    if !body
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
    {
        return Err(KeyError::NotBase64);
    }

    let mut pem = format!("-----BEGIN {}-----\n", label);
    // base64 is ASCII, so byte chunks are valid char boundaries
    for line in body.as_bytes().chunks(PEM_LINE_WIDTH) {
        pem.push_str(std::str::from_utf8(line).map_err(|_| KeyError::NotBase64)?);
        pem.push('\n');
    }
    pem.push_str(&format!("-----END {}-----", label));
    Ok(pem)
}

fn read_pem_file(path: &Path) -> KeyResult<String> {
    std::fs::read_to_string(path).map_err(|source| KeyError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_private_pem(text: &str) -> KeyResult<RsaPrivateKey> {
    let text = text.trim();
    if text.is_empty() {
        return Err(KeyError::Empty);
    }
    RsaPrivateKey::from_pkcs1_pem(text)
        .or_else(|_| RsaPrivateKey::from_pkcs8_pem(text))
        .map_err(|_| KeyError::Unrecognized { kind: "private" })
}

fn parse_public_pem(text: &str) -> KeyResult<RsaPublicKey> {
    let text = text.trim();
    if text.is_empty() {
        return Err(KeyError::Empty);
    }
    RsaPublicKey::from_public_key_pem(text)
        .or_else(|_| RsaPublicKey::from_pkcs1_pem(text))
        .map_err(|_| KeyError::Unrecognized { kind: "public" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestKeys;

    #[test]
    fn test_detect() {
        assert_eq!(
            KeyMaterial::detect("/etc/weibo/private.pem"),
            KeyMaterial::PemFile(PathBuf::from("/etc/weibo/private.pem"))
        );
        assert_eq!(
            KeyMaterial::detect("file:///etc/weibo/private.pem"),
            KeyMaterial::PemFile(PathBuf::from("/etc/weibo/private.pem"))
        );
        assert_eq!(KeyMaterial::detect("MIIBIjANBg").kind(), "raw_base64");
        assert_eq!(
            KeyMaterial::detect("-----BEGIN PUBLIC KEY-----\nMIIB\n-----END PUBLIC KEY-----").kind(),
            "pem"
        );
    }

    #[test]
    fn test_wrap_pem_line_width() {
        let body = "A".repeat(130);
        let pem = wrap_pem("PUBLIC KEY", &body).unwrap();
        let lines: Vec<_> = pem.lines().collect();
        assert_eq!(lines[0], "-----BEGIN PUBLIC KEY-----");
        assert_eq!(lines[1].len(), 64);
        assert_eq!(lines[2].len(), 64);
        assert_eq!(lines[3].len(), 2);
        assert_eq!(lines[4], "-----END PUBLIC KEY-----");
    }

    #[test]
    fn test_wrap_pem_rejects_garbage() {
        assert!(matches!(wrap_pem("PUBLIC KEY", "  \n"), Err(KeyError::Empty)));
        assert!(matches!(
            wrap_pem("PUBLIC KEY", "not-base64!"),
            Err(KeyError::NotBase64)
        ));
    }

    #[test]
    fn test_raw_and_pem_inputs_resolve_to_same_key() {
        let raw = KeyMaterial::RawBase64(TestKeys::PRIVATE_KEY_BASE64.to_string());
        let pem = KeyMaterial::Pem(TestKeys::PRIVATE_KEY_PEM.to_string());
        let pkcs8 = KeyMaterial::Pem(TestKeys::PRIVATE_KEY_PKCS8_PEM.to_string());

        let a = raw.to_private_key().unwrap();
        assert_eq!(a, pem.to_private_key().unwrap());
        assert_eq!(a, pkcs8.to_private_key().unwrap());

        let spki = KeyMaterial::RawBase64(TestKeys::PUBLIC_KEY_BASE64.to_string());
        let pkcs1 = KeyMaterial::Pem(TestKeys::PUBLIC_KEY_PKCS1_PEM.to_string());
        assert_eq!(spki.to_public_key().unwrap(), pkcs1.to_public_key().unwrap());
        assert_eq!(a.to_public_key(), spki.to_public_key().unwrap());
    }

    #[test]
    fn test_pem_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merchant_public.pem");
        std::fs::write(&path, TestKeys::PUBLIC_KEY_PEM).unwrap();

        let material = KeyMaterial::detect(path.to_string_lossy().to_string());
        assert_eq!(material.kind(), "pem_file");
        assert!(material.to_public_key().is_ok());

        let missing = KeyMaterial::PemFile(dir.path().join("missing.pem"));
        assert!(matches!(missing.to_public_key(), Err(KeyError::Io { .. })));
    }

    #[test]
    fn test_public_key_is_not_a_private_key() {
        let material = KeyMaterial::RawBase64(TestKeys::PUBLIC_KEY_BASE64.to_string());
        assert!(matches!(
            material.to_private_key(),
            Err(KeyError::Unrecognized { kind: "private" })
        ));
    }

    #[test]
    fn test_serde_tagged_form() {
        let material: KeyMaterial =
            serde_json::from_str(r#"{"kind":"pem_file","value":"/keys/pub.pem"}"#).unwrap();
        assert_eq!(material, KeyMaterial::PemFile(PathBuf::from("/keys/pub.pem")));
    }
}
