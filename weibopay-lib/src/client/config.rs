//! Merchant configuration.
//!
//! # Environment Variables
//!
//! [`MerchantConfig::from_env`] reads:
//!
//! - `WEIBOPAY_APPKEY` - merchant application key (required)
//! - `WEIBOPAY_SELLER_ID` - merchant seller id (required)
//! - `WEIBOPAY_NOTIFY_URL` - asynchronous notification URL
//! - `WEIBOPAY_RETURN_URL` - browser return URL after checkout
//! - `WEIBOPAY_PRIVATE_KEY` - merchant private key: PEM text, a `.pem` path or a bare base64 body
//! - `WEIBOPAY_PUBLIC_KEY` - provider public key, same forms
//! - `WEIBOPAY_BASE_URI` - API base URI (defaults to the production endpoint)
//! - `WEIBOPAY_TIMEOUT_SECS` - request timeout in seconds
//! - `WEIBOPAY_SIGN_DIGEST` - `sha1` (default) or `sha256`
//!
//! # Example
//!
//! ```rust,ignore
//! use weibopay_lib::{MerchantConfig, WeiboPay};
//!
//! let config = MerchantConfig::new("appkey", "seller_id")
//!     .with_notify_url("https://shop.example/weibo/notify")
//!     .with_private_key("/etc/weibo/merchant_private.pem")
//!     .with_public_key("/etc/weibo/weibo_public.pem");
//! let client = WeiboPay::new(config)?;
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::signing::{KeyMaterial, SignDigest};
use crate::{Result, WeiboPayError};

/// Production API base URI.
pub const DEFAULT_BASE_URI: &str = "https://pay.sc.weibo.com/api/merchant/";

/// HTTP transport settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpOptions {
    /// API base URI; endpoints are resolved relative to it.
    #[serde(default = "default_base_uri")]
    pub base_uri: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_uri() -> String {
    DEFAULT_BASE_URI.to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            base_uri: default_base_uri(),
            timeout_secs: default_timeout(),
        }
    }
}

impl HttpOptions {
    /// The base URI as a URL, always ending in `/`.
    pub fn base_url(&self) -> Result<Url> {
        let mut base = self.base_uri.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let url = Url::parse(&base)
            .map_err(|e| WeiboPayError::config("base_uri", format!("invalid URL '{}': {}", base, e)))?;
        if url.cannot_be_a_base() {
            return Err(WeiboPayError::config("base_uri", format!("'{}' cannot be a base URL", base)));
        }
        Ok(url)
    }
}

/// Merchant credentials and settings.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantConfig {
    pub appkey: String,
    pub seller_id: String,

    #[serde(default)]
    pub notify_url: String,

    #[serde(default)]
    pub return_url: String,

    /// Merchant private key; required for anything that signs.
    #[serde(default, deserialize_with = "deserialize_key_material")]
    pub private_key: Option<KeyMaterial>,

    /// Provider public key; required for verifying notifications.
    #[serde(default, deserialize_with = "deserialize_key_material")]
    pub public_key: Option<KeyMaterial>,

    #[serde(default)]
    pub http: HttpOptions,

    #[serde(default)]
    pub sign_digest: SignDigest,
}

/// Keys may be written as a plain string (auto-detected) or in tagged form.
#[derive(Deserialize)]
#[serde(untagged)]
enum KeyMaterialRepr {
    Plain(String),
    Tagged(KeyMaterial),
}

fn deserialize_key_material<'de, D>(deserializer: D) -> std::result::Result<Option<KeyMaterial>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<KeyMaterialRepr>::deserialize(deserializer)?.map(|repr| match repr {
            KeyMaterialRepr::Plain(text) => KeyMaterial::detect(text),
            KeyMaterialRepr::Tagged(material) => material,
        }),
    )
}

impl MerchantConfig {
    /// Create a configuration with the given merchant identity.
    pub fn new(appkey: impl Into<String>, seller_id: impl Into<String>) -> Self {
        Self {
            appkey: appkey.into(),
            seller_id: seller_id.into(),
            notify_url: String::new(),
            return_url: String::new(),
            private_key: None,
            public_key: None,
            http: HttpOptions::default(),
            sign_digest: SignDigest::default(),
        }
    }

    pub fn with_notify_url(mut self, url: impl Into<String>) -> Self {
        self.notify_url = url.into();
        self
    }

    pub fn with_return_url(mut self, url: impl Into<String>) -> Self {
        self.return_url = url.into();
        self
    }

    /// Set the merchant private key (PEM text, `.pem` path or bare base64).
    pub fn with_private_key(mut self, key: impl Into<KeyMaterial>) -> Self {
        self.private_key = Some(key.into());
        self
    }

    /// Set the provider public key (PEM text, `.pem` path or bare base64).
    pub fn with_public_key(mut self, key: impl Into<KeyMaterial>) -> Self {
        self.public_key = Some(key.into());
        self
    }

    pub fn with_base_uri(mut self, uri: impl Into<String>) -> Self {
        self.http.base_uri = uri.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.http.timeout_secs = secs;
        self
    }

    pub fn with_sign_digest(mut self, digest: SignDigest) -> Self {
        self.sign_digest = digest;
        self
    }

    /// Load configuration from `WEIBOPAY_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &str, field: &str| {
            var(name).ok_or_else(|| WeiboPayError::config(field, format!("{} is not set", name)))
        };

        let mut config = Self::new(
            required("WEIBOPAY_APPKEY", "appkey")?,
            required("WEIBOPAY_SELLER_ID", "seller_id")?,
        );

        if let Some(url) = var("WEIBOPAY_NOTIFY_URL") {
            config = config.with_notify_url(url);
        }
        if let Some(url) = var("WEIBOPAY_RETURN_URL") {
            config = config.with_return_url(url);
        }
        if let Some(key) = var("WEIBOPAY_PRIVATE_KEY") {
            config = config.with_private_key(key);
        }
        if let Some(key) = var("WEIBOPAY_PUBLIC_KEY") {
            config = config.with_public_key(key);
        }
        if let Some(uri) = var("WEIBOPAY_BASE_URI") {
            config = config.with_base_uri(uri);
        }
        if let Some(timeout) = var("WEIBOPAY_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.trim().parse::<u64>() {
                config = config.with_timeout(secs);
            }
        }
        if let Some(digest) = var("WEIBOPAY_SIGN_DIGEST") {
            config = config.with_sign_digest(digest.parse()?);
        }

        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            WeiboPayError::config("config", format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            WeiboPayError::config("config", format!("invalid {}: {}", path.display(), e))
        })
    }

    /// Write configuration as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                WeiboPayError::config("config", format!("cannot create {}: {}", parent.display(), e))
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| {
            WeiboPayError::config("config", format!("cannot write {}: {}", path.display(), e))
        })
    }
}

impl fmt::Debug for MerchantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerchantConfig")
            .field("appkey", &self.appkey)
            .field("seller_id", &self.seller_id)
            .field("notify_url", &self.notify_url)
            .field("return_url", &self.return_url)
            .field("private_key", &self.private_key.as_ref().map(KeyMaterial::kind))
            .field("public_key", &self.public_key.as_ref().map(KeyMaterial::kind))
            .field("http", &self.http)
            .field("sign_digest", &self.sign_digest)
            .finish()
    }
}
