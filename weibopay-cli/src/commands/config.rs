//! Merchant config commands

use std::path::Path;

use anyhow::{bail, Context, Result};
use weibopay_lib::MerchantConfig;

use crate::ui::{self, Tone};

/// Values for `weibopay init`; missing identity fields are prompted for
#[derive(Debug, Default)]
pub struct InitOptions {
    pub appkey: Option<String>,
    pub seller_id: Option<String>,
    pub private_key: Option<String>,
    pub public_key: Option<String>,
    pub notify_url: Option<String>,
    pub return_url: Option<String>,
    pub base_uri: Option<String>,
    pub force: bool,
}

/// Build a config from init options without prompting
pub fn build_config(appkey: String, seller_id: String, options: &InitOptions) -> MerchantConfig {
    let mut config = MerchantConfig::new(appkey, seller_id);
    if let Some(url) = &options.notify_url {
        config = config.with_notify_url(url);
    }
    if let Some(url) = &options.return_url {
        config = config.with_return_url(url);
    }
    if let Some(key) = &options.private_key {
        config = config.with_private_key(key.as_str());
    }
    if let Some(key) = &options.public_key {
        config = config.with_public_key(key.as_str());
    }
    if let Some(uri) = &options.base_uri {
        config = config.with_base_uri(uri);
    }
    config
}

pub fn init(path: &Path, options: InitOptions, verbose: bool) -> Result<()> {
    ui::header("Weibo Pay Merchant Setup");

    if path.exists() && !options.force {
        bail!(
            "Config {} already exists. Pass --force to overwrite.",
            path.display()
        );
    }

    let appkey = match &options.appkey {
        Some(appkey) => appkey.clone(),
        None => ui::prompt("Merchant appkey")?,
    };
    let seller_id = match &options.seller_id {
        Some(seller_id) => seller_id.clone(),
        None => ui::prompt("Merchant seller_id")?,
    };

    let config = build_config(appkey, seller_id, &options);

    if verbose {
        ui::status(Tone::Note, format!("Writing {}", path.display()));
    }
    config
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    ui::status(Tone::Done, format!("Merchant config saved to {}", path.display()));
    if config.private_key.is_none() {
        ui::status(Tone::Warn, "No private key set: signing commands will fail");
    }
    if config.public_key.is_none() {
        ui::status(Tone::Warn, "No public key set: notifications cannot be verified");
    }
    Ok(())
}

pub fn show(path: &Path, _verbose: bool) -> Result<()> {
    let config = super::load_config(path)?;

    ui::header("Weibo Pay Merchant Config");
    ui::field("Source", &source_label(path));
    ui::field("appkey", &config.appkey);
    ui::field("seller_id", &config.seller_id);
    ui::field("notify_url", or_unset(&config.notify_url));
    ui::field("return_url", or_unset(&config.return_url));
    ui::field(
        "private_key",
        config.private_key.as_ref().map(|k| k.kind()).unwrap_or("(unset)"),
    );
    ui::field(
        "public_key",
        config.public_key.as_ref().map(|k| k.kind()).unwrap_or("(unset)"),
    );
    ui::field("base_uri", &config.http.base_uri);
    ui::field("timeout", &format!("{}s", config.http.timeout_secs));
    ui::field("sign_digest", config.sign_digest.as_str());
    Ok(())
}

fn source_label(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        "environment (WEIBOPAY_*)".to_string()
    }
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(unset)"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weibopay_lib::KeyMaterial;

    #[test]
    fn test_build_config() {
        let options = InitOptions {
            private_key: Some("/keys/private.pem".to_string()),
            notify_url: Some("https://shop.example/notify".to_string()),
            ..Default::default()
        };
        let config = build_config("ak".to_string(), "sid".to_string(), &options);
        assert_eq!(config.notify_url, "https://shop.example/notify");
        assert!(matches!(config.private_key, Some(KeyMaterial::PemFile(_))));
        assert!(config.public_key.is_none());
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merchant.json");
        std::fs::write(&path, "{}").unwrap();

        let options = InitOptions {
            appkey: Some("ak".to_string()),
            seller_id: Some("sid".to_string()),
            ..Default::default()
        };
        assert!(init(&path, options, false).is_err());
    }

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weibopay").join("merchant.json");
        let options = InitOptions {
            appkey: Some("ak".to_string()),
            seller_id: Some("sid".to_string()),
            base_uri: Some("http://127.0.0.1:9/".to_string()),
            ..Default::default()
        };
        init(&path, options, false).unwrap();

        let config = MerchantConfig::load(&path).unwrap();
        assert_eq!(config.seller_id, "sid");
        assert_eq!(config.http.base_uri, "http://127.0.0.1:9/");
    }
}
