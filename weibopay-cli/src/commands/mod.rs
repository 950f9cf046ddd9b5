//! CLI command implementations

pub mod config;
pub mod gateway;
pub mod signing;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use weibopay_lib::{FieldMap, MerchantConfig, OrderRef, WeiboPay};

/// Default merchant config location
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("weibopay")
        .join("merchant.json")
}

/// Load the merchant config from `path`, falling back to `WEIBOPAY_*` variables
pub fn load_config(path: &Path) -> Result<MerchantConfig> {
    if path.exists() {
        tracing::debug!("Loading merchant config from {}", path.display());
        return MerchantConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()));
    }

    tracing::debug!("No config at {}, reading environment", path.display());
    MerchantConfig::from_env().with_context(|| {
        format!(
            "No config at {} and WEIBOPAY_* variables incomplete. Run 'weibopay init' first.",
            path.display()
        )
    })
}

/// Build a client from the merchant config
pub fn load_client(path: &Path) -> Result<WeiboPay> {
    let config = load_config(path)?;
    WeiboPay::new(config).context("Failed to initialize Weibo Pay client")
}

/// Parse `key=value` arguments, or a form-encoded string when given
pub fn parse_fields(args: &[String], form: Option<&str>) -> Result<FieldMap> {
    if let Some(form) = form {
        if !args.is_empty() {
            bail!("Pass fields either as key=value arguments or with --form, not both");
        }
        return Ok(FieldMap::from_form(form));
    }

    let mut fields = FieldMap::new();
    for arg in args {
        let Some((key, value)) = arg.split_once('=') else {
            bail!("Expected key=value, got '{}'", arg);
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("Empty field name in '{}'", arg);
        }
        fields.insert(key, value);
    }
    Ok(fields)
}

/// A single bare argument is an order id; anything else is key=value fields
pub fn parse_order(args: &[String]) -> Result<OrderRef> {
    match args {
        [] => bail!("Missing order id or key=value fields"),
        [single] if !single.contains('=') => Ok(OrderRef::from(single.as_str())),
        _ => Ok(OrderRef::from(parse_fields(args, None)?)),
    }
}
