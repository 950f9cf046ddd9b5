//! Canonicalize, sign and verify commands

use std::path::Path;

use anyhow::{bail, Context, Result};
use weibopay_lib::signing::canonical_string;
use weibopay_lib::{InboundRequest, WeiboPayError};

use crate::ui::{self, Tone};

pub fn canonical(args: &[String], form: Option<&str>) -> Result<()> {
    let fields = super::parse_fields(args, form)?;
    println!("{}", canonical_string(&fields));
    Ok(())
}

#[tracing::instrument(skip(config_path, args))]
pub fn sign(
    config_path: &Path,
    args: &[String],
    form: Option<&str>,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let fields = super::parse_fields(args, form)?;
    if fields.is_empty() {
        bail!("Nothing to sign");
    }

    let client = super::load_client(config_path)?;
    if !client.signer().has_private_key() {
        bail!("No merchant private key configured. Run `weibopay init --private-key <key>`.");
    }
    let payload = client
        .signer()
        .sign_payload(fields)
        .context("Failed to sign fields")?;

    if json {
        ui::json(&serde_json::to_value(payload.fields())?);
        return Ok(());
    }

    if verbose {
        ui::field("canonical", &canonical_string(payload.fields()));
        ui::field("digest", client.signer().digest().as_str());
    }
    ui::field("sign", payload.sign());
    ui::field("form", &payload.to_form());
    Ok(())
}

#[tracing::instrument(skip(config_path, form, query))]
pub fn verify(
    config_path: &Path,
    form: Option<&str>,
    query: Option<&str>,
    ack: bool,
    verbose: bool,
) -> Result<()> {
    if form.is_none() && query.is_none() {
        bail!("Pass the notification with --form and/or --query");
    }

    let client = super::load_client(config_path)?;
    if !client.signer().has_public_key() {
        bail!("No provider public key configured. Run `weibopay init --public-key <key>`.");
    }
    let request = InboundRequest::from_parts(form.unwrap_or(""), query.unwrap_or(""));
    if verbose {
        ui::status(Tone::Note, format!("Verifying {} fields", request.source()));
    }

    match client.verify_request(&request) {
        Ok(fields) => {
            if ack {
                print!("{}", client.success());
                return Ok(());
            }
            ui::status(Tone::Done, "Signature verified");
            ui::field_map(&fields);
            Ok(())
        }
        Err(e @ WeiboPayError::InvalidSignature { .. }) => {
            ui::failure(&e);
            bail!("Weibo sign verify failed")
        }
        Err(e) => Err(e).context("Failed to verify notification"),
    }
}
