//! Commands that talk to the provider API

use std::path::Path;

use anyhow::Result;
use weibopay_lib::{PayResponse, WeiboPayError};

use crate::ui::{self, Tone};

#[tracing::instrument(skip(config_path, args))]
pub async fn pay(config_path: &Path, gateway: &str, args: &[String], qr: bool, verbose: bool) -> Result<()> {
    let fields = super::parse_fields(args, None)?;
    let client = super::load_client(config_path)?;

    if verbose {
        ui::status(Tone::Note, format!("Paying through '{}' with {} fields", gateway, fields.len()));
    }

    let spinner = ui::pending("Contacting Weibo Pay...");
    let result = client.pay(gateway, fields).await;
    spinner.finish_and_clear();

    match result.map_err(explain)? {
        PayResponse::Redirect(url) => {
            ui::status(Tone::Done, "Checkout URL");
            ui::checkout(&url, qr)?;
        }
        PayResponse::Completed(response) => {
            ui::status(Tone::Done, "Accepted by Weibo Pay");
            ui::response(&response);
        }
    }
    Ok(())
}

#[tracing::instrument(skip(config_path, args))]
pub async fn find(config_path: &Path, args: &[String], gateway: &str, verbose: bool) -> Result<()> {
    let order = super::parse_order(args)?;
    let client = super::load_client(config_path)?;

    if verbose {
        ui::status(Tone::Note, format!("Looking up {:?} through '{}'", order, gateway));
    }

    let spinner = ui::pending("Querying Weibo Pay...");
    let result = client.find(order, gateway).await;
    spinner.finish_and_clear();

    ui::response(&result.map_err(explain)?);
    Ok(())
}

#[tracing::instrument(skip(config_path, args))]
pub async fn refund(config_path: &Path, args: &[String], verbose: bool) -> Result<()> {
    let order = super::parse_fields(args, None)?;
    let client = super::load_client(config_path)?;

    if verbose {
        ui::status(Tone::Note, "Applying for refund");
    }

    let spinner = ui::pending("Submitting refund...");
    let result = client.refund(&order).await;
    spinner.finish_and_clear();

    let response = result.map_err(explain)?;
    ui::status(Tone::Done, "Refund accepted");
    ui::response(&response);
    Ok(())
}

/// Show the failure in full before handing the error to anyhow
fn explain(err: WeiboPayError) -> anyhow::Error {
    ui::failure(&err);
    anyhow::Error::new(err).context("Weibo Pay request failed")
}
