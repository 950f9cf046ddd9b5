//! Rendering of library values: field maps, provider answers and failures

use colored::Colorize;
use serde_json::Value;
use weibopay_lib::{ApiResponse, FieldMap, FieldValue, WeiboPayError};

use super::{field, status, Tone};

/// Pretty JSON on stdout
pub fn json(value: &Value) {
    if let Ok(pretty) = serde_json::to_string_pretty(value) {
        println!("{}", pretty);
    }
}

/// Every field of a map, in signing order; `Null` shows as `(null)`
pub fn field_map(fields: &FieldMap) {
    for (key, value) in fields {
        match value {
            FieldValue::Null => field(key, "(null)"),
            v if !v.is_present() => field(key, "(empty)"),
            v => field(key, &v.to_string()),
        }
    }
}

/// A successful provider answer: `code`/`msg` on stderr, the body as JSON on stdout
pub fn response(response: &ApiResponse) {
    if let Some(msg) = response.get_str("msg") {
        let code = response.get_str("code").unwrap_or_default();
        status(Tone::Note, format!("{} {}", code.dimmed(), msg));
    }
    json(&Value::Object(response.as_map().clone()));
}

/// The checkout URL on stdout, optionally followed by a QR code
pub fn checkout(url: &str, qr: bool) -> anyhow::Result<()> {
    println!("{}", url);
    if qr {
        status(Tone::Note, "Scan to pay:");
        println!("\n{}\n", qr_text(url)?);
    }
    Ok(())
}

/// Describe a library error on stderr before it is handed to anyhow
pub fn failure(err: &WeiboPayError) {
    match err {
        WeiboPayError::BusinessFailure {
            endpoint,
            code,
            message,
            raw,
        } => {
            status(
                Tone::Fail,
                format!(
                    "Weibo Pay rejected {} (code {}): {}",
                    endpoint,
                    code.as_deref().unwrap_or("none"),
                    message
                ),
            );
            eprintln!("{}", "─".repeat(60).dimmed());
            if let Ok(pretty) = serde_json::to_string_pretty(raw) {
                eprintln!("{}", pretty);
            }
        }
        WeiboPayError::InvalidSignature { fields } => {
            status(Tone::Fail, "Signature verification failed");
            status(
                Tone::Note,
                format!("canonical: {}", weibopay_lib::signing::canonical_string(fields)),
            );
        }
        e if e.is_retryable() => status(Tone::Warn, "Transport failure; the call may be retried"),
        e if e.is_transport() => status(Tone::Fail, "Weibo Pay answered with something unusable"),
        _ => {}
    }
}

fn qr_text(data: &str) -> anyhow::Result<String> {
    let code = qrcode::QrCode::new(data)?;
    Ok(code
        .render::<char>()
        .quiet_zone(false)
        .module_dimensions(2, 1)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qr_text_renders_checkout_url() {
        let text = qr_text("https://pay.sc.weibo.com/api/merchant/pay/cashier&sign=abc").unwrap();
        assert!(text.lines().count() > 10);
    }
}
