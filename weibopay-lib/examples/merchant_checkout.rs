//! Merchant Checkout Example
//!
//! Walks one order through the merchant side of Weibo Pay:
//! - build the web cashier URL for the payer
//! - verify the asynchronous notification the provider sends back
//! - answer it with the acknowledgment body
//!
//! The fixture key pair plays both merchant and provider, so the example
//! runs offline.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p weibopay-lib --example merchant_checkout
//! ```

use weibopay_lib::{
    FieldMap, InboundRequest, KeyMaterial, MerchantConfig, PayResponse, WeiboPay,
};

const PRIVATE_KEY_BASE64: &str = include_str!("../fixtures/merchant_private_key.b64");
const PUBLIC_KEY_BASE64: &str = include_str!("../fixtures/merchant_public_key.b64");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Weibo Pay Merchant Checkout ===\n");

    let config = MerchantConfig::new("demo_appkey", "demo_seller")
        .with_notify_url("https://shop.example/weibo/notify")
        .with_return_url("https://shop.example/orders/1001")
        .with_private_key(KeyMaterial::RawBase64(PRIVATE_KEY_BASE64.to_string()))
        .with_public_key(KeyMaterial::RawBase64(PUBLIC_KEY_BASE64.to_string()));
    let client = WeiboPay::new(config)?;

    // 1. Checkout
    let order = FieldMap::new()
        .with("out_pay_id", "1001")
        .with("total_amount", 9900)
        .with("subject", "Annual membership");

    if let PayResponse::Redirect(url) = client.web(order).await? {
        println!("Send the payer to:\n  {}\n", url);
    }

    // 2. Notification (signed here with the same key the provider would use)
    let notification = client
        .signer()
        .sign_payload(
            FieldMap::new()
                .with("out_pay_id", "1001")
                .with("pay_id", "WB-889900")
                .with("status", "PAY_SUCCESS")
                .with("total_amount", 9900),
        )?
        .to_form();
    println!("Provider POSTs:\n  {}\n", notification);

    // 3. Verify and acknowledge
    let request = InboundRequest::from_parts(&notification, "");
    match client.verify_request(&request) {
        Ok(fields) => {
            println!(
                "Verified: order {} is {}",
                fields.get_text("out_pay_id").unwrap_or_default(),
                fields.get_text("status").unwrap_or_default()
            );
            println!("Respond with: {}", client.success());
        }
        Err(e) => println!("Rejected: {}", e),
    }

    // 4. Cancelling is not something the provider offers
    if let Err(e) = client.cancel("1001") {
        println!("\nCancel: {}", e);
    }

    Ok(())
}
