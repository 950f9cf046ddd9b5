//! Live provider tests.
//!
//! Opt-in only: they need real merchant credentials in `WEIBOPAY_*`
//! variables and an existing order id.
//!
//! ```bash
//! export WEIBOPAY_LIVE_OUT_PAY_ID=...
//! cargo test -p weibopay-lib --features live-tests --test live_gateway -- --ignored
//! ```

#![cfg(feature = "live-tests")]

use weibopay_lib::{MerchantConfig, WeiboPay, WeiboPayError};

#[tokio::test]
#[ignore]
async fn test_live_find_order() {
    let config = MerchantConfig::from_env().expect("WEIBOPAY_* variables set");
    let out_pay_id = std::env::var("WEIBOPAY_LIVE_OUT_PAY_ID").expect("WEIBOPAY_LIVE_OUT_PAY_ID set");
    let client = WeiboPay::new(config).unwrap();

    match client.find_order(out_pay_id.as_str()).await {
        Ok(response) => println!("order: {:?}", response.data()),
        // a well-formed rejection still proves signing and transport work
        Err(WeiboPayError::BusinessFailure { code, message, .. }) => {
            println!("provider rejected lookup: {:?} {}", code, message)
        }
        Err(e) => panic!("transport or config failure: {}", e),
    }
}
