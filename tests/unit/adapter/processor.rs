use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value as JsnVal;

use storefront::adapter::processor::{AppProcessorErrorReason, AppProcessorFnLabel};
use storefront::model::{ProductModel, ProductModelError};

use crate::{ut_setup_sharestate, ut_sign_webhook, UT_WEBHOOK_SECRET};

fn ut_product(price: &str) -> ProductModel {
    ProductModel {
        id: 31,
        title: "Bluetooth Speaker".to_string(),
        description: String::new(),
        price: Decimal::from_str(price).unwrap(),
        image: String::new(),
        quantity: 10,
    }
}

#[actix_web::test]
async fn mock_create_order_ok() {
    let shr_state = ut_setup_sharestate();
    let proc = shr_state.processor_context();
    let result = proc.create_order(&ut_product("100.00"), 2).await;
    assert!(result.is_ok());
    let raw = result.unwrap().raw;
    let order = serde_json::from_slice::<JsnVal>(&raw).unwrap();
    assert_eq!(order["amount"].as_i64(), Some(20000));
    assert_eq!(order["currency"].as_str(), Some("INR"));
    assert_eq!(order["status"].as_str(), Some("created"));
    assert!(order["id"].as_str().unwrap().starts_with("order_"));
    assert!(order["receipt"].as_str().unwrap().starts_with("txn_"));
    assert_eq!(order["notes"]["product_id"].as_str(), Some("31"));
    assert_eq!(order["notes"]["quantity"].as_str(), Some("2"));
}

#[actix_web::test]
async fn mock_create_order_invalid_amount() {
    let shr_state = ut_setup_sharestate();
    let proc = shr_state.processor_context();
    let result = proc.create_order(&ut_product("100.00"), 0).await;
    let e = result.unwrap_err();
    assert!(matches!(e.fn_label, AppProcessorFnLabel::CreateOrder));
    assert!(matches!(
        e.reason,
        AppProcessorErrorReason::InvalidOrder(ProductModelError::ZeroQuantity)
    ));
}

#[actix_web::test]
async fn verify_webhook_signature() {
    let shr_state = ut_setup_sharestate();
    let proc = shr_state.processor_context();
    let payload = br#"{"event":"order.paid","payload":{}}"#;
    let sig = ut_sign_webhook(UT_WEBHOOK_SECRET, payload);
    assert!(proc.verify_webhook(payload, sig.as_str()).is_ok());
    // surrounding whitespace from header value
    let padded = format!(" {sig} ");
    assert!(proc.verify_webhook(payload, padded.as_str()).is_ok());

    let tampered = br#"{"event":"order.paid","payload":{"x":1}}"#;
    let e = proc.verify_webhook(tampered, sig.as_str()).unwrap_err();
    assert!(matches!(e.reason, AppProcessorErrorReason::SignatureMismatch));
    assert!(matches!(e.fn_label, AppProcessorFnLabel::VerifyWebhook));

    let wrong_key = ut_sign_webhook("another-secret", payload);
    let e = proc.verify_webhook(payload, wrong_key.as_str()).unwrap_err();
    assert!(matches!(e.reason, AppProcessorErrorReason::SignatureMismatch));

    let e = proc.verify_webhook(payload, "not-a-hex-string").unwrap_err();
    assert!(matches!(
        e.reason,
        AppProcessorErrorReason::SignatureEncoding(_)
    ));
}

#[test]
fn client_message_from_error() {
    use storefront::adapter::processor::AppProcessorError;
    let e = AppProcessorError {
        reason: AppProcessorErrorReason::Remote(
            400,
            "The amount must be atleast INR 1.00".to_string(),
        ),
        fn_label: AppProcessorFnLabel::CreateOrder,
    };
    assert_eq!(
        e.client_message().as_str(),
        "The amount must be atleast INR 1.00"
    );
    let e = AppProcessorError {
        reason: AppProcessorErrorReason::MissingCredential,
        fn_label: AppProcessorFnLabel::CreateOrder,
    };
    assert_eq!(e.client_message().as_str(), "payment gateway failure");
}
