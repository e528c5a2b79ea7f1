use rust_decimal::Decimal;

use storefront::model::{LowStockAlertModel, ProductModel};

#[test]
fn compose_low_stock_alert() {
    let product = ProductModel {
        id: 3,
        title: "Mechanical Keyboard".to_string(),
        description: String::new(),
        price: Decimal::new(459900, 2),
        image: String::new(),
        quantity: 2,
    };
    let recipients = vec!["admin@nexusstock.com".to_string()];
    let msg = LowStockAlertModel::compose(&product, "alert@nexusstock.com", &recipients);
    assert_eq!(msg.sender.as_str(), "alert@nexusstock.com");
    assert_eq!(msg.recipients, recipients);
    assert_eq!(
        msg.subject.as_str(),
        "URGENT: Low Stock Alert - Mechanical Keyboard"
    );
    assert!(msg.body.starts_with("Stock Low for Mechanical Keyboard!"));
    assert!(msg.body.contains("Current Quantity: 2"));
}
