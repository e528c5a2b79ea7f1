use super::ProductModel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LowStockAlertModel {
    pub sender: String,
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl LowStockAlertModel {
    pub fn compose(product: &ProductModel, sender: &str, recipients: &[String]) -> Self {
        let subject = format!("URGENT: Low Stock Alert - {}", product.title);
        let body = format!(
            "Stock Low for {}!\n\nCurrent Quantity: {}\nRestock immediately from the Admin Dashboard.",
            product.title, product.quantity
        );
        Self {
            sender: sender.to_string(),
            recipients: recipients.to_vec(),
            subject,
            body,
        }
    }
}
