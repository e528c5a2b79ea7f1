use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::model::{ProductModel, ProductModelError, SaleEventModel};

pub(super) const CURRENCY_INR: &str = "INR";

#[derive(Deserialize)]
pub(super) struct RazorpaySecret {
    pub key_id: String,
    pub key_secret: String,
    pub webhook_secret: String,
}

// the gateway stores note values as strings
#[derive(Serialize, Deserialize)]
pub(super) struct OrderNotes {
    pub product_id: String,
    pub quantity: String,
}

#[derive(Serialize)]
pub(super) struct CreateOrder {
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub notes: OrderNotes,
}

#[derive(Deserialize)]
pub(super) struct ErrorDetail {
    pub code: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct ErrorResponse {
    pub error: ErrorDetail,
}

impl From<&SaleEventModel> for OrderNotes {
    fn from(value: &SaleEventModel) -> Self {
        Self {
            product_id: value.product_id.to_string(),
            quantity: value.quantity.to_string(),
        }
    }
}

impl CreateOrder {
    pub(super) fn try_new(product: &ProductModel, quantity: u32) -> Result<Self, ProductModelError> {
        let amount = product.pay_amount_minor(quantity)?;
        let sale = SaleEventModel::new(product.id, quantity);
        let receipt = format!("txn_{}", Local::now().timestamp_millis());
        Ok(Self {
            amount,
            currency: CURRENCY_INR.to_string(),
            receipt,
            notes: OrderNotes::from(&sale),
        })
    }
}

impl ErrorResponse {
    pub(super) fn into_message(self) -> String {
        let ErrorDetail { code, description } = self.error;
        description
            .or(code)
            .unwrap_or_else(|| "unknown-gateway-error".to_string())
    }
}
