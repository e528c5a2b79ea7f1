use std::boxed::Box;
use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use serde_json::json;

use storefront_common::confidentiality::AbstractConfidentiality;

use super::resources::{CreateOrder, RazorpaySecret};
use super::{load_secret, verify_hmac_signature, AbstRazorpayContext};
use crate::adapter::processor::AppProcessorErrorReason;
use crate::model::ProductModel;

// Gateway stand-in for local demo and tests, orders never leave the process
// but webhook signatures are checked with the configured secret.
pub(crate) struct MockProcessorRazorpayCtx {
    secret: RazorpaySecret,
}

impl MockProcessorRazorpayCtx {
    pub(crate) fn try_build(
        confidential_path: &str,
        cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
    ) -> Result<Box<dyn AbstRazorpayContext>, AppProcessorErrorReason> {
        let secret = load_secret(confidential_path, cfdntl)?;
        Ok(Box::new(Self { secret }))
    }
}

#[async_trait]
impl AbstRazorpayContext for MockProcessorRazorpayCtx {
    async fn create_order(
        &self,
        product: &ProductModel,
        quantity: u32,
    ) -> Result<Vec<u8>, AppProcessorErrorReason> {
        let req = CreateOrder::try_new(product, quantity)?;
        let now = Local::now();
        let order = json!({
            "id": format!("order_mock{}", now.timestamp_millis()),
            "entity": "order",
            "amount": req.amount,
            "amount_paid": 0,
            "amount_due": req.amount,
            "currency": req.currency,
            "receipt": req.receipt,
            "status": "created",
            "attempts": 0,
            "notes": req.notes,
            "created_at": now.timestamp(),
        });
        serde_json::to_vec(&order)
            .map_err(|e| AppProcessorErrorReason::Remote(500, e.to_string()))
    }

    fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<(), AppProcessorErrorReason> {
        verify_hmac_signature(self.secret.webhook_secret.as_str(), payload, signature)
    }
}
