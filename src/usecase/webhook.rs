use std::boxed::Box;
use std::sync::Arc;

use storefront_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use super::inventory::{ProcessSaleUseCase, SaleProcessOutcome, SaleProcessUcError};
use crate::adapter::processor::{AbstractPaymentProcessor, AppProcessorError};
use crate::adapter::repository::AppRepoError;
use crate::model::{WebhookIgnoreReason, WebhookRouteDecision};

#[derive(Debug)]
pub enum WebhookReconcileOutcome {
    Ignored(WebhookIgnoreReason),
    Processed(SaleProcessOutcome),
}

#[derive(Debug)]
pub enum WebhookReconcileUcError {
    MissingSignature,
    InvalidSignature(AppProcessorError),
    // paid order refers to product no longer in catalog
    ProductNotExist(u64),
    DataStoreError(AppRepoError),
}

impl From<AppProcessorError> for WebhookReconcileUcError {
    fn from(value: AppProcessorError) -> Self {
        Self::InvalidSignature(value)
    }
}
impl From<SaleProcessUcError> for WebhookReconcileUcError {
    fn from(value: SaleProcessUcError) -> Self {
        match value {
            SaleProcessUcError::ProductNotExist(id) => Self::ProductNotExist(id),
            SaleProcessUcError::DataStoreError(e) => Self::DataStoreError(e),
        }
    }
}

pub struct WebhookReconcileUseCase {
    pub processors: Arc<Box<dyn AbstractPaymentProcessor>>,
    pub sale_uc: ProcessSaleUseCase,
    pub logctx: Arc<AppLogContext>,
}

impl WebhookReconcileUseCase {
    /// Verify the raw body against the gateway signature, then route the
    /// event. Every verified delivery of a paid order triggers a fresh
    /// stock deduction, repeated deliveries are not detected.
    pub async fn execute(
        &self,
        raw: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookReconcileOutcome, WebhookReconcileUcError> {
        let logctx = &self.logctx;
        let signature = signature.ok_or(WebhookReconcileUcError::MissingSignature)?;
        self.processors.verify_webhook(raw, signature)?;
        let out = match WebhookRouteDecision::from_verified(raw) {
            WebhookRouteDecision::Ignored(reason) => {
                app_log_event!(logctx, AppLogLevel::INFO, "webhook-ignored: {:?}", reason);
                WebhookReconcileOutcome::Ignored(reason)
            }
            WebhookRouteDecision::Dispatched(sale) => {
                app_log_event!(
                    logctx,
                    AppLogLevel::INFO,
                    "payment-success, product:{}, quantity:{}",
                    sale.product_id,
                    sale.quantity
                );
                let result = self.sale_uc.execute(sale).await?;
                WebhookReconcileOutcome::Processed(result)
            }
        };
        Ok(out)
    }
}
