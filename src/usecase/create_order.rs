use std::boxed::Box;
use std::sync::Arc;

use crate::adapter::processor::{
    AbstractPaymentProcessor, AppProcessorError, AppProcessorErrorReason, AppProcessorOrderResult,
};
use crate::adapter::repository::{AbstractProductRepo, AppRepoError};
use crate::model::ProductModelError;

#[derive(Debug)]
pub enum OrderCreateUcError {
    ZeroQuantity,
    ProductNotExist(u64),
    InsufficientStock { on_hand: u32, requested: u32 },
    InvalidAmount(ProductModelError),
    ExternalProcessorError(AppProcessorError),
    DataStoreError(AppRepoError),
}

impl From<AppRepoError> for OrderCreateUcError {
    fn from(value: AppRepoError) -> Self {
        Self::DataStoreError(value)
    }
}
impl From<AppProcessorError> for OrderCreateUcError {
    fn from(value: AppProcessorError) -> Self {
        match value.reason {
            AppProcessorErrorReason::InvalidOrder(e) => Self::InvalidAmount(e),
            _others => Self::ExternalProcessorError(AppProcessorError {
                reason: _others,
                fn_label: value.fn_label,
            }),
        }
    }
}

pub struct OrderCreateUseCase {
    pub processors: Arc<Box<dyn AbstractPaymentProcessor>>,
    pub repo: Box<dyn AbstractProductRepo>,
}

impl OrderCreateUseCase {
    /// Stock is only checked here, nothing is reserved until the gateway
    /// reports the payment.
    pub async fn execute(
        &self,
        product_id: u64,
        quantity: u32,
    ) -> Result<AppProcessorOrderResult, OrderCreateUcError> {
        if quantity == 0 {
            return Err(OrderCreateUcError::ZeroQuantity);
        }
        let product = self
            .repo
            .fetch(product_id)
            .await?
            .ok_or(OrderCreateUcError::ProductNotExist(product_id))?;
        if !product.in_stock(quantity) {
            return Err(OrderCreateUcError::InsufficientStock {
                on_hand: product.quantity,
                requested: quantity,
            });
        }
        let out = self.processors.create_order(&product, quantity).await?;
        Ok(out)
    }
}
