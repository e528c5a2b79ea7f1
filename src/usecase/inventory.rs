use std::boxed::Box;
use std::sync::Arc;

use storefront_common::config::AppInventoryCfg;
use storefront_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use crate::adapter::mailer::{AbstractMailer, AppMailError};
use crate::adapter::repository::{AbstractProductRepo, AppRepoError, AppStockDeductResult};
use crate::model::{LowStockAlertModel, ProductModel, SaleEventModel};

#[derive(Debug)]
pub enum LowStockAlertOutcome {
    NotRequired,
    Sent,
    NotificationFailed(AppMailError),
}

#[derive(Debug)]
pub enum SaleProcessOutcome {
    Sold {
        remaining: u32,
        alert: LowStockAlertOutcome,
    },
    InsufficientStock {
        on_hand: u32,
        requested: u32,
    },
}

#[derive(Debug)]
pub enum SaleProcessUcError {
    ProductNotExist(u64),
    DataStoreError(AppRepoError),
}

impl From<AppRepoError> for SaleProcessUcError {
    fn from(value: AppRepoError) -> Self {
        Self::DataStoreError(value)
    }
}

#[derive(Debug)]
pub enum RestockUcError {
    ProductNotExist(u64),
    DataStoreError(AppRepoError),
}

impl From<AppRepoError> for RestockUcError {
    fn from(value: AppRepoError) -> Self {
        Self::DataStoreError(value)
    }
}

pub struct ProcessSaleUseCase {
    pub repo: Box<dyn AbstractProductRepo>,
    pub mailer: Arc<Box<dyn AbstractMailer>>,
    pub inventory: AppInventoryCfg,
    pub logctx: Arc<AppLogContext>,
}

pub struct RestockProductUseCase {
    pub repo: Box<dyn AbstractProductRepo>,
    pub inventory: AppInventoryCfg,
    pub logctx: Arc<AppLogContext>,
}

impl ProcessSaleUseCase {
    /// Apply a paid sale to stock. Shortage is absorbed as an outcome, an
    /// unknown product is reported to the caller since the payment is already
    /// captured.
    pub async fn execute(
        &self,
        sale: SaleEventModel,
    ) -> Result<SaleProcessOutcome, SaleProcessUcError> {
        let logctx = &self.logctx;
        let SaleEventModel {
            product_id,
            quantity,
        } = sale;
        let result = self.repo.deduct_stock(product_id, quantity).await?;
        let out = match result {
            AppStockDeductResult::Sold(product) => {
                app_log_event!(
                    logctx,
                    AppLogLevel::INFO,
                    "stock-updated, product:{}, remaining:{}",
                    product_id,
                    product.quantity
                );
                let remaining = product.quantity;
                let alert = self.check_low_stock(product).await;
                SaleProcessOutcome::Sold { remaining, alert }
            }
            AppStockDeductResult::Insufficient { on_hand, requested } => {
                app_log_event!(
                    logctx,
                    AppLogLevel::WARNING,
                    "out-of-stock-sale, product:{}, on-hand:{}, requested:{}",
                    product_id,
                    on_hand,
                    requested
                );
                SaleProcessOutcome::InsufficientStock { on_hand, requested }
            }
            AppStockDeductResult::ProductNotExist => {
                app_log_event!(
                    logctx,
                    AppLogLevel::ERROR,
                    "sale-product-not-found:{}",
                    product_id
                );
                return Err(SaleProcessUcError::ProductNotExist(product_id));
            }
        };
        Ok(out)
    } // end of fn execute

    async fn check_low_stock(&self, product: ProductModel) -> LowStockAlertOutcome {
        if !product.is_low_stock(self.inventory.low_stock_threshold) {
            return LowStockAlertOutcome::NotRequired;
        }
        let logctx = &self.logctx;
        let msg =
            LowStockAlertModel::compose(&product, self.mailer.sender(), self.mailer.recipients());
        match self.mailer.send(msg).await {
            Ok(()) => {
                app_log_event!(
                    logctx,
                    AppLogLevel::INFO,
                    "low-stock-alert-sent, product:{}",
                    product.id
                );
                LowStockAlertOutcome::Sent
            }
            Err(e) => {
                app_log_event!(
                    logctx,
                    AppLogLevel::ERROR,
                    "low-stock-alert-failed, product:{}, {:?}",
                    product.id,
                    e
                );
                LowStockAlertOutcome::NotificationFailed(e)
            }
        }
    }
} // end of impl ProcessSaleUseCase

impl RestockProductUseCase {
    /// Overwrite stock quantity with the configured restock level
    pub async fn execute(&self, product_id: u64) -> Result<ProductModel, RestockUcError> {
        let level = self.inventory.restock_level;
        let saved = self
            .repo
            .restock(product_id, level)
            .await?
            .ok_or(RestockUcError::ProductNotExist(product_id))?;
        let logctx = &self.logctx;
        app_log_event!(
            logctx,
            AppLogLevel::INFO,
            "product-restocked:{}, quantity:{}",
            product_id,
            saved.quantity
        );
        Ok(saved)
    }
}
