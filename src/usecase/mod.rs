mod create_order;
mod inventory;
mod manage_product;
mod webhook;

pub use create_order::{OrderCreateUcError, OrderCreateUseCase};
pub use inventory::{
    LowStockAlertOutcome, ProcessSaleUseCase, RestockProductUseCase, RestockUcError,
    SaleProcessOutcome, SaleProcessUcError,
};
pub use manage_product::{ProductAddUcError, ProductAddUseCase, ProductListUseCase};
pub use webhook::{WebhookReconcileOutcome, WebhookReconcileUcError, WebhookReconcileUseCase};
