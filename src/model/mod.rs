mod notification;
mod product;
mod sale;

pub use notification::LowStockAlertModel;
pub use product::{
    ProductModel, ProductModelError, StockSaleResult, MAX_IMAGE_NCHARS, MAX_TITLE_NCHARS,
};
pub use sale::{SaleEventModel, WebhookIgnoreReason, WebhookRouteDecision, EVENT_ORDER_PAID};
