pub mod dto;
mod payment;
mod product;

use actix_http::Method;
use actix_web::Route;
use std::collections::HashMap;

use payment::{create_order, payment_webhook};
use product::{add_product, list_products, restock_product};

pub struct AppRouteTable {
    pub version: String,
    pub entries: HashMap<String, Route>,
}

impl AppRouteTable {
    pub fn get(ver_req: &str) -> Self {
        let (version, entries) = match ver_req {
            "0.1.0" => (format!("v{ver_req}"), Self::v0_1_0_entries()),
            _others => (String::new(), HashMap::new()),
        };
        Self { version, entries }
    }
    fn v0_1_0_entries() -> HashMap<String, Route> {
        let data = [
            (
                "create_order".to_string(),
                Route::new().method(Method::POST).to(create_order),
            ),
            (
                "payment_webhook".to_string(),
                Route::new().method(Method::POST).to(payment_webhook),
            ),
            (
                "list_products".to_string(),
                Route::new().method(Method::GET).to(list_products),
            ),
            (
                "add_product".to_string(),
                Route::new().method(Method::POST).to(add_product),
            ),
            (
                "restock_product".to_string(),
                Route::new().method(Method::POST).to(restock_product),
            ),
        ];
        HashMap::from(data)
    }
} // end of impl AppRouteTable
