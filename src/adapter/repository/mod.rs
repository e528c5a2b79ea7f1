mod in_mem;
mod mariadb;

use std::boxed::Box;
use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;

use storefront_common::error::AppErrorCode;

use crate::model::ProductModel;

use self::in_mem::InMemProductRepo;
use self::mariadb::MariadbProductRepo;
use super::datastore::{AppDStoreError, AppDataStoreContext};

#[derive(Debug)]
pub enum AppRepoErrorFnLabel {
    InitProductRepo,
    FetchAllProducts,
    FetchProduct,
    CreateProducts,
    ApplySale,
    Restock,
}

#[derive(Debug)]
pub enum AppRepoErrorDetail {
    DataStore(AppDStoreError),
    DatabaseTxStart(String),
    DatabaseTxCommit(String),
    DatabaseQuery(String),
    DatabaseExec(String),
    DataRowParse(String),
    Unknown,
}

#[derive(Debug)]
pub struct AppRepoError {
    pub fn_label: AppRepoErrorFnLabel,
    pub code: AppErrorCode,
    pub detail: AppRepoErrorDetail,
}

/// Outcome of a stock deduction attempted within a single locked
/// read-modify-write on one product row.
#[derive(Debug, PartialEq)]
pub enum AppStockDeductResult {
    Sold(ProductModel),
    Insufficient { on_hand: u32, requested: u32 },
    ProductNotExist,
}

#[async_trait]
pub trait AbstractProductRepo: Sync + Send {
    /// full catalog ordered by product id
    async fn fetch_all(&self) -> Result<Vec<ProductModel>, AppRepoError>;

    async fn fetch(&self, id: u64) -> Result<Option<ProductModel>, AppRepoError>;

    /// Save new products, the store assigns their ids. Returned list keeps
    /// the same order as the input.
    async fn create(&self, items: Vec<ProductModel>) -> Result<Vec<ProductModel>, AppRepoError>;

    async fn deduct_stock(
        &self,
        id: u64,
        quantity: u32,
    ) -> Result<AppStockDeductResult, AppRepoError>;

    async fn restock(&self, id: u64, level: u32) -> Result<Option<ProductModel>, AppRepoError>;
}

pub async fn app_repo_product(
    dstore: Arc<AppDataStoreContext>,
) -> Result<Box<dyn AbstractProductRepo>, AppRepoError> {
    let out: Box<dyn AbstractProductRepo> = if let Some(m) = dstore.in_mem() {
        Box::new(InMemProductRepo::new(m))
    } else {
        Box::new(MariadbProductRepo::new(dstore)?)
    };
    Ok(out)
}

