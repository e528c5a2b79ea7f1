use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;
use mysql_async::prelude::{Query, Queryable, WithParams};
use mysql_async::{Conn, IsolationLevel, Params, Transaction, TxOpts};
use rust_decimal::Decimal;

use storefront_common::error::AppErrorCode;
use storefront_common::logging::{app_log_event, AppLogLevel};

use crate::adapter::datastore::{AppDStoreMariaDB, AppDataStoreContext};
use crate::model::{ProductModel, StockSaleResult};

use super::super::{
    AbstractProductRepo, AppRepoError, AppRepoErrorDetail, AppRepoErrorFnLabel,
    AppStockDeductResult,
};

// table layout
// `product`(`id` BIGINT UNSIGNED AUTO_INCREMENT, `title` VARCHAR(255), `description` TEXT,
//           `price` DECIMAL(12,2), `image` VARCHAR(2000), `quantity` INT UNSIGNED)
const COLUMNS: &str = "`id`,`title`,`description`,`price`,`image`,`quantity`";

type ProductRowType = (
    u64,     // `id`
    String,  // `title`
    String,  // `description`
    Decimal, // `price`
    String,  // `image`
    u32,     // `quantity`
);

struct InsertProductArgs(String, Params);
struct FetchProductArgs(String, Params);
struct UpdateQuantityArgs(String, Params);

impl From<ProductRowType> for ProductModel {
    #[rustfmt::skip]
    fn from(value: ProductRowType) -> Self {
        let (id, title, description, price, image, quantity) = value;
        Self { id, title, description, price, image, quantity }
    }
}

impl<'a> From<&'a ProductModel> for InsertProductArgs {
    fn from(value: &'a ProductModel) -> Self {
        let arg = vec![
            value.title.as_str().into(),
            value.description.as_str().into(),
            value.price.into(),
            value.image.as_str().into(),
            value.quantity.into(),
        ];
        let stmt = "INSERT INTO `product`(`title`,`description`,`price`,`image`,`quantity`) \
                    VALUES (?,?,?,?,?)";
        Self(stmt.to_string(), Params::Positional(arg))
    }
}

impl FetchProductArgs {
    fn new(id: u64, row_lock: bool) -> Self {
        let mut stmt = format!("SELECT {COLUMNS} FROM `product` WHERE `id`=?");
        if row_lock {
            // concurrent writers of the same row wait until this transaction ends
            stmt += " FOR UPDATE";
        }
        Self(stmt, Params::Positional(vec![id.into()]))
    }
}

impl From<&ProductModel> for UpdateQuantityArgs {
    fn from(value: &ProductModel) -> Self {
        let stmt = "UPDATE `product` SET `quantity`=? WHERE `id`=?";
        let arg = vec![value.quantity.into(), value.id.into()];
        Self(stmt.to_string(), Params::Positional(arg))
    }
}

pub(crate) struct MariadbProductRepo {
    _dstore: Arc<AppDStoreMariaDB>,
}

impl MariadbProductRepo {
    pub(crate) fn new(ds: Arc<AppDataStoreContext>) -> Result<Self, AppRepoError> {
        ds.mariadb()
            .map(|found| Self { _dstore: found })
            .ok_or(AppRepoError {
                fn_label: AppRepoErrorFnLabel::InitProductRepo,
                code: AppErrorCode::MissingDataStore,
                detail: AppRepoErrorDetail::Unknown,
            })
    }

    fn _map_err(
        &self,
        fn_label: AppRepoErrorFnLabel,
        code: AppErrorCode,
        detail: AppRepoErrorDetail,
    ) -> AppRepoError {
        let e = AppRepoError {
            fn_label,
            code,
            detail,
        };
        let logctx = self._dstore.log_context();
        app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
        e
    }

    async fn _start_tx<'a>(
        &self,
        conn: &'a mut Conn,
        fn_label: AppRepoErrorFnLabel,
    ) -> Result<Transaction<'a>, AppRepoError> {
        let mut options = TxOpts::new();
        // row lock taken by `SELECT ... FOR UPDATE` already serialises writers
        // of the same product, a stricter isolation level is unnecessary
        options.with_isolation_level(IsolationLevel::ReadCommitted);
        conn.start_transaction(options).await.map_err(|e| {
            self._map_err(
                fn_label,
                AppErrorCode::RemoteDbServerFailure,
                AppRepoErrorDetail::DatabaseTxStart(e.to_string()),
            )
        })
    }

    async fn _acquire(&self, fn_label: AppRepoErrorFnLabel) -> Result<Conn, AppRepoError> {
        self._dstore.acquire().await.map_err(|e| {
            self._map_err(
                fn_label,
                AppErrorCode::RemoteDbServerFailure,
                AppRepoErrorDetail::DataStore(e),
            )
        })
    }

    async fn _fetch_locked(
        &self,
        tx: &mut Transaction<'_>,
        id: u64,
        fn_label: AppRepoErrorFnLabel,
    ) -> Result<Option<ProductModel>, AppRepoError> {
        let FetchProductArgs(stmt, params) = FetchProductArgs::new(id, true);
        let row = tx
            .exec_first::<ProductRowType, String, Params>(stmt, params)
            .await
            .map_err(|e| {
                self._map_err(
                    fn_label,
                    AppErrorCode::RemoteDbServerFailure,
                    AppRepoErrorDetail::DatabaseQuery(e.to_string()),
                )
            })?;
        Ok(row.map(ProductModel::from))
    }

    async fn _save_quantity(
        &self,
        tx: &mut Transaction<'_>,
        saved: &ProductModel,
        fn_label: AppRepoErrorFnLabel,
    ) -> Result<(), AppRepoError> {
        let UpdateQuantityArgs(stmt, params) = UpdateQuantityArgs::from(saved);
        tx.exec_drop(stmt, params).await.map_err(|e| {
            self._map_err(
                fn_label,
                AppErrorCode::RemoteDbServerFailure,
                AppRepoErrorDetail::DatabaseExec(e.to_string()),
            )
        })
    }

    async fn _commit(
        &self,
        tx: Transaction<'_>,
        fn_label: AppRepoErrorFnLabel,
    ) -> Result<(), AppRepoError> {
        tx.commit().await.map_err(|e| {
            self._map_err(
                fn_label,
                AppErrorCode::RemoteDbServerFailure,
                AppRepoErrorDetail::DatabaseTxCommit(e.to_string()),
            )
        })
    }

    async fn _rollback(&self, tx: Transaction<'_>) {
        if let Err(e) = tx.rollback().await {
            let logctx = self._dstore.log_context();
            app_log_event!(logctx, AppLogLevel::WARNING, "rollback-failure: {:?}", e);
        }
    }
} // end of impl MariadbProductRepo

#[async_trait]
impl AbstractProductRepo for MariadbProductRepo {
    async fn fetch_all(&self) -> Result<Vec<ProductModel>, AppRepoError> {
        let mut conn = self._acquire(AppRepoErrorFnLabel::FetchAllProducts).await?;
        let stmt = format!("SELECT {COLUMNS} FROM `product` ORDER BY `id` ASC");
        let rows = conn
            .query::<ProductRowType, String>(stmt)
            .await
            .map_err(|e| {
                self._map_err(
                    AppRepoErrorFnLabel::FetchAllProducts,
                    AppErrorCode::RemoteDbServerFailure,
                    AppRepoErrorDetail::DatabaseQuery(e.to_string()),
                )
            })?;
        Ok(rows.into_iter().map(ProductModel::from).collect())
    }

    async fn fetch(&self, id: u64) -> Result<Option<ProductModel>, AppRepoError> {
        let mut conn = self._acquire(AppRepoErrorFnLabel::FetchProduct).await?;
        let exec = &mut conn;
        let FetchProductArgs(stmt, params) = FetchProductArgs::new(id, false);
        let maybe_row = stmt
            .with(params)
            .first::<ProductRowType, &mut Conn>(exec)
            .await
            .map_err(|e| {
                self._map_err(
                    AppRepoErrorFnLabel::FetchProduct,
                    AppErrorCode::RemoteDbServerFailure,
                    AppRepoErrorDetail::DatabaseQuery(e.to_string()),
                )
            })?;
        Ok(maybe_row.map(ProductModel::from))
    }

    async fn create(&self, items: Vec<ProductModel>) -> Result<Vec<ProductModel>, AppRepoError> {
        let fnlbl = || AppRepoErrorFnLabel::CreateProducts;
        let mut conn = self._acquire(fnlbl()).await?;
        let mut tx = self._start_tx(&mut conn, fnlbl()).await?;
        let mut saved = Vec::with_capacity(items.len());
        for mut item in items {
            let InsertProductArgs(stmt, params) = InsertProductArgs::from(&item);
            let result = tx.exec_drop(stmt, params).await;
            let last_id = match result {
                Ok(()) => tx.last_insert_id(),
                Err(e) => {
                    let detail = AppRepoErrorDetail::DatabaseExec(e.to_string());
                    let e = self._map_err(fnlbl(), AppErrorCode::RemoteDbServerFailure, detail);
                    self._rollback(tx).await;
                    return Err(e);
                }
            };
            item.id = match last_id {
                Some(v) => v,
                None => {
                    let detail = AppRepoErrorDetail::DatabaseExec("missing-insert-id".to_string());
                    let e = self._map_err(fnlbl(), AppErrorCode::DataCorruption, detail);
                    self._rollback(tx).await;
                    return Err(e);
                }
            };
            saved.push(item);
        }
        self._commit(tx, fnlbl()).await?;
        Ok(saved)
    } // end of fn create

    async fn deduct_stock(
        &self,
        id: u64,
        quantity: u32,
    ) -> Result<AppStockDeductResult, AppRepoError> {
        let fnlbl = || AppRepoErrorFnLabel::ApplySale;
        let mut conn = self._acquire(fnlbl()).await?;
        let mut tx = self._start_tx(&mut conn, fnlbl()).await?;
        let mut product = match self._fetch_locked(&mut tx, id, fnlbl()).await? {
            Some(v) => v,
            None => {
                self._rollback(tx).await;
                return Ok(AppStockDeductResult::ProductNotExist);
            }
        };
        match product.try_sell(quantity) {
            StockSaleResult::Sold { .. } => {
                self._save_quantity(&mut tx, &product, fnlbl()).await?;
                self._commit(tx, fnlbl()).await?;
                Ok(AppStockDeductResult::Sold(product))
            }
            StockSaleResult::Insufficient { on_hand, requested } => {
                self._rollback(tx).await;
                Ok(AppStockDeductResult::Insufficient { on_hand, requested })
            }
        }
    } // end of fn deduct_stock

    async fn restock(&self, id: u64, level: u32) -> Result<Option<ProductModel>, AppRepoError> {
        let fnlbl = || AppRepoErrorFnLabel::Restock;
        let mut conn = self._acquire(fnlbl()).await?;
        let mut tx = self._start_tx(&mut conn, fnlbl()).await?;
        let mut product = match self._fetch_locked(&mut tx, id, fnlbl()).await? {
            Some(v) => v,
            None => {
                self._rollback(tx).await;
                return Ok(None);
            }
        };
        product.restock(level);
        self._save_quantity(&mut tx, &product, fnlbl()).await?;
        self._commit(tx, fnlbl()).await?;
        Ok(Some(product))
    }
} // end of impl MariadbProductRepo
