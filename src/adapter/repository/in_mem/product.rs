use std::result::Result;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use storefront_common::error::AppErrorCode;

use crate::adapter::datastore::{AppInMemDstoreLock, AppInMemRow, AppInMemoryDStore};
use crate::model::{ProductModel, StockSaleResult};

use super::super::{
    AbstractProductRepo, AppRepoError, AppRepoErrorDetail, AppRepoErrorFnLabel,
    AppStockDeductResult,
};

mod _product {
    pub(super) const TABLE_LABEL: &str = "product";
    pub(super) enum InMemColIdx {
        Title,
        Description,
        Price,
        Image,
        Quantity,
        TotNumColumns,
    }
    impl From<InMemColIdx> for usize {
        fn from(value: InMemColIdx) -> usize {
            match value {
                InMemColIdx::Title => 0,
                InMemColIdx::Description => 1,
                InMemColIdx::Price => 2,
                InMemColIdx::Image => 3,
                InMemColIdx::Quantity => 4,
                InMemColIdx::TotNumColumns => 5,
            }
        }
    }
}

use _product::{InMemColIdx, TABLE_LABEL};

fn to_row(m: &ProductModel) -> AppInMemRow {
    let mut row = vec![String::new(); InMemColIdx::TotNumColumns.into()];
    let pairs = [
        (InMemColIdx::Title, m.title.clone()),
        (InMemColIdx::Description, m.description.clone()),
        (InMemColIdx::Price, m.price.to_string()),
        (InMemColIdx::Image, m.image.clone()),
        (InMemColIdx::Quantity, m.quantity.to_string()),
    ];
    for (idx, val) in pairs {
        let i: usize = idx.into();
        row[i] = val;
    }
    row
}

fn try_from_row(id: u64, mut row: AppInMemRow) -> Result<ProductModel, String> {
    if row.len() != usize::from(InMemColIdx::TotNumColumns) {
        return Err(format!("num-columns:{}, id:{id}", row.len()));
    }
    let mut take = |idx: InMemColIdx| std::mem::take(&mut row[usize::from(idx)]);
    let title = take(InMemColIdx::Title);
    let description = take(InMemColIdx::Description);
    let price_raw = take(InMemColIdx::Price);
    let image = take(InMemColIdx::Image);
    let qty_raw = take(InMemColIdx::Quantity);
    let price = Decimal::from_str(price_raw.as_str())
        .map_err(|e| format!("price:{price_raw}, id:{id}, {e}"))?;
    let quantity = qty_raw
        .parse::<u32>()
        .map_err(|e| format!("quantity:{qty_raw}, id:{id}, {e}"))?;
    Ok(ProductModel {
        id,
        title,
        description,
        price,
        image,
        quantity,
    })
}

pub(crate) struct InMemProductRepo {
    _dstore: Arc<AppInMemoryDStore>,
}

impl InMemProductRepo {
    pub(crate) fn new(dstore: Arc<AppInMemoryDStore>) -> Self {
        Self { _dstore: dstore }
    }

    fn _fetch(
        lock: &AppInMemDstoreLock<'_>,
        id: u64,
        fn_label: AppRepoErrorFnLabel,
    ) -> Result<Option<ProductModel>, AppRepoError> {
        lock.fetch(TABLE_LABEL, id)
            .map(|row| try_from_row(id, row))
            .transpose()
            .map_err(|msg| AppRepoError {
                fn_label,
                code: AppErrorCode::DataCorruption,
                detail: AppRepoErrorDetail::DataRowParse(msg),
            })
    }

    fn _save(
        lock: &mut AppInMemDstoreLock<'_>,
        m: &ProductModel,
        fn_label: AppRepoErrorFnLabel,
    ) -> Result<(), AppRepoError> {
        if lock.update(TABLE_LABEL, m.id, to_row(m)) {
            Ok(())
        } else {
            Err(AppRepoError {
                fn_label,
                code: AppErrorCode::DataCorruption,
                detail: AppRepoErrorDetail::DatabaseExec(format!("row-vanished:{}", m.id)),
            })
        }
    }
}

#[async_trait]
impl AbstractProductRepo for InMemProductRepo {
    async fn fetch_all(&self) -> Result<Vec<ProductModel>, AppRepoError> {
        let lock = self._dstore.lock().await;
        lock.fetch_all(TABLE_LABEL)
            .into_iter()
            .map(|(id, row)| try_from_row(id, row))
            .collect::<Result<Vec<_>, String>>()
            .map_err(|msg| AppRepoError {
                fn_label: AppRepoErrorFnLabel::FetchAllProducts,
                code: AppErrorCode::DataCorruption,
                detail: AppRepoErrorDetail::DataRowParse(msg),
            })
    }

    async fn fetch(&self, id: u64) -> Result<Option<ProductModel>, AppRepoError> {
        let lock = self._dstore.lock().await;
        Self::_fetch(&lock, id, AppRepoErrorFnLabel::FetchProduct)
    }

    async fn create(&self, items: Vec<ProductModel>) -> Result<Vec<ProductModel>, AppRepoError> {
        let mut lock = self._dstore.lock().await;
        let num_free = lock.num_free_slots(TABLE_LABEL);
        if num_free < items.len() {
            let msg = format!("num-free:{num_free}, num-requested:{}", items.len());
            return Err(AppRepoError {
                fn_label: AppRepoErrorFnLabel::CreateProducts,
                code: AppErrorCode::ExceedingMaxLimit,
                detail: AppRepoErrorDetail::DatabaseExec(msg),
            });
        }
        let mut saved = Vec::with_capacity(items.len());
        for mut item in items {
            item.id = lock
                .insert(TABLE_LABEL, to_row(&item))
                .map_err(|e| AppRepoError {
                    fn_label: AppRepoErrorFnLabel::CreateProducts,
                    code: AppErrorCode::ExceedingMaxLimit,
                    detail: AppRepoErrorDetail::DataStore(e),
                })?;
            saved.push(item);
        }
        Ok(saved)
    }

    async fn deduct_stock(
        &self,
        id: u64,
        quantity: u32,
    ) -> Result<AppStockDeductResult, AppRepoError> {
        // the table lock is held until the decremented row is written back
        let mut lock = self._dstore.lock().await;
        let mut product = match Self::_fetch(&lock, id, AppRepoErrorFnLabel::ApplySale)? {
            Some(v) => v,
            None => return Ok(AppStockDeductResult::ProductNotExist),
        };
        match product.try_sell(quantity) {
            StockSaleResult::Sold { .. } => {
                Self::_save(&mut lock, &product, AppRepoErrorFnLabel::ApplySale)?;
                Ok(AppStockDeductResult::Sold(product))
            }
            StockSaleResult::Insufficient { on_hand, requested } => {
                Ok(AppStockDeductResult::Insufficient { on_hand, requested })
            }
        }
    }

    async fn restock(&self, id: u64, level: u32) -> Result<Option<ProductModel>, AppRepoError> {
        let mut lock = self._dstore.lock().await;
        let mut product = match Self::_fetch(&lock, id, AppRepoErrorFnLabel::Restock)? {
            Some(v) => v,
            None => return Ok(None),
        };
        product.restock(level);
        Self::_save(&mut lock, &product, AppRepoErrorFnLabel::Restock)?;
        Ok(Some(product))
    }
} // end of impl InMemProductRepo
