use std::boxed::Box;

use crate::adapter::repository::{AbstractProductRepo, AppRepoError};
use crate::api::web::dto::{
    ProductCreateErrorDto, ProductCreateReqDto, ProductDto, ProductErrorReason,
};
use crate::model::ProductModel;

#[derive(Debug)]
pub enum ProductAddUcError {
    ClientBadRequest(Vec<ProductCreateErrorDto>),
    DataStoreError(AppRepoError),
}

impl From<AppRepoError> for ProductAddUcError {
    fn from(value: AppRepoError) -> Self {
        Self::DataStoreError(value)
    }
}

pub struct ProductListUseCase {
    pub repo: Box<dyn AbstractProductRepo>,
}

pub struct ProductAddUseCase {
    pub repo: Box<dyn AbstractProductRepo>,
}

impl ProductListUseCase {
    pub async fn execute(&self) -> Result<Vec<ProductDto>, AppRepoError> {
        let ms = self.repo.fetch_all().await?;
        Ok(ms.into_iter().map(ProductDto::from).collect())
    }
}

impl ProductAddUseCase {
    /// Validate then insert the whole batch, nothing is saved if any item
    /// is invalid.
    pub async fn execute(
        &self,
        reqs: Vec<ProductCreateReqDto>,
    ) -> Result<Vec<ProductDto>, ProductAddUcError> {
        if reqs.is_empty() {
            let e = ProductCreateErrorDto {
                index: 0,
                reason: ProductErrorReason::EmptyBatch,
            };
            return Err(ProductAddUcError::ClientBadRequest(vec![e]));
        }
        let mut errors = Vec::new();
        let ms = reqs
            .into_iter()
            .enumerate()
            .filter_map(|(idx, d)| {
                ProductModel::try_from(d)
                    .map_err(|e| errors.push(ProductCreateErrorDto::from((idx, e))))
                    .ok()
            })
            .collect::<Vec<_>>();
        if !errors.is_empty() {
            return Err(ProductAddUcError::ClientBadRequest(errors));
        }
        let saved = self.repo.create(ms).await?;
        Ok(saved.into_iter().map(ProductDto::from).collect())
    }
}
