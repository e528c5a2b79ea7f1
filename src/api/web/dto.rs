use serde::{Deserialize, Serialize};

use crate::model::{ProductModel, ProductModelError};

#[derive(Deserialize)]
#[serde(untagged)]
pub enum ProductPriceReqDto {
    // decimal string is preferred, plain JSON number is accepted as well
    Text(String),
    Number(serde_json::Number),
}

#[derive(Deserialize)]
pub struct ProductCreateReqDto {
    pub title: String,
    pub description: Option<String>,
    pub price: ProductPriceReqDto,
    pub image: Option<String>,
    pub quantity: Option<u32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
pub enum ProductCreateReqBody {
    Single(ProductCreateReqDto),
    Batch(Vec<ProductCreateReqDto>),
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ProductDto {
    pub id: u64,
    pub title: String,
    pub description: String,
    // decimal in string form, e.g. `29990.00`
    pub price: String,
    pub image: String,
    pub quantity: u32,
}

#[derive(Serialize, Deserialize, Debug)]
pub enum ProductErrorReason {
    EmptyTitle,
    InvalidPrice,
    NegativePrice,
    EmptyBatch,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ProductCreateErrorDto {
    // position of the item within the request batch
    pub index: usize,
    pub reason: ProductErrorReason,
}

#[derive(Deserialize)]
pub struct OrderCreateQueryDto {
    pub quantity: Option<u32>,
}

impl From<ProductModel> for ProductDto {
    fn from(value: ProductModel) -> Self {
        let ProductModel {
            id,
            title,
            description,
            price,
            image,
            quantity,
        } = value;
        Self {
            id,
            title,
            description,
            price: price.to_string(),
            image,
            quantity,
        }
    }
}

impl From<(usize, ProductModelError)> for ProductCreateErrorDto {
    fn from(value: (usize, ProductModelError)) -> Self {
        let (index, e) = value;
        let reason = match e {
            ProductModelError::EmptyTitle => ProductErrorReason::EmptyTitle,
            ProductModelError::NegativePrice(_) => ProductErrorReason::NegativePrice,
            ProductModelError::InvalidPrice(_)
            | ProductModelError::ZeroQuantity
            | ProductModelError::AmountOverflow { .. } => ProductErrorReason::InvalidPrice,
        };
        Self { index, reason }
    }
}
