use std::result::Result;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::api::web::dto::{ProductCreateReqDto, ProductPriceReqDto};

pub const MAX_TITLE_NCHARS: usize = 255;
pub const MAX_IMAGE_NCHARS: usize = 2000;
const DEFAULT_INIT_QUANTITY: u32 = 10;
const PRICE_SCALE: u32 = 2;

#[derive(Debug, PartialEq)]
pub enum ProductModelError {
    EmptyTitle,
    InvalidPrice(String),
    NegativePrice(Decimal),
    ZeroQuantity,
    AmountOverflow { price: Decimal, quantity: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductModel {
    // zero until the product store assigns one
    pub id: u64,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub image: String,
    pub quantity: u32,
}

#[derive(Debug, PartialEq, Eq)]
pub enum StockSaleResult {
    Sold { remaining: u32 },
    Insufficient { on_hand: u32, requested: u32 },
}

fn truncate_chars(mut s: String, max_nchars: usize) -> String {
    if let Some((pos, _c)) = s.char_indices().nth(max_nchars) {
        s.truncate(pos);
    }
    s
}

fn parse_price(value: ProductPriceReqDto) -> Result<Decimal, ProductModelError> {
    let raw = match value {
        ProductPriceReqDto::Text(s) => s,
        ProductPriceReqDto::Number(n) => n.to_string(),
    };
    let trimmed = raw.trim();
    let parsed = Decimal::from_str(trimmed).or_else(|_e| Decimal::from_scientific(trimmed));
    parsed.map_err(|_e| ProductModelError::InvalidPrice(raw))
}

impl TryFrom<ProductCreateReqDto> for ProductModel {
    type Error = ProductModelError;

    fn try_from(value: ProductCreateReqDto) -> Result<Self, Self::Error> {
        let ProductCreateReqDto {
            title,
            description,
            price,
            image,
            quantity,
        } = value;
        if title.trim().is_empty() {
            return Err(ProductModelError::EmptyTitle);
        }
        let price = parse_price(price)?;
        if price.is_sign_negative() && !price.is_zero() {
            return Err(ProductModelError::NegativePrice(price));
        }
        let mut price =
            price.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
        price.rescale(PRICE_SCALE);
        Ok(Self {
            id: 0,
            title: truncate_chars(title, MAX_TITLE_NCHARS),
            description: description.unwrap_or_default(),
            price,
            image: truncate_chars(image.unwrap_or_default(), MAX_IMAGE_NCHARS),
            quantity: quantity.unwrap_or(DEFAULT_INIT_QUANTITY),
        })
    }
}

impl ProductModel {
    /// Total amount in the minor currency unit (e.g. paise) for the given
    /// quantity, as expected by the payment gateway.
    pub fn pay_amount_minor(&self, quantity: u32) -> Result<i64, ProductModelError> {
        if quantity == 0 {
            return Err(ProductModelError::ZeroQuantity);
        }
        let overflow = || ProductModelError::AmountOverflow {
            price: self.price,
            quantity,
        };
        let unit = self
            .price
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or_else(overflow)?;
        unit.checked_mul(Decimal::from(quantity))
            .ok_or_else(overflow)?
            .trunc()
            .to_i64()
            .ok_or_else(overflow)
    }

    pub fn in_stock(&self, quantity: u32) -> bool {
        self.quantity >= quantity
    }

    /// Deduct stock for a confirmed sale. The quantity is left untouched
    /// when on-hand stock cannot cover the request.
    pub fn try_sell(&mut self, quantity: u32) -> StockSaleResult {
        match self.quantity.checked_sub(quantity) {
            Some(remaining) => {
                self.quantity = remaining;
                StockSaleResult::Sold { remaining }
            }
            None => StockSaleResult::Insufficient {
                on_hand: self.quantity,
                requested: quantity,
            },
        }
    }

    pub fn restock(&mut self, level: u32) {
        self.quantity = level;
    }

    pub fn is_low_stock(&self, threshold: u32) -> bool {
        self.quantity < threshold
    }
} // end of impl ProductModel
