use std::str::FromStr;

use rust_decimal::Decimal;

use storefront::api::web::dto::{ProductCreateReqDto, ProductPriceReqDto};
use storefront::model::{
    ProductModel, ProductModelError, StockSaleResult, MAX_IMAGE_NCHARS, MAX_TITLE_NCHARS,
};

fn ut_req_dto(title: &str, price: ProductPriceReqDto, qty: Option<u32>) -> ProductCreateReqDto {
    ProductCreateReqDto {
        title: title.to_string(),
        description: None,
        price,
        image: None,
        quantity: qty,
    }
}

fn ut_saved_product(price: &str, quantity: u32) -> ProductModel {
    ProductModel {
        id: 18,
        title: "Noise Cancelling Headphones".to_string(),
        description: "over-ear, wireless".to_string(),
        price: Decimal::from_str(price).unwrap(),
        image: "https://cdn.nexusstock.com/p/18.png".to_string(),
        quantity,
    }
}

#[test]
fn convert_from_dto_ok() {
    let price = ProductPriceReqDto::Text(" 29990 ".to_string());
    let mut req = ut_req_dto("Smart Watch", price, Some(7));
    req.description = Some("AMOLED display".to_string());
    let result = ProductModel::try_from(req);
    assert!(result.is_ok());
    let m = result.unwrap();
    assert_eq!(m.id, 0);
    assert_eq!(m.title.as_str(), "Smart Watch");
    assert_eq!(m.description.as_str(), "AMOLED display");
    assert_eq!(m.price.to_string().as_str(), "29990.00");
    assert_eq!(m.quantity, 7);
    assert!(m.image.is_empty());
}

#[test]
fn convert_from_dto_default_quantity() {
    let price = ProductPriceReqDto::Number(serde_json::Number::from(450u32));
    let req = ut_req_dto("USB-C Cable", price, None);
    let m = ProductModel::try_from(req).unwrap();
    assert_eq!(m.quantity, 10);
    assert_eq!(m.price, Decimal::new(45000, 2));
}

#[test]
fn convert_from_dto_price_rounding() {
    let cases = [
        ("10.005", "10.01"),
        ("10.004", "10.00"),
        ("0.1", "0.10"),
        ("1e2", "100.00"),
    ];
    for (raw, expect) in cases {
        let price = ProductPriceReqDto::Text(raw.to_string());
        let m = ProductModel::try_from(ut_req_dto("Desk Lamp", price, None)).unwrap();
        assert_eq!(m.price.to_string().as_str(), expect);
    }
    let num = serde_json::from_str::<serde_json::Number>("12.5").unwrap();
    let m = ProductModel::try_from(ut_req_dto("Desk Lamp", ProductPriceReqDto::Number(num), None))
        .unwrap();
    assert_eq!(m.price.to_string().as_str(), "12.50");
}

#[test]
fn convert_from_dto_error() {
    let price = ProductPriceReqDto::Text("100".to_string());
    let result = ProductModel::try_from(ut_req_dto("   ", price, None));
    assert_eq!(result.unwrap_err(), ProductModelError::EmptyTitle);

    let price = ProductPriceReqDto::Text("-0.5".to_string());
    let result = ProductModel::try_from(ut_req_dto("Mouse Pad", price, None));
    assert!(matches!(result, Err(ProductModelError::NegativePrice(_))));

    let price = ProductPriceReqDto::Text("twelve".to_string());
    let result = ProductModel::try_from(ut_req_dto("Mouse Pad", price, None));
    if let Err(ProductModelError::InvalidPrice(raw)) = result {
        assert_eq!(raw.as_str(), "twelve");
    } else {
        panic!("unexpected result");
    }
}

#[test]
fn convert_from_dto_truncate_fields() {
    let title = "é".repeat(MAX_TITLE_NCHARS + 30);
    let mut req = ut_req_dto(&title, ProductPriceReqDto::Text("5".to_string()), None);
    req.image = Some("圖".repeat(MAX_IMAGE_NCHARS + 1));
    let m = ProductModel::try_from(req).unwrap();
    assert_eq!(m.title.chars().count(), MAX_TITLE_NCHARS);
    assert_eq!(m.image.chars().count(), MAX_IMAGE_NCHARS);
    assert!(m.title.chars().all(|c| c == 'é'));
}

#[test]
fn pay_amount_minor_unit_ok() {
    let m = ut_saved_product("100.00", 10);
    assert_eq!(m.pay_amount_minor(2), Ok(20000));
    let m = ut_saved_product("29990.00", 10);
    assert_eq!(m.pay_amount_minor(1), Ok(2999000));
    let m = ut_saved_product("19.99", 10);
    assert_eq!(m.pay_amount_minor(3), Ok(5997));
    let m = ut_saved_product("0.00", 10);
    assert_eq!(m.pay_amount_minor(4), Ok(0));
}

#[test]
fn pay_amount_minor_unit_error() {
    let m = ut_saved_product("100.00", 10);
    assert_eq!(m.pay_amount_minor(0), Err(ProductModelError::ZeroQuantity));
    let m = ut_saved_product("79228162514264337593543950335", 10);
    let result = m.pay_amount_minor(2);
    assert!(matches!(
        result,
        Err(ProductModelError::AmountOverflow { quantity: 2, .. })
    ));
}

#[test]
fn sell_never_below_zero() {
    let mut m = ut_saved_product("100.00", 1);
    let result = m.try_sell(5);
    assert_eq!(
        result,
        StockSaleResult::Insufficient {
            on_hand: 1,
            requested: 5
        }
    );
    assert_eq!(m.quantity, 1);
    let result = m.try_sell(1);
    assert_eq!(result, StockSaleResult::Sold { remaining: 0 });
    assert_eq!(m.quantity, 0);
    assert!(!m.in_stock(1));
    assert!(m.in_stock(0));
}

#[test]
fn restock_and_low_stock() {
    let mut m = ut_saved_product("100.00", 4);
    assert!(m.is_low_stock(5));
    m.quantity = 5;
    assert!(!m.is_low_stock(5));
    m.restock(20);
    assert_eq!(m.quantity, 20);
    m.quantity = 3;
    m.restock(20);
    assert_eq!(m.quantity, 20);
}
