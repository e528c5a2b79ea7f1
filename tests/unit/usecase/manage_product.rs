use storefront::adapter::repository::app_repo_product;
use storefront::api::web::dto::{ProductCreateReqDto, ProductErrorReason, ProductPriceReqDto};
use storefront::usecase::{ProductAddUcError, ProductAddUseCase, ProductListUseCase};

use crate::ut_setup_sharestate;

fn ut_req(title: &str, price: &str, quantity: Option<u32>) -> ProductCreateReqDto {
    ProductCreateReqDto {
        title: title.to_string(),
        description: Some(format!("{title}, 1 year warranty")),
        price: ProductPriceReqDto::Text(price.to_string()),
        image: Some("https://cdn.nexusstock.com/img/placeholder.png".to_string()),
        quantity,
    }
}

#[actix_web::test]
async fn add_then_list_ok() {
    let shr_state = ut_setup_sharestate();
    let uc = ProductAddUseCase {
        repo: app_repo_product(shr_state.datastore()).await.unwrap(),
    };
    let reqs = vec![
        ut_req("Smartphone X", "29990", Some(10)),
        ut_req("Earbuds", "1999.5", None),
    ];
    let saved = uc.execute(reqs).await.unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].price.as_str(), "29990.00");
    assert_eq!(saved[1].price.as_str(), "1999.50");
    assert_eq!(saved[1].quantity, 10);

    let uc = ProductListUseCase {
        repo: app_repo_product(shr_state.datastore()).await.unwrap(),
    };
    let listed = uc.execute().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, saved[0].id);
    assert_eq!(listed[1].title.as_str(), "Earbuds");
}

#[actix_web::test]
async fn add_invalid_item_rejects_batch() {
    let shr_state = ut_setup_sharestate();
    let uc = ProductAddUseCase {
        repo: app_repo_product(shr_state.datastore()).await.unwrap(),
    };
    let reqs = vec![
        ut_req("Tablet", "15000", None),
        ut_req("", "100", None),
        ut_req("Stylus", "-3", None),
        ut_req("Charger", "n/a", None),
    ];
    let result = uc.execute(reqs).await;
    if let Err(ProductAddUcError::ClientBadRequest(es)) = result {
        assert_eq!(es.len(), 3);
        assert_eq!(es[0].index, 1);
        assert!(matches!(es[0].reason, ProductErrorReason::EmptyTitle));
        assert_eq!(es[1].index, 2);
        assert!(matches!(es[1].reason, ProductErrorReason::NegativePrice));
        assert_eq!(es[2].index, 3);
        assert!(matches!(es[2].reason, ProductErrorReason::InvalidPrice));
    } else {
        panic!("unexpected result");
    }
    let repo = app_repo_product(shr_state.datastore()).await.unwrap();
    assert!(repo.fetch_all().await.unwrap().is_empty());
}

#[actix_web::test]
async fn add_empty_batch() {
    let shr_state = ut_setup_sharestate();
    let uc = ProductAddUseCase {
        repo: app_repo_product(shr_state.datastore()).await.unwrap(),
    };
    let result = uc.execute(Vec::new()).await;
    if let Err(ProductAddUcError::ClientBadRequest(es)) = result {
        assert_eq!(es.len(), 1);
        assert!(matches!(es[0].reason, ProductErrorReason::EmptyBatch));
    } else {
        panic!("unexpected result");
    }
}
