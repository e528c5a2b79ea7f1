use serde_json::Value as JsnVal;

use storefront::adapter::processor::{
    AppProcessorError, AppProcessorErrorReason, AppProcessorFnLabel, AppProcessorOrderResult,
};
use storefront::adapter::repository::{
    app_repo_product, AppRepoError, AppRepoErrorDetail, AppRepoErrorFnLabel,
};
use storefront::model::ProductModelError;
use storefront::usecase::{OrderCreateUcError, OrderCreateUseCase};
use storefront_common::error::AppErrorCode;

use super::{ut_product, ut_saved_product, MockPaymentProcessor, MockProductRepo};
use crate::ut_setup_sharestate;

#[actix_web::test]
async fn create_order_ok() {
    let shr_state = ut_setup_sharestate();
    let repo = app_repo_product(shr_state.datastore()).await.unwrap();
    let pid = ut_saved_product(repo.as_ref(), "Gaming Headset", "100.00", 10).await;
    let uc = OrderCreateUseCase {
        repo,
        processors: shr_state.processor_context(),
    };
    let result = uc.execute(pid, 2).await;
    assert!(result.is_ok());
    let order = serde_json::from_slice::<JsnVal>(&result.unwrap().raw).unwrap();
    assert_eq!(order["amount"].as_i64(), Some(20000));
    assert_eq!(order["notes"]["product_id"].as_str(), Some(pid.to_string().as_str()));
    assert_eq!(order["notes"]["quantity"].as_str(), Some("2"));
    // stock is not reserved at order creation
    let repo = app_repo_product(shr_state.datastore()).await.unwrap();
    let m = repo.fetch(pid).await.unwrap().unwrap();
    assert_eq!(m.quantity, 10);
}

#[actix_web::test]
async fn create_order_insufficient_stock() {
    let shr_state = ut_setup_sharestate();
    let repo = app_repo_product(shr_state.datastore()).await.unwrap();
    let pid = ut_saved_product(repo.as_ref(), "Webcam", "1200.00", 1).await;
    let uc = OrderCreateUseCase {
        repo,
        processors: shr_state.processor_context(),
    };
    let result = uc.execute(pid, 3).await;
    assert!(matches!(
        result,
        Err(OrderCreateUcError::InsufficientStock {
            on_hand: 1,
            requested: 3
        })
    ));
}

#[actix_web::test]
async fn create_order_product_not_found() {
    let shr_state = ut_setup_sharestate();
    let repo = app_repo_product(shr_state.datastore()).await.unwrap();
    let uc = OrderCreateUseCase {
        repo,
        processors: shr_state.processor_context(),
    };
    let result = uc.execute(8964, 1).await;
    assert!(matches!(result, Err(OrderCreateUcError::ProductNotExist(8964))));
}

#[actix_web::test]
async fn create_order_zero_quantity() {
    let shr_state = ut_setup_sharestate();
    let repo = app_repo_product(shr_state.datastore()).await.unwrap();
    let pid = ut_saved_product(repo.as_ref(), "Webcam", "1200.00", 5).await;
    let uc = OrderCreateUseCase {
        repo,
        processors: shr_state.processor_context(),
    };
    let result = uc.execute(pid, 0).await;
    assert!(matches!(result, Err(OrderCreateUcError::ZeroQuantity)));
}

#[actix_web::test]
async fn create_order_gateway_error() {
    let mut saved = ut_product("Tripod", "850.00", 6);
    saved.id = 77;
    let repo = MockProductRepo::build(Some(Ok(Some(saved))), None);
    let proc_err = AppProcessorError {
        reason: AppProcessorErrorReason::Remote(
            401,
            "Authentication failed".to_string(),
        ),
        fn_label: AppProcessorFnLabel::CreateOrder,
    };
    let processors = MockPaymentProcessor::build(Err(proc_err));
    let uc = OrderCreateUseCase { repo, processors };
    let result = uc.execute(77, 1).await;
    if let Err(OrderCreateUcError::ExternalProcessorError(e)) = result {
        assert_eq!(e.client_message().as_str(), "Authentication failed");
    } else {
        panic!("unexpected result");
    }
}

#[actix_web::test]
async fn create_order_amount_overflow() {
    let mut saved = ut_product("Tripod", "850.00", 6);
    saved.id = 77;
    let repo = MockProductRepo::build(Some(Ok(Some(saved))), None);
    let proc_err = AppProcessorError {
        reason: AppProcessorErrorReason::InvalidOrder(ProductModelError::AmountOverflow {
            price: rust_decimal::Decimal::MAX,
            quantity: 1,
        }),
        fn_label: AppProcessorFnLabel::CreateOrder,
    };
    let processors = MockPaymentProcessor::build(Err(proc_err));
    let uc = OrderCreateUseCase { repo, processors };
    let result = uc.execute(77, 1).await;
    assert!(matches!(
        result,
        Err(OrderCreateUcError::InvalidAmount(
            ProductModelError::AmountOverflow { .. }
        ))
    ));
}

#[actix_web::test]
async fn create_order_datastore_error() {
    let repo_err = AppRepoError {
        fn_label: AppRepoErrorFnLabel::FetchProduct,
        code: AppErrorCode::RemoteDbServerFailure,
        detail: AppRepoErrorDetail::DatabaseQuery("connection reset".to_string()),
    };
    let repo = MockProductRepo::build(Some(Err(repo_err)), None);
    let processors = MockPaymentProcessor::build(Ok(AppProcessorOrderResult { raw: Vec::new() }));
    let uc = OrderCreateUseCase { repo, processors };
    let result = uc.execute(77, 1).await;
    if let Err(OrderCreateUcError::DataStoreError(e)) = result {
        assert_eq!(e.code, AppErrorCode::RemoteDbServerFailure);
    } else {
        panic!("unexpected result");
    }
}
