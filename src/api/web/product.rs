use actix_web::http::header::ContentType;
use actix_web::web::{Data as WebData, Json as ExtJson, Path as ExtPath};
use actix_web::{HttpResponse, Result as ActixResult};
use serde::Serialize;

use storefront_common::logging::{app_log_event, AppLogLevel};

use super::dto::ProductCreateReqBody;
use crate::adapter::repository::app_repo_product;
use crate::usecase::{
    ProductAddUcError, ProductAddUseCase, ProductListUseCase, RestockProductUseCase,
    RestockUcError,
};
use crate::AppSharedState;

fn json_resp<T: Serialize>(mut builder: actix_web::HttpResponseBuilder, data: &T) -> HttpResponse {
    match serde_json::to_vec(data) {
        Ok(body) => builder.append_header(ContentType::json()).body(body),
        Err(_e) => HttpResponse::InternalServerError().finish(),
    }
}

pub(super) async fn list_products(shr_state: WebData<AppSharedState>) -> ActixResult<HttpResponse> {
    let logctx = shr_state.log_context();
    let logctx_p = &logctx;
    app_log_event!(logctx_p, AppLogLevel::DEBUG, "list-products-api");

    let repo = match app_repo_product(shr_state.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx_p, AppLogLevel::ERROR, "repo-init-error {:?}", e);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };
    let uc = ProductListUseCase { repo };
    let resp = match uc.execute().await {
        Ok(items) => json_resp(HttpResponse::Ok(), &items),
        Err(e) => {
            app_log_event!(logctx_p, AppLogLevel::ERROR, "{:?}", e);
            HttpResponse::InternalServerError().finish()
        }
    };
    Ok(resp)
}

pub(super) async fn add_product(
    req_body: ExtJson<ProductCreateReqBody>,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let logctx = shr_state.log_context();
    let logctx_p = &logctx;
    app_log_event!(logctx_p, AppLogLevel::DEBUG, "add-product-api");

    let repo = match app_repo_product(shr_state.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx_p, AppLogLevel::ERROR, "repo-init-error {:?}", e);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };
    let uc = ProductAddUseCase { repo };
    // single object in, single object out
    let (reqs, single) = match req_body.into_inner() {
        ProductCreateReqBody::Single(d) => (vec![d], true),
        ProductCreateReqBody::Batch(ds) => (ds, false),
    };
    let resp = match uc.execute(reqs).await {
        Ok(mut saved) => {
            if single {
                match saved.pop() {
                    Some(item) => json_resp(HttpResponse::Ok(), &item),
                    None => HttpResponse::InternalServerError().finish(),
                }
            } else {
                json_resp(HttpResponse::Ok(), &saved)
            }
        }
        Err(uce) => match uce {
            ProductAddUcError::ClientBadRequest(es) => json_resp(HttpResponse::BadRequest(), &es),
            ProductAddUcError::DataStoreError(e) => {
                app_log_event!(logctx_p, AppLogLevel::ERROR, "{:?}", e);
                HttpResponse::InternalServerError().finish()
            }
        },
    };
    Ok(resp)
} // end of fn add_product

pub(super) async fn restock_product(
    path: ExtPath<u64>,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let logctx = shr_state.log_context();
    let logctx_p = &logctx;
    let product_id = path.into_inner();
    app_log_event!(logctx_p, AppLogLevel::DEBUG, "restock-api, product:{product_id}");

    let repo = match app_repo_product(shr_state.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx_p, AppLogLevel::ERROR, "repo-init-error {:?}", e);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };
    let uc = RestockProductUseCase {
        repo,
        inventory: shr_state.config().api_server.inventory.clone(),
        logctx: logctx.clone(),
    };
    let resp = match uc.execute(product_id).await {
        Ok(_saved) => HttpResponse::Ok()
            .append_header(ContentType::plaintext())
            .body("Product restocked successfully"),
        Err(uce) => match uce {
            RestockUcError::ProductNotExist(_id) => HttpResponse::NotFound()
                .append_header(ContentType::plaintext())
                .body("Product not found"),
            RestockUcError::DataStoreError(e) => {
                app_log_event!(logctx_p, AppLogLevel::ERROR, "{:?}", e);
                HttpResponse::InternalServerError().finish()
            }
        },
    };
    Ok(resp)
} // end of fn restock_product
