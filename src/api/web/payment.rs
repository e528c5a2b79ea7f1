use actix_web::http::header::{ContentType, HeaderMap};
use actix_web::web::{Bytes, Data as WebData, Path as ExtPath, Query as ExtQuery};
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use storefront_common::logging::{app_log_event, AppLogLevel};

use super::dto::OrderCreateQueryDto;
use crate::adapter::repository::app_repo_product;
use crate::usecase::{
    OrderCreateUcError, OrderCreateUseCase, ProcessSaleUseCase, WebhookReconcileOutcome,
    WebhookReconcileUcError, WebhookReconcileUseCase,
};
use crate::AppSharedState;

const HEADER_SIGNATURE: &str = "X-Razorpay-Signature";

fn plaintext_resp(mut builder: actix_web::HttpResponseBuilder, msg: &str) -> HttpResponse {
    builder
        .append_header(ContentType::plaintext())
        .body(msg.to_string())
}

pub(super) async fn create_order(
    path: ExtPath<u64>,
    query: ExtQuery<OrderCreateQueryDto>,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let logctx = shr_state.log_context();
    let logctx_p = &logctx;
    let product_id = path.into_inner();
    let quantity = query.into_inner().quantity.unwrap_or(1);
    app_log_event!(
        logctx_p,
        AppLogLevel::DEBUG,
        "create-order-api, product:{product_id}, quantity:{quantity}"
    );

    let repo = match app_repo_product(shr_state.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx_p, AppLogLevel::ERROR, "repo-init-error {:?}", e);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };
    let uc = OrderCreateUseCase {
        repo,
        processors: shr_state.processor_context(),
    };
    let resp = match uc.execute(product_id, quantity).await {
        Ok(v) => HttpResponse::Ok()
            .append_header(ContentType::json())
            .body(v.raw),
        Err(uce) => match uce {
            OrderCreateUcError::ZeroQuantity => {
                plaintext_resp(HttpResponse::BadRequest(), "Quantity must be positive")
            }
            OrderCreateUcError::ProductNotExist(_id) => {
                plaintext_resp(HttpResponse::BadRequest(), "Product not found")
            }
            OrderCreateUcError::InsufficientStock { on_hand, requested } => {
                app_log_event!(
                    logctx_p,
                    AppLogLevel::INFO,
                    "insufficient-stock, product:{product_id}, on-hand:{on_hand}, requested:{requested}"
                );
                plaintext_resp(HttpResponse::BadRequest(), "Insufficient stock")
            }
            OrderCreateUcError::InvalidAmount(e) => {
                app_log_event!(logctx_p, AppLogLevel::WARNING, "{:?}", e);
                plaintext_resp(HttpResponse::BadRequest(), "Invalid order amount")
            }
            OrderCreateUcError::ExternalProcessorError(e) => {
                app_log_event!(logctx_p, AppLogLevel::ERROR, "{:?}", e);
                let msg = e.client_message();
                plaintext_resp(HttpResponse::InternalServerError(), msg.as_str())
            }
            OrderCreateUcError::DataStoreError(e) => {
                app_log_event!(logctx_p, AppLogLevel::ERROR, "{:?}", e);
                HttpResponse::InternalServerError().finish()
            }
        },
    };
    Ok(resp)
} // end of fn create_order

fn extract_signature(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(HEADER_SIGNATURE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

pub(super) async fn payment_webhook(
    req: HttpRequest,
    body: Bytes,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let logctx = shr_state.log_context();
    let logctx_p = &logctx;
    app_log_event!(logctx_p, AppLogLevel::DEBUG, "payment-webhook-api");

    let repo = match app_repo_product(shr_state.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx_p, AppLogLevel::ERROR, "repo-init-error {:?}", e);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };
    let sale_uc = ProcessSaleUseCase {
        repo,
        mailer: shr_state.mailer(),
        inventory: shr_state.config().api_server.inventory.clone(),
        logctx: logctx.clone(),
    };
    let uc = WebhookReconcileUseCase {
        processors: shr_state.processor_context(),
        sale_uc,
        logctx: logctx.clone(),
    };
    let signature = extract_signature(req.headers());
    let resp = match uc.execute(body.as_ref(), signature).await {
        Ok(outcome) => {
            if let WebhookReconcileOutcome::Processed(o) = &outcome {
                app_log_event!(logctx_p, AppLogLevel::DEBUG, "sale-outcome: {:?}", o);
            }
            plaintext_resp(HttpResponse::Ok(), "Webhook received and processed")
        }
        Err(uce) => match uce {
            WebhookReconcileUcError::MissingSignature => {
                app_log_event!(logctx_p, AppLogLevel::WARNING, "webhook-signature-missing");
                plaintext_resp(HttpResponse::BadRequest(), "Invalid signature")
            }
            WebhookReconcileUcError::InvalidSignature(e) => {
                app_log_event!(logctx_p, AppLogLevel::WARNING, "{:?}", e);
                plaintext_resp(HttpResponse::BadRequest(), "Invalid signature")
            }
            WebhookReconcileUcError::ProductNotExist(id) => {
                app_log_event!(logctx_p, AppLogLevel::ERROR, "paid-product-missing:{id}");
                plaintext_resp(HttpResponse::InternalServerError(), "Error processing webhook")
            }
            WebhookReconcileUcError::DataStoreError(e) => {
                app_log_event!(logctx_p, AppLogLevel::ERROR, "{:?}", e);
                HttpResponse::InternalServerError().finish()
            }
        },
    };
    Ok(resp)
} // end of fn payment_webhook
