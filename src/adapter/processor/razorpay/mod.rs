mod client;
mod mock;
mod resources;

use std::boxed::Box;
use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use storefront_common::confidentiality::AbstractConfidentiality;
use storefront_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use self::client::AppRazorpayClient;
use self::resources::{CreateOrder, ErrorResponse, RazorpaySecret};
use super::https_client::secure_connector;
use super::AppProcessorErrorReason;
use crate::model::ProductModel;

pub(super) use self::mock::MockProcessorRazorpayCtx;

#[async_trait]
pub(super) trait AbstRazorpayContext: Send + Sync {
    async fn create_order(
        &self,
        product: &ProductModel,
        quantity: u32,
    ) -> Result<Vec<u8>, AppProcessorErrorReason>;

    fn verify_webhook(&self, payload: &[u8], signature: &str)
        -> Result<(), AppProcessorErrorReason>;
}

fn load_secret(
    confidential_path: &str,
    cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
) -> Result<RazorpaySecret, AppProcessorErrorReason> {
    let serial = cfdntl
        .try_get_payload(confidential_path)
        .map_err(|_e| AppProcessorErrorReason::MissingCredential)?;
    let secret = serde_json::from_str::<RazorpaySecret>(serial.as_str())
        .map_err(|_e| AppProcessorErrorReason::CredentialCorrupted)?;
    let empty_found = [&secret.key_id, &secret.key_secret, &secret.webhook_secret]
        .iter()
        .any(|s| s.is_empty());
    if empty_found {
        Err(AppProcessorErrorReason::CredentialCorrupted)
    } else {
        Ok(secret)
    }
}

/// HMAC-SHA256 over the raw webhook body, compared in constant time
/// against the hex-encoded signature from the gateway.
fn verify_hmac_signature(
    secret: &str,
    payload: &[u8],
    signature: &str,
) -> Result<(), AppProcessorErrorReason> {
    let sig_bytes = hex::decode(signature.trim())
        .map_err(|e| AppProcessorErrorReason::SignatureEncoding(e.to_string()))?;
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_e| AppProcessorErrorReason::CredentialCorrupted)?;
    mac.update(payload);
    mac.verify_slice(&sig_bytes)
        .map_err(|_e| AppProcessorErrorReason::SignatureMismatch)
}

pub(super) struct AppProcessorRazorpayCtx {
    client: AppRazorpayClient,
    webhook_secret: String,
    logctx: Arc<AppLogContext>,
}

impl AppProcessorRazorpayCtx {
    pub(super) fn try_build(
        host: &str,
        port: u16,
        confidential_path: &str,
        cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
        logctx: Arc<AppLogContext>,
    ) -> Result<Box<dyn AbstRazorpayContext>, AppProcessorErrorReason> {
        let RazorpaySecret {
            key_id,
            key_secret,
            webhook_secret,
        } = load_secret(confidential_path, cfdntl)?;
        let client = AppRazorpayClient::try_build(
            secure_connector()?,
            host.to_string(),
            port,
            key_id.as_str(),
            key_secret.as_str(),
            logctx.clone(),
        )?;
        let obj = Self {
            client,
            webhook_secret,
            logctx,
        };
        Ok(Box::new(obj))
    }
} // end of impl AppProcessorRazorpayCtx

#[async_trait]
impl AbstRazorpayContext for AppProcessorRazorpayCtx {
    async fn create_order(
        &self,
        product: &ProductModel,
        quantity: u32,
    ) -> Result<Vec<u8>, AppProcessorErrorReason> {
        let logctx = &self.logctx;
        let body_obj = CreateOrder::try_new(product, quantity)?;
        app_log_event!(
            logctx,
            AppLogLevel::DEBUG,
            "product:{}, quantity:{}, amount:{}, receipt:{}",
            product.id,
            quantity,
            body_obj.amount,
            body_obj.receipt.as_str()
        );
        let (status, raw) = self.client.post_json("/orders", &body_obj).await?;
        if status.is_success() {
            Ok(raw)
        } else {
            let detail = serde_json::from_slice::<ErrorResponse>(&raw)
                .map(ErrorResponse::into_message)
                .unwrap_or_else(|_e| String::from_utf8_lossy(&raw).to_string());
            app_log_event!(
                logctx,
                AppLogLevel::WARNING,
                "status:{}, detail:{}",
                status.as_u16(),
                detail.as_str()
            );
            Err(AppProcessorErrorReason::Remote(status.as_u16(), detail))
        }
    } // end of fn create_order

    fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<(), AppProcessorErrorReason> {
        verify_hmac_signature(self.webhook_secret.as_str(), payload, signature)
    }
} // end of impl AppProcessorRazorpayCtx
