mod https_client;
mod razorpay;

use std::boxed::Box;
use std::marker::{Send, Sync};
use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;

use storefront_common::confidentiality::AbstractConfidentiality;
use storefront_common::config::App3rdPartyCfg;
use storefront_common::logging::{app_log_event, AppLogContext, AppLogLevel};

pub use self::https_client::{GatewayHttpsError, GatewayHttpsErrorKind};
use self::razorpay::{AbstRazorpayContext, AppProcessorRazorpayCtx, MockProcessorRazorpayCtx};
use crate::model::{ProductModel, ProductModelError};

const GATEWAY_LABEL_RAZORPAY: &str = "razorpay";

#[async_trait]
pub trait AbstractPaymentProcessor: Send + Sync {
    /// Create a remote order for the given quantity of a product. The
    /// product id and quantity travel with the order as notes, so that the
    /// payment webhook can recover them later.
    async fn create_order(
        &self,
        product: &ProductModel,
        quantity: u32,
    ) -> Result<AppProcessorOrderResult, AppProcessorError>;

    fn verify_webhook(&self, payload: &[u8], signature: &str) -> Result<(), AppProcessorError>;
}

#[derive(Debug)]
pub enum AppProcessorErrorReason {
    InvalidConfig,
    MissingCredential,
    CredentialCorrupted,
    InvalidOrder(ProductModelError),
    LowLvlNet(GatewayHttpsError),
    // status code and message from the remote gateway
    Remote(u16, String),
    SignatureEncoding(String),
    SignatureMismatch,
}

#[derive(Debug)]
pub enum AppProcessorFnLabel {
    TryBuild,
    CreateOrder,
    VerifyWebhook,
}

#[derive(Debug)]
pub struct AppProcessorError {
    pub reason: AppProcessorErrorReason,
    pub fn_label: AppProcessorFnLabel,
}

/// Order object returned by the gateway, kept as raw JSON bytes
#[derive(Debug)]
pub struct AppProcessorOrderResult {
    pub raw: Vec<u8>,
}

impl From<GatewayHttpsError> for AppProcessorErrorReason {
    fn from(value: GatewayHttpsError) -> Self {
        Self::LowLvlNet(value)
    }
}
impl From<ProductModelError> for AppProcessorErrorReason {
    fn from(value: ProductModelError) -> Self {
        Self::InvalidOrder(value)
    }
}

impl AppProcessorError {
    /// message suitable for the caller of the order API, only a remote
    /// rejection exposes the gateway's own text.
    pub fn client_message(&self) -> String {
        match &self.reason {
            AppProcessorErrorReason::Remote(_status, detail) => detail.clone(),
            AppProcessorErrorReason::LowLvlNet(_e) => "payment gateway unreachable".to_string(),
            _others => "payment gateway failure".to_string(),
        }
    }
}

struct AppProcessorContext {
    _razorpay: Box<dyn AbstRazorpayContext>,
    _logctx: Arc<AppLogContext>,
}

impl AppProcessorContext {
    fn new(
        cfgs3pt: &[Arc<App3rdPartyCfg>],
        cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
        _logctx: Arc<AppLogContext>,
    ) -> Result<Self, AppProcessorError> {
        let found = cfgs3pt
            .iter()
            .find(|c| c.name().to_lowercase() == GATEWAY_LABEL_RAZORPAY);
        let result = match found.map(|c| c.as_ref()) {
            Some(App3rdPartyCfg::dev {
                name: _,
                host,
                port,
                confidentiality_path,
            }) => AppProcessorRazorpayCtx::try_build(
                host.as_str(),
                *port,
                confidentiality_path.as_str(),
                cfdntl,
                _logctx.clone(),
            ),
            Some(App3rdPartyCfg::test {
                name: _,
                confidentiality_path,
            }) => MockProcessorRazorpayCtx::try_build(confidentiality_path.as_str(), cfdntl),
            None => Err(AppProcessorErrorReason::InvalidConfig),
        };
        match result {
            Ok(_razorpay) => Ok(Self { _razorpay, _logctx }),
            Err(reason) => {
                app_log_event!(_logctx, AppLogLevel::ERROR, "{:?}", reason);
                Err(AppProcessorError {
                    reason,
                    fn_label: AppProcessorFnLabel::TryBuild,
                })
            }
        }
    } // end of fn new
} // end of impl AppProcessorContext

#[async_trait]
impl AbstractPaymentProcessor for AppProcessorContext {
    async fn create_order(
        &self,
        product: &ProductModel,
        quantity: u32,
    ) -> Result<AppProcessorOrderResult, AppProcessorError> {
        self._razorpay
            .create_order(product, quantity)
            .await
            .map(|raw| AppProcessorOrderResult { raw })
            .map_err(|reason| AppProcessorError {
                reason,
                fn_label: AppProcessorFnLabel::CreateOrder,
            })
    }

    fn verify_webhook(&self, payload: &[u8], signature: &str) -> Result<(), AppProcessorError> {
        self._razorpay
            .verify_webhook(payload, signature)
            .map_err(|reason| AppProcessorError {
                reason,
                fn_label: AppProcessorFnLabel::VerifyWebhook,
            })
    }
}

pub(crate) fn app_processor_context(
    cfg_3pt: &[Arc<App3rdPartyCfg>],
    cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
    logctx: Arc<AppLogContext>,
) -> Result<Box<dyn AbstractPaymentProcessor>, AppProcessorError> {
    let proc = AppProcessorContext::new(cfg_3pt, cfdntl, logctx)?;
    Ok(Box::new(proc))
}
