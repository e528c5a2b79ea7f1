mod amqp;
mod dummy;

use std::boxed::Box;
use std::io::ErrorKind;
use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;

use storefront_common::confidentiality::AbstractConfidentiality;
use storefront_common::config::{AppMailTransportCfg, AppMailingCfg};
use storefront_common::error::AppErrorCode;
use storefront_common::logging::AppLogContext;

use self::amqp::AppAmqpMailer;
use self::dummy::DummyMailer;
use crate::model::LowStockAlertModel;

#[derive(Debug)]
pub enum AppMailErrorFnLabel {
    InitCtx,
    Send,
}

#[derive(Debug)]
pub enum AppMailErrorReason {
    InvalidCredential,
    CorruptedCredential,
    InternalConfig(String),
    LowLevelConn(String),
    SysIo(ErrorKind, String),
    Serialize(AppErrorCode, String),
    PublishConfirm(String),
    NotSupport,
}

#[derive(Debug)]
pub struct AppMailError {
    pub fn_label: AppMailErrorFnLabel,
    pub reason: AppMailErrorReason,
}

/// Outbound channel for operational alerts. Delivery is fire-and-forget,
/// a successful return only means the transport accepted the message.
#[async_trait]
pub trait AbstractMailer: Send + Sync {
    fn sender(&self) -> &str;
    fn recipients(&self) -> &[String];
    async fn send(&self, msg: LowStockAlertModel) -> Result<(), AppMailError>;
}

fn load_sender(
    cfg: &AppMailingCfg,
    cfdntl: &Arc<Box<dyn AbstractConfidentiality>>,
) -> Result<String, AppMailError> {
    let map_err = |reason| AppMailError {
        fn_label: AppMailErrorFnLabel::InitCtx,
        reason,
    };
    let serial = cfdntl
        .try_get_payload(cfg.sender_confidential_path.as_str())
        .map_err(|_e| map_err(AppMailErrorReason::InvalidCredential))?;
    let sender = serde_json::from_str::<String>(serial.as_str())
        .map_err(|_e| map_err(AppMailErrorReason::CorruptedCredential))?;
    if sender.trim().is_empty() {
        Err(map_err(AppMailErrorReason::CorruptedCredential))
    } else {
        Ok(sender)
    }
}

pub(crate) fn app_mailer_context(
    cfg: &AppMailingCfg,
    cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
    logctx: Arc<AppLogContext>,
) -> Result<Box<dyn AbstractMailer>, AppMailError> {
    let sender = load_sender(cfg, &cfdntl)?;
    let recipients = cfg.recipients.clone();
    let out: Box<dyn AbstractMailer> = match &cfg.transport {
        AppMailTransportCfg::dummy => Box::new(DummyMailer::new(sender, recipients, logctx)),
        AppMailTransportCfg::AMQP(c) => {
            let m = AppAmqpMailer::try_build(c, cfdntl, sender, recipients, logctx)?;
            Box::new(m)
        }
    };
    Ok(out)
}
