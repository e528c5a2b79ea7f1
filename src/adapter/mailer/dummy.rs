use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;

use storefront_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use super::{AbstractMailer, AppMailError};
use crate::model::LowStockAlertModel;

pub(super) struct DummyMailer {
    sender: String,
    recipients: Vec<String>,
    logctx: Arc<AppLogContext>,
}

impl DummyMailer {
    pub(super) fn new(sender: String, recipients: Vec<String>, logctx: Arc<AppLogContext>) -> Self {
        Self {
            sender,
            recipients,
            logctx,
        }
    }
}

#[async_trait]
impl AbstractMailer for DummyMailer {
    fn sender(&self) -> &str {
        self.sender.as_str()
    }
    fn recipients(&self) -> &[String] {
        &self.recipients
    }
    async fn send(&self, msg: LowStockAlertModel) -> Result<(), AppMailError> {
        let logctx = &self.logctx;
        app_log_event!(
            logctx,
            AppLogLevel::INFO,
            "from:{}, to:{:?}, subject:{}",
            msg.sender.as_str(),
            msg.recipients,
            msg.subject.as_str()
        );
        Ok(())
    }
}
