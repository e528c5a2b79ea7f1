pub mod adapter;
pub mod api;
pub mod model;
pub mod network;
pub mod usecase;

use std::boxed::Box;
use std::result::Result;
use std::sync::Arc;

use storefront_common::confidentiality::{self, AbstractConfidentiality};
use storefront_common::config::AppConfig;
use storefront_common::error::AppConfidentialityError;
use storefront_common::logging::AppLogContext;

use crate::adapter::datastore::{AppDStoreError, AppDataStoreContext};
use crate::adapter::mailer::{app_mailer_context, AbstractMailer, AppMailError};
use crate::adapter::processor::{
    app_processor_context, AbstractPaymentProcessor, AppProcessorError,
};

pub mod hard_limit {
    pub const MAX_DB_CONNECTIONS: u32 = 1800u32;
    pub const MAX_SECONDS_DB_IDLE: u16 = 360u16;
    pub const MAX_ITEMS_INMEM_TABLE: u32 = 2500u32;
}

pub mod app_meta {
    pub const LABEL: &str = "storefront";
}

pub struct AppSharedState {
    _config: Arc<AppConfig>,
    _log_ctx: Arc<AppLogContext>,
    _dstore: Arc<AppDataStoreContext>,
    _processors: Arc<Box<dyn AbstractPaymentProcessor>>,
    _mailer: Arc<Box<dyn AbstractMailer>>,
}

#[derive(Debug)]
pub enum ShrStateInitProgress {
    Confidentiality,
    DataStore,
    ExternalProcessor,
    Mailer,
}

#[derive(Debug)]
pub struct ShrStateInitError {
    pub progress: ShrStateInitProgress,
    pub detail: String,
}
impl From<AppConfidentialityError> for ShrStateInitError {
    fn from(value: AppConfidentialityError) -> Self {
        Self {
            progress: ShrStateInitProgress::Confidentiality,
            detail: format!("{:?}", value),
        }
    }
}
impl From<AppDStoreError> for ShrStateInitError {
    fn from(value: AppDStoreError) -> Self {
        Self {
            progress: ShrStateInitProgress::DataStore,
            detail: format!("{:?}", value),
        }
    }
}
impl From<AppProcessorError> for ShrStateInitError {
    fn from(value: AppProcessorError) -> Self {
        Self {
            progress: ShrStateInitProgress::ExternalProcessor,
            detail: format!("{:?}", value),
        }
    }
}
impl From<AppMailError> for ShrStateInitError {
    fn from(value: AppMailError) -> Self {
        Self {
            progress: ShrStateInitProgress::Mailer,
            detail: format!("{:?}", value),
        }
    }
}

impl AppSharedState {
    pub fn new(cfg: AppConfig) -> Result<Self, ShrStateInitError> {
        let logctx = {
            let lc = AppLogContext::new(&cfg.basepath, &cfg.api_server.logging);
            Arc::new(lc)
        };
        let cfdntl: Arc<Box<dyn AbstractConfidentiality>> = {
            let c = confidentiality::build_context(&cfg)?;
            Arc::new(c)
        };
        let _dstore = {
            let d = AppDataStoreContext::new(
                &cfg.api_server.data_store,
                cfdntl.clone(),
                logctx.clone(),
            )?;
            Arc::new(d)
        };
        let _processors = {
            let proc = app_processor_context(
                &cfg.api_server.third_parties,
                cfdntl.clone(),
                logctx.clone(),
            )?;
            Arc::new(proc)
        };
        let _mailer = {
            let m = app_mailer_context(&cfg.api_server.mailing, cfdntl, logctx.clone())?;
            Arc::new(m)
        };
        Ok(Self {
            _config: Arc::new(cfg),
            _log_ctx: logctx,
            _dstore,
            _processors,
            _mailer,
        })
    }

    pub fn datastore(&self) -> Arc<AppDataStoreContext> {
        self._dstore.clone()
    }
    pub fn processor_context(&self) -> Arc<Box<dyn AbstractPaymentProcessor>> {
        self._processors.clone()
    }
    pub fn mailer(&self) -> Arc<Box<dyn AbstractMailer>> {
        self._mailer.clone()
    }
    pub fn log_context(&self) -> Arc<AppLogContext> {
        self._log_ctx.clone()
    }
    pub fn config(&self) -> Arc<AppConfig> {
        self._config.clone()
    }
} // end of impl AppSharedState

impl Clone for AppSharedState {
    fn clone(&self) -> Self {
        Self {
            _config: self._config.clone(),
            _log_ctx: self._log_ctx.clone(),
            _dstore: self._dstore.clone(),
            _processors: self._processors.clone(),
            _mailer: self._mailer.clone(),
        }
    }
}
