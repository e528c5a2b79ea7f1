use std::boxed::Box;
use std::result::Result;
use std::sync::Arc;
use std::time::Duration;

use mysql_async::{
    Conn, Error as MysqlError, IoError, Opts, OptsBuilder, Pool, PoolConstraints, PoolOpts,
};
use serde::Deserialize;

use storefront_common::confidentiality::AbstractConfidentiality;
use storefront_common::config::AppDbServerCfg;
use storefront_common::error::{AppConfidentialityError, AppErrorCode};
use storefront_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use super::AppDStoreError;

// credential layout in the confidentiality source
#[allow(non_snake_case)]
#[derive(Deserialize)]
struct DbSecret {
    HOST: String,
    PORT: u16,
    USER: String,
    PASSWORD: String,
}

impl From<AppConfidentialityError> for AppDStoreError {
    fn from(value: AppConfidentialityError) -> Self {
        Self::ConfidentialLoad(value.code, value.detail)
    }
}
impl From<serde_json::Error> for AppDStoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::ConfidentialResolve(value.to_string())
    }
}

// server error numbers from MariaDB reference
fn classify_server_errno(errno: u16) -> AppErrorCode {
    match errno {
        1037 | 1038 | 1041 => AppErrorCode::IOerror(std::io::ErrorKind::OutOfMemory),
        1040 | 1129 | 1203 => AppErrorCode::DatabaseServerBusy,
        1044 | 1045 | 1049 => AppErrorCode::InvalidInput,
        _others => AppErrorCode::DataCorruption,
    }
}

impl From<MysqlError> for AppDStoreError {
    fn from(value: MysqlError) -> Self {
        match value {
            MysqlError::Io(IoError::Io(e)) => Self::GetConnIo(e.kind(), e.to_string()),
            MysqlError::Io(IoError::Tls(e)) => Self::GetConnTls(e.to_string()),
            MysqlError::Driver(e) => Self::GetConnDbDriver(e.to_string()),
            MysqlError::Server(e) => {
                Self::GetConnDbServer(classify_server_errno(e.code), e.code, e.message)
            }
            MysqlError::Url(e) => {
                Self::GetConnUnclassified(AppErrorCode::InvalidInput, e.to_string())
            }
            MysqlError::Other(e) => Self::GetConnUnclassified(AppErrorCode::Unknown, e.to_string()),
        }
    }
}

/// Connection pool to one MariaDB database holding the product table
pub(crate) struct AppDStoreMariaDB {
    pool: Pool,
    alias: String,
    acquire_timeout: Duration,
    logctx: Arc<AppLogContext>,
}

impl AppDStoreMariaDB {
    pub(super) fn try_build(
        cfg: &AppDbServerCfg,
        cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
        logctx: Arc<AppLogContext>,
    ) -> Result<Self, AppDStoreError> {
        let serial = cfdntl.try_get_payload(cfg.confidentiality_path.as_str())?;
        let DbSecret {
            HOST,
            PORT,
            USER,
            PASSWORD,
        } = serde_json::from_str::<DbSecret>(serial.as_str())?;
        let max_conns = (cfg.max_conns as usize).max(1);
        let constraints = PoolConstraints::new(1, max_conns).ok_or_else(|| {
            let detail = format!("pool-constraint, max-conns:{max_conns}");
            AppDStoreError::GetConnUnclassified(AppErrorCode::InvalidInput, detail)
        })?;
        let idle = Duration::from_secs(cfg.idle_timeout_secs as u64);
        let pool_opts = PoolOpts::default()
            .with_constraints(constraints)
            .with_inactive_connection_ttl(idle);
        let opts = OptsBuilder::default()
            .ip_or_hostname(HOST)
            .tcp_port(PORT)
            .user(Some(USER))
            .pass(Some(PASSWORD))
            .db_name(Some(cfg.db_name.as_str()))
            .pool_opts(pool_opts);
        Ok(Self {
            pool: Pool::new(Opts::from(opts)),
            alias: cfg.alias.clone(),
            acquire_timeout: Duration::from_secs(cfg.acquire_timeout_secs.max(1) as u64),
            logctx,
        })
    }

    pub(crate) fn log_context(&self) -> Arc<AppLogContext> {
        self.logctx.clone()
    }

    /// Wait for a pooled connection no longer than the configured timeout
    pub(crate) async fn acquire(&self) -> Result<Conn, AppDStoreError> {
        let fut = self.pool.get_conn();
        match tokio::time::timeout(self.acquire_timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_elapsed) => {
                let logctx = &self.logctx;
                app_log_event!(
                    logctx,
                    AppLogLevel::WARNING,
                    "acquire-conn-timeout, db:{}",
                    self.alias.as_str()
                );
                Err(AppDStoreError::AcquireTimeout(self.acquire_timeout.as_secs()))
            }
        }
    }
} // end of impl AppDStoreMariaDB
