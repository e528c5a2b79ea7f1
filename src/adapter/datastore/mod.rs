mod in_mem;
mod mariadb;

use std::boxed::Box;
use std::io::ErrorKind;
use std::result::Result;
use std::sync::Arc;

use storefront_common::confidentiality::AbstractConfidentiality;
use storefront_common::config::{AppDataStoreCfg, AppDbServerType};
use storefront_common::error::AppErrorCode;
use storefront_common::logging::AppLogContext;

pub use in_mem::{AppInMemDstoreLock, AppInMemRow, AppInMemoryDStore};
pub(crate) use mariadb::AppDStoreMariaDB;

#[derive(Debug)]
pub enum AppDStoreError {
    ConfidentialLoad(AppErrorCode, String),
    ConfidentialResolve(String),
    GetConnIo(ErrorKind, String),
    GetConnTls(String),
    GetConnDbDriver(String),
    GetConnDbServer(AppErrorCode, u16, String),
    GetConnUnclassified(AppErrorCode, String),
    AcquireTimeout(u64),
    InMemExceedLimit { table: String, max_items: u32 },
    BackendNotSupport,
    NoBackendConfigured,
}

pub struct AppDataStoreContext {
    _mariadb: Vec<Arc<AppDStoreMariaDB>>,
    _in_mem: Option<Arc<AppInMemoryDStore>>,
}

impl AppDataStoreContext {
    pub fn new(
        cfgs: &[AppDataStoreCfg],
        cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
        logctx: Arc<AppLogContext>,
    ) -> Result<Self, AppDStoreError> {
        let mut errors = Vec::new();
        let mut _in_mem = None;
        let _mariadb = cfgs
            .iter()
            .filter_map(|cfg| match cfg {
                AppDataStoreCfg::InMemory(c) => {
                    _in_mem = Some(Arc::new(AppInMemoryDStore::new(c)));
                    None
                }
                AppDataStoreCfg::DbServer(c) => match c.srv_type {
                    AppDbServerType::MariaDB => Some(AppDStoreMariaDB::try_build(
                        c,
                        cfdntl.clone(),
                        logctx.clone(),
                    )),
                    AppDbServerType::PostgreSQL => Some(Err(AppDStoreError::BackendNotSupport)),
                },
            })
            .filter_map(|r| match r {
                Ok(v) => Some(Arc::new(v)),
                Err(e) => {
                    errors.push(e);
                    None
                }
            })
            .collect::<Vec<_>>();
        if let Some(e) = errors.pop() {
            Err(e)
        } else if _mariadb.is_empty() && _in_mem.is_none() {
            Err(AppDStoreError::NoBackendConfigured)
        } else {
            Ok(Self { _mariadb, _in_mem })
        }
    }

    // product table lives in the first configured database
    pub(crate) fn mariadb(&self) -> Option<Arc<AppDStoreMariaDB>> {
        self._mariadb.first().cloned()
    }

    pub fn in_mem(&self) -> Option<Arc<AppInMemoryDStore>> {
        self._in_mem.clone()
    }
} // end of impl AppDataStoreContext
