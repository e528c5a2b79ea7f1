use std::collections::hash_map::RandomState;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use serde::de::{Error as DeserializeError, Expected};
use serde::Deserialize;

use crate::constant::{env_vars, inventory as const_inventory, logging as const_log};
use crate::error::{AppCfgError, AppErrorCode};
use crate::{AppLogAlias, WebApiPath};

#[derive(Deserialize)]
pub struct AppLogHandlerCfg {
    pub min_level: const_log::Level,
    pub destination: const_log::Destination,
    pub alias: AppLogAlias,
    pub path: Option<String>,
    #[serde(default)]
    pub rotation: const_log::Rotation,
}

#[derive(Deserialize)]
pub struct AppLoggerCfg {
    pub alias: AppLogAlias,
    pub handlers: Vec<String>,
    pub level: Option<const_log::Level>,
}

#[derive(Deserialize)]
pub struct AppLoggingCfg {
    pub handlers: Vec<AppLogHandlerCfg>,
    pub loggers: Vec<AppLoggerCfg>,
}

#[derive(Deserialize, Clone)]
pub struct WebApiRouteCfg {
    pub path: WebApiPath,
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub handler: String,
}

impl std::fmt::Display for WebApiRouteCfg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "path:{}, handler:{}", self.path, self.handler)
    }
}

#[derive(Deserialize, Clone)]
pub struct WebApiCorsCfg {
    // `*` in the list allows any origin
    pub allow_origins: Vec<String>,
    pub preflight_max_age_secs: Option<usize>,
}

#[derive(Deserialize)]
pub struct WebApiListenCfg {
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub api_version: String,
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub path_prefix: String,
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub cors: WebApiCorsCfg,
    pub routes: Vec<WebApiRouteCfg>,
}

#[derive(Deserialize)]
pub struct AppAmqpBindingCfg {
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub exchange: String,
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub routing_key: String,
    pub durable: bool,
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub python_celery_task: String,
}

#[derive(Deserialize)]
pub struct AppAmqpAttriCfg {
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub vhost: String,
    pub max_channels: u16,
    pub timeout_secs: u16,
}

#[derive(Deserialize)]
pub struct AppMailAmqpCfg {
    pub binding: AppAmqpBindingCfg,
    pub attributes: AppAmqpAttriCfg,
    pub max_connections: u16,
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub confidential_path: String,
}

#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
#[derive(Deserialize)]
#[serde(tag = "handler_type")]
pub enum AppMailTransportCfg {
    dummy,
    AMQP(AppMailAmqpCfg),
}

#[derive(Deserialize)]
pub struct AppMailingCfg {
    // identity of outbound mail sender, resolved through confidentiality handler
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub sender_confidential_path: String,
    #[serde(default = "default_mail_recipients")]
    pub recipients: Vec<String>,
    pub transport: AppMailTransportCfg,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AppInventoryCfg {
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: u32,
    #[serde(default = "default_restock_level")]
    pub restock_level: u32,
}

impl Default for AppInventoryCfg {
    fn default() -> Self {
        Self {
            low_stock_threshold: default_low_stock_threshold(),
            restock_level: default_restock_level(),
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "source")]
pub enum AppConfidentialCfg {
    UserSpace {
        #[serde(deserialize_with = "jsn_deny_empty_string")]
        sys_path: String,
    },
    Environment {
        #[serde(deserialize_with = "jsn_deny_empty_string")]
        prefix: String,
    }, // TODO, support kernel key management utility
}

#[allow(non_camel_case_types)]
#[derive(Deserialize, Debug)]
#[serde(tag = "mode")]
pub enum App3rdPartyCfg {
    dev {
        #[serde(deserialize_with = "jsn_deny_empty_string")]
        name: String,
        #[serde(deserialize_with = "jsn_deny_empty_string")]
        host: String,
        port: u16,
        #[serde(deserialize_with = "jsn_deny_empty_string")]
        confidentiality_path: String,
    },
    test {
        #[serde(deserialize_with = "jsn_deny_empty_string")]
        name: String,
        #[serde(deserialize_with = "jsn_deny_empty_string")]
        confidentiality_path: String,
    },
}

impl App3rdPartyCfg {
    pub fn name(&self) -> &str {
        match self {
            Self::dev { name, .. } | Self::test { name, .. } => name.as_str(),
        }
    }
}

#[allow(non_camel_case_types)]
#[derive(Deserialize, Debug, Clone)]
pub enum AppDbServerType {
    MariaDB,
    PostgreSQL,
}

#[derive(Deserialize, Debug)]
pub struct AppInMemoryDbCfg {
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub alias: String,
    pub max_items: u32,
}

#[derive(Deserialize, Debug)]
pub struct AppDbServerCfg {
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub alias: String,
    pub srv_type: AppDbServerType,
    pub max_conns: u32,
    pub acquire_timeout_secs: u16, // for acquiring connection from pool
    pub idle_timeout_secs: u16,
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub confidentiality_path: String,
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub db_name: String,
}

#[derive(Deserialize)]
#[serde(tag = "_type")]
pub enum AppDataStoreCfg {
    InMemory(AppInMemoryDbCfg),
    DbServer(AppDbServerCfg),
}

#[derive(Deserialize)]
pub struct ApiServerCfg {
    pub logging: AppLoggingCfg,
    pub listen: WebApiListenCfg,
    pub limit_req_body_in_bytes: usize,
    pub num_workers: u8,
    pub data_store: Vec<AppDataStoreCfg>,
    pub confidentiality: AppConfidentialCfg,
    pub third_parties: Vec<Arc<App3rdPartyCfg>>,
    pub mailing: AppMailingCfg,
    #[serde(default)]
    pub inventory: AppInventoryCfg,
}

pub struct AppBasepathCfg {
    pub system: String,
    pub service: String,
}

pub struct AppConfig {
    pub basepath: AppBasepathCfg,
    pub api_server: ApiServerCfg,
}

pub struct AppCfgHardLimit {
    pub nitems_per_inmem_table: u32,
    pub num_db_conns: u32,
    pub seconds_db_idle: u16,
}
pub struct AppCfgInitArgs {
    pub env_var_map: HashMap<String, String, RandomState>,
    pub limit: AppCfgHardLimit,
}

fn cfg_error(code: AppErrorCode, detail: Option<String>) -> AppCfgError {
    AppCfgError { code, detail }
}

impl AppConfig {
    pub fn new(args: AppCfgInitArgs) -> DefaultResult<Self, AppCfgError> {
        let AppCfgInitArgs {
            mut env_var_map,
            limit,
        } = args;
        let mut take_path = |label: &str, code: AppErrorCode| {
            env_var_map
                .remove(label)
                .ok_or_else(|| cfg_error(code, None))
        };
        let system = take_path(env_vars::SYS_BASEPATH, AppErrorCode::MissingSysBasePath)? + "/";
        let service =
            take_path(env_vars::SERVICE_BASEPATH, AppErrorCode::MissingAppBasePath)? + "/";
        let cfg_path = take_path(env_vars::CFG_FILEPATH, AppErrorCode::MissingConfigPath)?;
        let api_server = Self::parse_from_file(service.clone() + &cfg_path, limit)?;
        Ok(Self {
            api_server,
            basepath: AppBasepathCfg { system, service },
        })
    }

    pub fn parse_from_file(
        filepath: String,
        limit: AppCfgHardLimit,
    ) -> DefaultResult<ApiServerCfg, AppCfgError> {
        let fileobj = File::open(filepath)
            .map_err(|e| cfg_error(AppErrorCode::IOerror(e.kind()), Some(e.to_string())))?;
        let obj = serde_json::from_reader::<_, ApiServerCfg>(BufReader::new(fileobj))
            .map_err(|e| cfg_error(AppErrorCode::InvalidJsonFormat, Some(e.to_string())))?;
        Self::check_listener(&obj.listen)?;
        Self::check_logging(&obj.logging)?;
        Self::check_datastore(&obj.data_store, &limit)?;
        if obj.third_parties.is_empty() {
            let detail = Some("third-parties".to_string());
            return Err(cfg_error(AppErrorCode::NoPaymentGatewayCfg, detail));
        }
        Self::check_mailing(&obj.mailing)?;
        Self::check_inventory(&obj.inventory)?;
        Ok(obj)
    }

    fn check_listener(obj: &WebApiListenCfg) -> DefaultResult<(), AppCfgError> {
        if obj.routes.is_empty() {
            return Err(cfg_error(AppErrorCode::NoRouteApiServerCfg, None));
        }
        let numeric = obj
            .api_version
            .split('.')
            .all(|tok| tok.parse::<u16>().is_ok());
        if !numeric {
            let detail = Some("version must be numeric".to_string());
            return Err(cfg_error(AppErrorCode::InvalidVersion, detail));
        }
        let mut seen_paths = HashSet::new();
        for route in obj.routes.iter() {
            // same path may not appear twice, handler label is free to repeat
            if route.path.is_empty() || !seen_paths.insert(route.path.as_str()) {
                let detail = Some(route.to_string());
                return Err(cfg_error(AppErrorCode::InvalidRouteConfig, detail));
            }
        }
        Ok(())
    }

    fn check_logging(obj: &AppLoggingCfg) -> DefaultResult<(), AppCfgError> {
        if obj.handlers.is_empty() {
            return Err(cfg_error(AppErrorCode::NoLogHandlerCfg, None));
        } else if obj.loggers.is_empty() {
            return Err(cfg_error(AppErrorCode::NoLoggerCfg, None));
        }
        let mut hdlr_aliases = HashSet::new();
        for h in obj.handlers.iter() {
            if h.alias.is_empty() {
                return Err(cfg_error(AppErrorCode::MissingAliasLogHdlerCfg, None));
            }
            if matches!(h.destination, const_log::Destination::LOCALFS) && h.path.is_none() {
                let msg = format!("file-type handler does not contain path: {}", h.alias);
                return Err(cfg_error(AppErrorCode::InvalidHandlerLoggerCfg, Some(msg)));
            }
            if !hdlr_aliases.insert(h.alias.as_str()) {
                let msg = format!("duplicate handler alias: {}", h.alias);
                return Err(cfg_error(AppErrorCode::InvalidHandlerLoggerCfg, Some(msg)));
            }
        }
        for lgr in obj.loggers.iter() {
            if lgr.alias.is_empty() {
                return Err(cfg_error(AppErrorCode::MissingAliasLoggerCfg, None));
            } else if lgr.handlers.is_empty() {
                let msg = format!("the logger does not have handler: {}", lgr.alias);
                return Err(cfg_error(AppErrorCode::NoHandlerInLoggerCfg, Some(msg)));
            }
            let unknown = lgr
                .handlers
                .iter()
                .any(|a| !hdlr_aliases.contains(a.as_str()));
            if unknown {
                let msg = format!("the logger contains invalid handler alias: {}", lgr.alias);
                return Err(cfg_error(AppErrorCode::InvalidHandlerLoggerCfg, Some(msg)));
            }
        }
        Ok(())
    } // end of fn check_logging

    fn check_datastore(
        obj: &[AppDataStoreCfg],
        limit: &AppCfgHardLimit,
    ) -> DefaultResult<(), AppCfgError> {
        if obj.is_empty() {
            return Err(cfg_error(AppErrorCode::NoDatabaseCfg, None));
        }
        let exceeded = obj.iter().find_map(|item| match item {
            AppDataStoreCfg::InMemory(c) if c.max_items > limit.nitems_per_inmem_table => {
                Some(format!("limit:{}", limit.nitems_per_inmem_table))
            }
            AppDataStoreCfg::DbServer(c) if c.max_conns > limit.num_db_conns => {
                Some(format!("limit-conn:{}", limit.num_db_conns))
            }
            AppDataStoreCfg::DbServer(c) if c.idle_timeout_secs > limit.seconds_db_idle => {
                Some(format!("limit-idle-time:{}", limit.seconds_db_idle))
            }
            _others => None,
        });
        match exceeded {
            Some(detail) => Err(cfg_error(AppErrorCode::ExceedingMaxLimit, Some(detail))),
            None => Ok(()),
        }
    }

    fn check_mailing(obj: &AppMailingCfg) -> DefaultResult<(), AppCfgError> {
        let blank_found = obj.recipients.iter().any(|r| r.trim().is_empty());
        if obj.recipients.is_empty() || blank_found {
            let detail = Some("mailing-recipients".to_string());
            Err(cfg_error(AppErrorCode::NoMailRecipientCfg, detail))
        } else {
            Ok(())
        }
    }

    fn check_inventory(obj: &AppInventoryCfg) -> DefaultResult<(), AppCfgError> {
        // alert threshold above restock level would alert right after restocking
        if obj.restock_level == 0 || obj.low_stock_threshold > obj.restock_level {
            let msg = format!(
                "threshold:{}, restock-level:{}",
                obj.low_stock_threshold, obj.restock_level
            );
            Err(cfg_error(AppErrorCode::InvalidInventoryCfg, Some(msg)))
        } else {
            Ok(())
        }
    }
} // end of impl AppConfig

fn default_mail_recipients() -> Vec<String> {
    vec![const_inventory::ADMIN_EMAIL.to_string()]
}
fn default_low_stock_threshold() -> u32 {
    const_inventory::LOW_STOCK_THRESHOLD
}
fn default_restock_level() -> u32 {
    const_inventory::RESTOCK_LEVEL
}

struct ExpectNonEmptyString {
    min_len: u32,
}

impl Expected for ExpectNonEmptyString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        let msg = format!("minimum string length >= {}", self.min_len);
        formatter.write_str(msg.as_str())
    }
}

fn jsn_deny_empty_string<'de, D>(raw: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(raw)?;
    if s.is_empty() {
        let exp = ExpectNonEmptyString { min_len: 1 };
        Err(DeserializeError::invalid_length(s.len(), &exp))
    } else {
        Ok(s)
    }
}
