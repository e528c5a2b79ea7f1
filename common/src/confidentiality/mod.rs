mod environ;
mod userspace;

use std::boxed::Box;
use std::marker::{Send, Sync};
use std::result::Result as DefaultResult;

use crate::config::{AppConfidentialCfg, AppConfig};
use crate::error::AppConfidentialityError;

pub use environ::EnvVarConfidentiality;
pub use userspace::UserSpaceConfidentiality;

pub fn build_context(
    cfg: &AppConfig,
) -> DefaultResult<Box<dyn AbstractConfidentiality>, AppConfidentialityError> {
    let confidential = &cfg.api_server.confidentiality;
    let obj: Box<dyn AbstractConfidentiality> = match confidential {
        AppConfidentialCfg::UserSpace { sys_path } => {
            let fullpath = cfg.basepath.system.clone() + sys_path;
            Box::new(UserSpaceConfidentiality::build(fullpath))
        }
        AppConfidentialCfg::Environment { prefix } => {
            Box::new(EnvVarConfidentiality::build(prefix.as_str()))
        }
    };
    Ok(obj)
}

pub trait AbstractConfidentiality: Send + Sync {
    // read-only interface to fetch user-defined private data, the returned
    // string is always serialised JSON value
    fn try_get_payload(&self, id_: &str) -> DefaultResult<String, AppConfidentialityError>;
}
