use std::collections::HashMap;
use std::env;
use std::result::Result as DefaultResult;

use serde_json::Value as JsnVal;

use super::AbstractConfidentiality;
use crate::error::{AppConfidentialityError, AppErrorCode};

/// Maps a confidential path to environment variable, e.g. with prefix
/// `STOREFRONT` the path `razorpay/key_id` is read from
/// `STOREFRONT_RAZORPAY_KEY_ID`
pub struct EnvVarConfidentiality {
    _prefix: String,
    // snapshot taken at build time, later changes to process environment are not visible
    _snapshot: HashMap<String, String>,
}

impl EnvVarConfidentiality {
    pub fn build(prefix: &str) -> Self {
        let _prefix = prefix.to_uppercase();
        let pattern = _prefix.clone() + "_";
        let iter = env::vars().filter(|(k, _v)| k.starts_with(pattern.as_str()));
        Self {
            _prefix,
            _snapshot: HashMap::from_iter(iter),
        }
    }

    pub fn var_name(&self, id_: &str) -> String {
        let suffix = id_
            .split('/')
            .filter(|tok| !tok.is_empty())
            .map(|tok| tok.replace('-', "_").to_uppercase())
            .collect::<Vec<_>>()
            .join("_");
        format!("{}_{}", self._prefix, suffix)
    }
}

impl AbstractConfidentiality for EnvVarConfidentiality {
    fn try_get_payload(&self, id_: &str) -> DefaultResult<String, AppConfidentialityError> {
        let key = self.var_name(id_);
        let raw = self
            ._snapshot
            .get(key.as_str())
            .ok_or(AppConfidentialityError {
                code: AppErrorCode::NoConfidentialityCfg,
                detail: format!("env-var-missing: {key}"),
            })?;
        if raw.is_empty() {
            return Err(AppConfidentialityError {
                code: AppErrorCode::EmptyInputData,
                detail: format!("env-var-empty: {key}"),
            });
        }
        // structured secret (e.g. database credential) is given as JSON object
        let trimmed = raw.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            serde_json::from_str::<JsnVal>(raw.as_str())
                .map(|v| v.to_string())
                .map_err(|e| AppConfidentialityError {
                    code: AppErrorCode::InvalidJsonFormat,
                    detail: format!("{key}, {e}"),
                })
        } else {
            Ok(JsnVal::String(raw.clone()).to_string())
        }
    }
}
