use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::mem::drop;
use std::result::Result as DefaultResult;
use std::sync::RwLock;

use serde_json::Value as JsnVal;

use super::AbstractConfidentiality;
use crate::error::{AppConfidentialityError, AppErrorCode};

const SOURCE_SIZE_LIMIT_NBYTES: u64 = 8196;

pub struct UserSpaceConfidentiality {
    _src_fullpath: String,
    // the inner cache should NOT be large, so far the modules interacting with
    // this handler are : (1) database server (2) payment gateway (3) mail transport
    _cached: RwLock<HashMap<String, String>>,
}

impl UserSpaceConfidentiality {
    pub fn build(fullpath: String) -> Self {
        let _cached = RwLock::new(HashMap::new());
        Self {
            _cached,
            _src_fullpath: fullpath,
        }
    }

    fn rawdata_from_source(&self) -> DefaultResult<Vec<u8>, AppConfidentialityError> {
        let srcpath = self._src_fullpath.as_str();
        let map_io_err = |e: std::io::Error| AppConfidentialityError {
            detail: e.to_string(),
            code: AppErrorCode::IOerror(e.kind()),
        };
        let mut file = File::open(srcpath).map_err(map_io_err)?;
        let actual_f_sz = file.metadata().map_err(map_io_err)?.len();
        if actual_f_sz < SOURCE_SIZE_LIMIT_NBYTES {
            let mut rawbuf = Vec::new();
            let _sz = file.read_to_end(&mut rawbuf).map_err(map_io_err)?;
            Ok(rawbuf)
        } else {
            Err(AppConfidentialityError {
                code: AppErrorCode::ExceedingMaxLimit,
                detail: "source-file".to_string(),
            })
        }
    } // end of rawdata_from_source

    fn search_json_payload<'a>(
        toplvl: &'a JsnVal,
        id_: &str,
    ) -> DefaultResult<&'a JsnVal, AppConfidentialityError> {
        let mut curr_lvl = toplvl;
        for tok in id_.split('/') {
            let err_detail = match curr_lvl {
                JsnVal::Object(o) => match o.get(tok) {
                    Some(nxtlvl) => {
                        curr_lvl = nxtlvl;
                        None
                    }
                    None => Some(format!("json-object,id:{}", id_)),
                },
                JsnVal::Array(a) => match tok.parse::<usize>() {
                    Ok(t) => match a.get(t) {
                        Some(nxtlvl) => {
                            curr_lvl = nxtlvl;
                            None
                        }
                        None => Some(format!("json-array,id:{}", id_)),
                    },
                    Err(e) => Some(format!("path-error,id:{},detail:{}", id_, e)),
                },
                _others => Some(format!("json-scalar,id:{}", id_)),
            };
            if let Some(detail) = err_detail {
                return Err(AppConfidentialityError {
                    detail,
                    code: AppErrorCode::NoConfidentialityCfg,
                });
            }
        } // end of loop
        Ok(curr_lvl)
    } // end of fn search_json_payload

    fn lock_error(detail: String) -> AppConfidentialityError {
        AppConfidentialityError {
            detail: detail + ", source: UserSpaceConfidentiality",
            code: AppErrorCode::AcquireLockFailure,
        }
    }
} // end of impl UserSpaceConfidentiality

impl AbstractConfidentiality for UserSpaceConfidentiality {
    fn try_get_payload(&self, id_: &str) -> DefaultResult<String, AppConfidentialityError> {
        let rguard = self
            ._cached
            .read()
            .map_err(|e| Self::lock_error(e.to_string()))?;
        if let Some(v) = rguard.get(id_) {
            return Ok(v.clone());
        }
        drop(rguard);
        let rawdata = self.rawdata_from_source()?;
        let toplvl =
            serde_json::from_slice::<JsnVal>(&rawdata).map_err(|e| AppConfidentialityError {
                code: AppErrorCode::InvalidJsonFormat,
                detail: e.to_string(),
            })?;
        let found = Self::search_json_payload(&toplvl, id_)?.to_string();
        let mut wguard = self
            ._cached
            .write()
            .map_err(|e| Self::lock_error(e.to_string()))?;
        let _old_data = wguard.insert(id_.to_string(), found.clone());
        Ok(found)
    } // end of fn try_get_payload
} // end of impl AbstractConfidentiality
