use std::result::Result;
use std::vec::Vec;

use serde::Serialize;
use serde_json::Value as JsnVal;

use crate::error::AppErrorCode;

#[derive(Default, Serialize)]
struct PyCeleryReqMetadata {
    callbacks: Option<Vec<String>>,
    errbacks: Option<Vec<String>>,
    chain: Option<Vec<String>>,
    chord: Option<String>,
}

/// message body of Celery task protocol v2 : `[args, kwargs, embed]`, all
/// fields of the given `inner` object are passed as keyword arguments
pub fn serialize_msg_body<T: Serialize>(inner: T) -> Result<Vec<u8>, (AppErrorCode, String)> {
    let map_err = |e: serde_json::Error| {
        let detail = e.to_string() + ", src: py-celery-serialize";
        (AppErrorCode::InvalidJsonFormat, detail)
    };
    let args = JsnVal::Array(Vec::new());
    let kwargs = serde_json::to_value(inner).map_err(map_err)?;
    if !kwargs.is_object() {
        let detail = "kwargs-not-object, src: py-celery-serialize".to_string();
        return Err((AppErrorCode::InvalidInput, detail));
    }
    let metadata = serde_json::to_value(PyCeleryReqMetadata::default()).map_err(map_err)?;
    let top = JsnVal::Array(vec![args, kwargs, metadata]);
    Ok(top.to_string().into_bytes())
}
