use std::result::Result;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as B64_STANDARD;
use base64::Engine;
use hyper::header::{HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use hyper::{Method, StatusCode};
use serde::ser::Serialize;
use tokio_native_tls::TlsConnector;

use storefront_common::logging::AppLogContext;

use super::super::https_client::{GatewayHttpsClient, GatewayHttpsError, GatewayHttpsErrorKind};

const API_VERSION: &str = "v1";

fn header_value(raw: &str) -> Result<HeaderValue, GatewayHttpsError> {
    HeaderValue::from_str(raw).map_err(|e| GatewayHttpsError {
        kind: GatewayHttpsErrorKind::InvalidRequest(e.to_string()),
    })
}

/// REST client authenticated with the merchant key pair
pub(super) struct AppRazorpayClient {
    inner: GatewayHttpsClient,
}

impl AppRazorpayClient {
    pub(super) fn try_build(
        connector: TlsConnector,
        host: String,
        port: u16,
        key_id: &str,
        key_secret: &str,
        logctx: Arc<AppLogContext>,
    ) -> Result<Self, GatewayHttpsError> {
        let cred = B64_STANDARD.encode(format!("{key_id}:{key_secret}"));
        let auth = header_value(format!("Basic {cred}").as_str())?;
        let fixed: Vec<(HeaderName, HeaderValue)> = vec![
            (AUTHORIZATION, auth),
            (ACCEPT, header_value("application/json")?),
        ];
        let inner = GatewayHttpsClient::new(connector, host, port, fixed, logctx);
        Ok(Self { inner })
    }

    pub(super) async fn post_json<S>(
        &self,
        resource_path: &str,
        body_obj: &S,
    ) -> Result<(StatusCode, Vec<u8>), GatewayHttpsError>
    where
        S: Serialize + Sync,
    {
        let body = serde_json::to_vec(body_obj).map_err(|e| GatewayHttpsError {
            kind: GatewayHttpsErrorKind::Serialise(e.to_string()),
        })?;
        let headers = vec![(CONTENT_TYPE, header_value("application/json")?)];
        let uri = format!("/{API_VERSION}{resource_path}");
        self.inner
            .send(Method::POST, uri.as_str(), headers, body)
            .await
    }
}
