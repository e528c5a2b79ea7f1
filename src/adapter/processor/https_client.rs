use std::io::{Error as IoError, ErrorKind};
use std::result::Result;
use std::sync::Arc;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::client::conn::http1::handshake;
use hyper::header::{HeaderName, HeaderValue, HOST};
use hyper::{Error as HyperError, Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tokio_native_tls::{native_tls, TlsConnector};

use storefront_common::logging::{app_log_event, AppLogContext, AppLogLevel};

#[derive(Debug)]
pub enum GatewayHttpsErrorKind {
    Connect(ErrorKind, String),
    Tls(String),
    // closed, cancelled or malformed exchange after connection is established
    Exchange { timeout: bool, detail: String },
    InvalidRequest(String),
    Serialise(String),
}

#[derive(Debug)]
pub struct GatewayHttpsError {
    pub kind: GatewayHttpsErrorKind,
}

impl From<IoError> for GatewayHttpsError {
    fn from(value: IoError) -> Self {
        let kind = GatewayHttpsErrorKind::Connect(value.kind(), value.to_string());
        Self { kind }
    }
}
impl From<native_tls::Error> for GatewayHttpsError {
    fn from(value: native_tls::Error) -> Self {
        let kind = GatewayHttpsErrorKind::Tls(value.to_string());
        Self { kind }
    }
}
impl From<HyperError> for GatewayHttpsError {
    fn from(value: HyperError) -> Self {
        let kind = GatewayHttpsErrorKind::Exchange {
            timeout: value.is_timeout(),
            detail: value.to_string(),
        };
        Self { kind }
    }
}
impl From<hyper::http::Error> for GatewayHttpsError {
    fn from(value: hyper::http::Error) -> Self {
        let kind = GatewayHttpsErrorKind::InvalidRequest(value.to_string());
        Self { kind }
    }
}

pub(super) fn secure_connector() -> Result<TlsConnector, GatewayHttpsError> {
    let mut builder = native_tls::TlsConnector::builder();
    builder.min_protocol_version(Some(native_tls::Protocol::Tlsv12));
    Ok(builder.build()?.into())
}

/// HTTP/1 client bound to a single remote host. Every request opens its own
/// TLS connection which is dropped once the response body is read.
pub(super) struct GatewayHttpsClient {
    connector: TlsConnector,
    host: String,
    port: u16,
    // sent with every request, e.g. credential of the merchant account
    fixed_headers: Vec<(HeaderName, HeaderValue)>,
    logctx: Arc<AppLogContext>,
}

impl GatewayHttpsClient {
    pub(super) fn new(
        connector: TlsConnector,
        host: String,
        port: u16,
        fixed_headers: Vec<(HeaderName, HeaderValue)>,
        logctx: Arc<AppLogContext>,
    ) -> Self {
        Self {
            connector,
            host,
            port,
            fixed_headers,
            logctx,
        }
    }

    pub(super) async fn send(
        &self,
        method: Method,
        path: &str,
        headers: Vec<(HeaderName, HeaderValue)>,
        body: Vec<u8>,
    ) -> Result<(StatusCode, Vec<u8>), GatewayHttpsError> {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header(HOST, self.host.as_str());
        for (k, v) in self.fixed_headers.iter().chain(headers.iter()) {
            builder = builder.header(k, v);
        }
        let req = builder.body(Full::new(Bytes::from(body)))?;

        let logctx = &self.logctx;
        let (host, port) = (self.host.as_str(), self.port);
        let tcp_stream = TcpStream::connect((host, port)).await.map_err(|e| {
            app_log_event!(logctx, AppLogLevel::ERROR, "tcp-conn, {host}:{port}, {:?}", e);
            GatewayHttpsError::from(e)
        })?;
        let tls_stream = self.connector.connect(host, tcp_stream).await?;
        let (mut sender, conn) = handshake(TokioIo::new(tls_stream)).await?;
        let logctx_cpy = logctx.clone();
        let _handle = tokio::spawn(async move {
            if let Err(e) = conn.await {
                app_log_event!(logctx_cpy, AppLogLevel::WARNING, "conn-closed, {:?}", e);
            }
        });

        let resp = sender.send_request(req).await.map_err(|e| {
            app_log_event!(logctx, AppLogLevel::WARNING, "send-req, {host}, {:?}", e);
            GatewayHttpsError::from(e)
        })?;
        let status = resp.status();
        let collected = resp.into_body().collect().await?.to_bytes();
        if !status.is_success() {
            app_log_event!(
                logctx,
                AppLogLevel::INFO,
                "{host}:{port}, path:{path}, status:{}",
                status.as_u16()
            );
        }
        Ok((status, collected.to_vec()))
    } // end of fn send
} // end of impl GatewayHttpsClient
