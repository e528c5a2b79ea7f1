use std::boxed::Box;
use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use deadpool_lapin::{Config as DeadpConfig, Pool, PoolConfig, Runtime, Timeouts as DeadpTimeouts};
use lapin::options::{BasicPublishOptions, ConfirmSelectOptions};
use lapin::protocol::basic::AMQPProperties;
use lapin::publisher_confirm::Confirmation;
use lapin::types::{AMQPValue, FieldTable, LongString};
use lapin::{ConnectionProperties, Error as LapinError};
use serde::{Deserialize, Serialize};

use storefront_common::adapter::rpc::py_celery;
use storefront_common::confidentiality::AbstractConfidentiality;
use storefront_common::config::AppMailAmqpCfg;
use storefront_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use super::{AbstractMailer, AppMailError, AppMailErrorFnLabel, AppMailErrorReason};
use crate::app_meta;
use crate::model::LowStockAlertModel;

#[allow(clippy::upper_case_acronyms)]
#[derive(Deserialize)]
struct SECRET {
    host: String,
    port: u16,
    username: String,
    password: String,
}

// keyword arguments of the remote mail task
#[derive(Serialize)]
struct MailTaskKwargs<'a> {
    sender: &'a str,
    recipients: &'a [String],
    subject: &'a str,
    body: &'a str,
}

struct MailTaskRoute {
    exchange: String,
    routing_key: String,
    durable: bool,
    task_name: String,
}

pub(super) struct AppAmqpMailer {
    _logctx: Arc<AppLogContext>,
    _pool: Pool,
    _route: MailTaskRoute,
    sender: String,
    recipients: Vec<String>,
}

impl From<LapinError> for AppMailErrorReason {
    fn from(value: LapinError) -> Self {
        match value {
            LapinError::IOError(ioe) => Self::SysIo(ioe.kind(), ioe.to_string()),
            LapinError::ChannelsLimitReached => Self::InternalConfig("channel-limit".to_string()),
            LapinError::InvalidChannel(num) => {
                Self::InternalConfig(format!("invalid-channel: {num}"))
            }
            LapinError::InvalidConnectionState(state) => {
                Self::LowLevelConn(format!("conn-state: {:?}", state))
            }
            LapinError::InvalidChannelState(state) => {
                Self::LowLevelConn(format!("channel-state: {:?}", state))
            }
            LapinError::ProtocolError(e) => Self::LowLevelConn(e.to_string()),
            LapinError::MissingHeartbeatError => {
                Self::LowLevelConn("amqp-no-heartbeat".to_string())
            }
            _others => Self::NotSupport,
        }
    }
}

impl AppAmqpMailer {
    pub(super) fn try_build(
        app_cfg: &AppMailAmqpCfg,
        cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
        sender: String,
        recipients: Vec<String>,
        _logctx: Arc<AppLogContext>,
    ) -> Result<Self, AppMailError> {
        let uri = Self::_setup_broker_uri(app_cfg, cfdntl)?;
        let cfg = Self::_setup_lapin_config(app_cfg, uri);
        let _pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| Self::_map_err_init(AppMailErrorReason::LowLevelConn(e.to_string())))?;
        let bind = &app_cfg.binding;
        let _route = MailTaskRoute {
            exchange: bind.exchange.clone(),
            routing_key: bind.routing_key.clone(),
            durable: bind.durable,
            task_name: bind.python_celery_task.clone(),
        };
        Ok(Self {
            _logctx,
            _pool,
            _route,
            sender,
            recipients,
        })
    }

    // `deadpool-lapin` only accepts broker URI as formatted string
    fn _setup_broker_uri(
        app_cfg: &AppMailAmqpCfg,
        cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
    ) -> Result<String, AppMailError> {
        let serial = cfdntl
            .try_get_payload(app_cfg.confidential_path.as_str())
            .map_err(|_e| Self::_map_err_init(AppMailErrorReason::InvalidCredential))?;
        let secret = serde_json::from_str::<SECRET>(serial.as_str())
            .map_err(|_e| Self::_map_err_init(AppMailErrorReason::CorruptedCredential))?;
        let out = format!(
            "amqp://{}:{}@{}:{}/{}?channel_max={}&heartbeat={}",
            secret.username,
            secret.password,
            secret.host,
            secret.port,
            app_cfg.attributes.vhost.as_str(),
            app_cfg.attributes.max_channels,
            app_cfg.attributes.timeout_secs,
        );
        Ok(out)
    }

    fn _setup_lapin_config(app_cfg: &AppMailAmqpCfg, uri: String) -> DeadpConfig {
        let timeout_secs = (app_cfg.attributes.timeout_secs as u64) << 2;
        let timeouts = DeadpTimeouts {
            wait: Some(std::time::Duration::new(timeout_secs, 0)),
            create: Some(std::time::Duration::new(timeout_secs, 0)),
            recycle: None,
        };
        let mut poolcfg = PoolConfig::new(app_cfg.max_connections as usize);
        poolcfg.timeouts = timeouts;
        DeadpConfig {
            connection_properties: ConnectionProperties::default(),
            url: Some(uri),
            pool: Some(poolcfg),
        }
    }

    fn convert_confirm_to_error(value: Confirmation) -> Result<(), AppMailErrorReason> {
        let detail = match value {
            // `confirm-select` did not take effect
            Confirmation::NotRequested => Some("amqp-confirm-failure".to_string()),
            Confirmation::Nack(_msg) => Some("amqp-unexpected-nack".to_string()),
            Confirmation::Ack(msg) => msg.map(|r| {
                format!(
                    "acker: {:?}, reply-code: {:?}, reply-detail: {:?}",
                    r.acker, r.reply_code, r.reply_text
                )
            }),
        };
        detail.map_or_else(|| Ok(()), |d| Err(AppMailErrorReason::PublishConfirm(d)))
    }

    fn _map_err_init(reason: AppMailErrorReason) -> AppMailError {
        AppMailError {
            fn_label: AppMailErrorFnLabel::InitCtx,
            reason,
        }
    }
    fn _map_err_send(reason: AppMailErrorReason) -> AppMailError {
        AppMailError {
            fn_label: AppMailErrorFnLabel::Send,
            reason,
        }
    }
} // end of impl AppAmqpMailer

#[async_trait]
impl AbstractMailer for AppAmqpMailer {
    fn sender(&self) -> &str {
        self.sender.as_str()
    }
    fn recipients(&self) -> &[String] {
        &self.recipients
    }

    async fn send(&self, msg: LowStockAlertModel) -> Result<(), AppMailError> {
        let route = &self._route;
        let message = {
            let kwargs = MailTaskKwargs {
                sender: msg.sender.as_str(),
                recipients: &msg.recipients,
                subject: msg.subject.as_str(),
                body: msg.body.as_str(),
            };
            py_celery::serialize_msg_body(kwargs).map_err(|(code, detail)| {
                Self::_map_err_send(AppMailErrorReason::Serialize(code, detail))
            })?
        };
        let now = Local::now().to_utc();
        let task_id = format!(
            "{}.lowstock.{}",
            app_meta::LABEL,
            now.format("%Y%m%d.%H%M%S%.9f")
        );
        let headers = {
            let mut h = FieldTable::default();
            let pairs = [
                ("lang", "py"),
                ("task", route.task_name.as_str()),
                ("id", task_id.as_str()),
            ];
            for (k, v) in pairs {
                h.insert(k.into(), AMQPValue::LongString(LongString::from(v)));
            }
            h
        }; // celery worker looks up the task by header, not by routing key
        let properties = AMQPProperties::default()
            .with_correlation_id(task_id.as_str().into())
            .with_app_id(app_meta::LABEL.into())
            .with_content_encoding("utf-8".into())
            .with_content_type("application/json".into())
            .with_headers(headers)
            .with_delivery_mode(if route.durable { 2 } else { 1 })
            .with_timestamp(now.timestamp() as u64);

        let conn = self
            ._pool
            .get()
            .await
            .map_err(|e| Self::_map_err_send(AppMailErrorReason::LowLevelConn(e.to_string())))?;
        let chn = conn
            .create_channel()
            .await
            .map_err(|e| Self::_map_err_send(e.into()))?;
        chn.confirm_select(ConfirmSelectOptions { nowait: false })
            .await
            .map_err(|e| Self::_map_err_send(e.into()))?;
        // broker returns unroutable message when the routing key goes wrong
        let confirm = chn
            .basic_publish(
                route.exchange.as_str(),
                route.routing_key.as_str(),
                BasicPublishOptions {
                    mandatory: true,
                    immediate: false,
                },
                &message,
                properties,
            )
            .await
            .map_err(|e| Self::_map_err_send(e.into()))?
            .await
            .map_err(|e| Self::_map_err_send(e.into()))?;
        let logctx = &self._logctx;
        app_log_event!(
            logctx,
            AppLogLevel::DEBUG,
            "task-id:{}, publish-confirm: {:?}",
            task_id.as_str(),
            confirm
        );
        Self::convert_confirm_to_error(confirm).map_err(Self::_map_err_send)
    } // end of fn send
} // end of impl AppAmqpMailer
