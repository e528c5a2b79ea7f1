use std::collections::HashMap;
use std::env;

use actix_cors::Cors;
use actix_web::http::Method;
use actix_web::rt;
use actix_web::web::{Data as WebData, JsonConfig, PayloadConfig};

use storefront::api::web::AppRouteTable;
use storefront::network::{app_web_service, net_server_listener};
use storefront::{hard_limit, AppSharedState};
use storefront_common::config::{AppCfgHardLimit, AppCfgInitArgs, AppConfig, WebApiCorsCfg};
use storefront_common::constant::env_vars::EXPECTED_LABELS;
use storefront_common::logging::{app_log_event, AppLogLevel};

fn cors_middleware(cfg: &WebApiCorsCfg) -> Cors {
    let allow_any = cfg.allow_origins.iter().any(|o| o.as_str() == "*");
    let base = if allow_any {
        Cors::default().allow_any_origin()
    } else {
        cfg.allow_origins
            .iter()
            .fold(Cors::default(), |c, origin| c.allowed_origin(origin.as_str()))
    };
    base.allowed_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_any_header()
        .max_age(cfg.preflight_max_age_secs)
}

async fn start_server(shr_state: AppSharedState) {
    let log_ctx_p = shr_state.log_context();
    let cfg = shr_state.config();
    let listener = &cfg.api_server.listen;
    let body_limit = cfg.api_server.limit_req_body_in_bytes;
    let api_version = listener.api_version.clone();
    let path_prefix = listener.path_prefix.clone();
    let cfg_routes = listener.routes.clone();
    let cors_cfg = listener.cors.clone();
    let shr_state_cpy = shr_state.clone();
    /*
     * `App` instance is created on each server worker thread, the shared state
     * is initialized outside the factory closure then cloned into each `App`
     * instance, the closure is therefore `Fn()` instead of `FnOnce()`.
     * */
    let app_init = move || {
        let route_table = AppRouteTable::get(api_version.as_str());
        let label = route_table.version.clone();
        let (app, num_applied) =
            app_web_service(route_table, path_prefix.as_str(), cfg_routes.clone());
        if num_applied == 0 {
            let logctx = shr_state_cpy.log_context();
            app_log_event!(logctx, AppLogLevel::ERROR, "no-route-applied, table:{label}");
        }
        app.app_data(WebData::new(shr_state_cpy.clone()))
            .app_data(PayloadConfig::new(body_limit))
            .app_data(JsonConfig::default().limit(body_limit))
            .wrap(cors_middleware(&cors_cfg))
    };
    let result = net_server_listener(app_init, listener.host.as_str(), listener.port);
    let ht_srv = match result {
        Ok(v) => v
            .workers((cfg.api_server.num_workers as usize).max(1))
            .max_connections(listener.max_connections as usize),
        Err(e) => {
            app_log_event!(log_ctx_p, AppLogLevel::ERROR, "server-bind-error: {:?}", e);
            return;
        }
    };
    app_log_event!(
        log_ctx_p,
        AppLogLevel::INFO,
        "API server starting at {}:{}",
        listener.host,
        listener.port
    );
    if let Err(e) = ht_srv.run().await {
        app_log_event!(log_ctx_p, AppLogLevel::ERROR, "server-run-error: {:?}", e);
    } else {
        app_log_event!(log_ctx_p, AppLogLevel::WARNING, "API server terminating");
    }
} // end of fn start_server

fn main() {
    let iter = env::vars().filter(|(k, _v)| EXPECTED_LABELS.contains(&k.as_str()));
    let args = AppCfgInitArgs {
        env_var_map: HashMap::from_iter(iter),
        limit: AppCfgHardLimit {
            nitems_per_inmem_table: hard_limit::MAX_ITEMS_INMEM_TABLE,
            num_db_conns: hard_limit::MAX_DB_CONNECTIONS,
            seconds_db_idle: hard_limit::MAX_SECONDS_DB_IDLE,
        },
    };
    let cfg = match AppConfig::new(args) {
        Ok(v) => v,
        Err(e) => {
            println!("app failed to configure, error: {:?}", e);
            return;
        }
    };
    // database pool and AMQP pool spawn their background tasks on creation,
    // the shared state has to be built within the runtime
    let runner = rt::System::new();
    runner.block_on(async move {
        match AppSharedState::new(cfg) {
            Ok(shr_state) => start_server(shr_state).await,
            Err(e) => {
                println!("app failed to init shared state, error: {:?}", e);
            }
        }
    });
} // end of main
