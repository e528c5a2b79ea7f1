use std::collections::HashMap;
use std::io::stderr;
use std::path::Path;

use tracing::dispatcher::Dispatch;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation as FileRotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::Layer as FmtLayer;
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;
use tracing_subscriber::{Layer as LayerIntf, Registry};

use crate::config::{AppBasepathCfg, AppLogHandlerCfg, AppLoggerCfg, AppLoggingCfg};
use crate::constant::logging::{Destination, Level, Rotation};
use crate::AppLogAlias;

pub type AppLogLevel = Level;

const MODPATH_SEPARATOR: &str = "::";
const FALLBACK_LOGFILE_NAME: &str = "storefront.log";

// converting to `tracing` level, note the ordering there is
// TRACE > DEBUG > INFO > WARN > ERROR
#[macro_export]
macro_rules! to_3rdparty_level {
    ($lvlin:expr) => {
        match $lvlin {
            $crate::logging::AppLogLevel::FATAL | $crate::logging::AppLogLevel::ERROR => {
                tracing::Level::ERROR
            }
            $crate::logging::AppLogLevel::WARNING => tracing::Level::WARN,
            $crate::logging::AppLogLevel::INFO => tracing::Level::INFO,
            $crate::logging::AppLogLevel::DEBUG => tracing::Level::DEBUG,
            $crate::logging::AppLogLevel::TRACE => tracing::Level::TRACE,
        }
    };
}

struct HandlerWriter {
    writer: NonBlocking,
    min_level: tracing::Level,
}

fn open_writer(basepath: &AppBasepathCfg, cfg: &AppLogHandlerCfg) -> (NonBlocking, WorkerGuard) {
    let rpath = match (&cfg.destination, cfg.path.as_ref()) {
        (Destination::LOCALFS, Some(p)) => p.as_str(),
        // file handler without path is rejected at config validation
        (Destination::LOCALFS, None) | (Destination::CONSOLE, _) => {
            return tracing_appender::non_blocking(std::io::stdout());
        }
    };
    let fullpath = Path::new(basepath.system.as_str()).join(rpath);
    let dir = fullpath.parent().unwrap_or(Path::new("."));
    let fname = fullpath
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or(FALLBACK_LOGFILE_NAME);
    let rotation = match cfg.rotation {
        Rotation::NEVER => FileRotation::NEVER,
        Rotation::DAILY => FileRotation::DAILY,
        Rotation::HOURLY => FileRotation::HOURLY,
    };
    let appender = RollingFileAppender::new(rotation, dir, fname);
    tracing_appender::non_blocking(appender)
}

fn build_dispatch(cfg: &AppLoggerCfg, writers: &HashMap<AppLogAlias, HandlerWriter>) -> Dispatch {
    let layers = cfg
        .handlers
        .iter()
        .filter_map(|alias| writers.get(alias))
        .map(|hw| {
            // logger-level override takes precedence over the handler's own
            let lvl = match cfg.level.as_ref() {
                Some(l) => to_3rdparty_level!(l),
                None => hw.min_level,
            };
            FmtLayer::new()
                .with_writer(hw.writer.clone())
                .with_file(false)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_target(true)
                .with_filter(LevelFilter::from_level(lvl))
        })
        .collect::<Vec<_>>();
    Dispatch::new(Registry::default().with(layers))
}

/// Named set of log dispatchers, each keyed by a module path. An event
/// emitted from module `a::b::c` goes to the logger `a::b::c` if configured,
/// otherwise to the nearest configured ancestor such as `a::b`.
pub struct AppLogContext {
    dispatchers: HashMap<AppLogAlias, Dispatch>,
    // non-blocking writers stop flushing once their guard is dropped
    _io_guards: Vec<WorkerGuard>,
}

impl AppLogContext {
    pub fn new(basepath: &AppBasepathCfg, cfg: &AppLoggingCfg) -> Self {
        let mut writers = HashMap::new();
        let mut _io_guards = Vec::with_capacity(cfg.handlers.len());
        for hcfg in cfg.handlers.iter() {
            let (writer, guard) = open_writer(basepath, hcfg);
            let hw = HandlerWriter {
                writer,
                min_level: to_3rdparty_level!(&hcfg.min_level),
            };
            writers.insert(hcfg.alias.clone(), hw);
            _io_guards.push(guard);
        }
        let dispatchers = cfg
            .loggers
            .iter()
            .map(|lcfg| (lcfg.alias.clone(), build_dispatch(lcfg, &writers)))
            .collect();
        Self {
            dispatchers,
            _io_guards,
        }
    }

    pub fn get_assigner(&self, modpath: &str) -> Option<&Dispatch> {
        let mut key = modpath;
        loop {
            if let Some(d) = self.dispatchers.get(&key.to_string()) {
                return Some(d);
            }
            let (parent, _child) = key.rsplit_once(MODPATH_SEPARATOR)?;
            key = parent;
        }
    }

    /// last resort for events from a module without any configured logger
    pub fn report_orphan(modpath: &str, msg: std::fmt::Arguments) {
        use std::io::Write;
        let _ = writeln!(stderr(), "[no-logger:{modpath}] {msg}");
    }
} // end of impl AppLogContext

#[macro_export]
macro_rules! app_log_event {
    ( $ctx:ident, $lvl:expr, $($arg:tt)+ ) => {{
        const MOD_PATH: &str = module_path!();
        match $ctx.get_assigner(MOD_PATH) {
            Some(assigner) => {
                const LVL_INNER: tracing::Level = $crate::logging::to_3rdparty_level!($lvl);
                tracing::dispatcher::with_default(assigner, || {
                    tracing::event!(LVL_INNER, $($arg)+);
                });
            }
            None => $crate::logging::AppLogContext::report_orphan(
                MOD_PATH,
                format_args!($($arg)+),
            ),
        }
    }};
}

pub use app_log_event;
pub use to_3rdparty_level;
