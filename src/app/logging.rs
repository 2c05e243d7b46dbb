//! Usage: Process-wide tracing setup (stdout + optional daily rolling file) and panic hook.

use crate::infra::settings::LogSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_PREFIX: &str = "tenxr-web-portal.log";

/// Keeps the file writer alive; dropping it flushes pending log lines.
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

fn build_filter(settings: &LogSettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(settings.level.as_str()))
        .unwrap_or_else(|err| {
            eprintln!("invalid log level {:?}: {err}; using info", settings.level);
            EnvFilter::new("info")
        })
}

pub(crate) fn init(settings: &LogSettings) -> LoggingGuard {
    // Bridge `log` records from dependencies into tracing.
    let _ = tracing_log::LogTracer::init();

    let (file_layer, file_guard) = match settings.dir.as_deref() {
        Some(dir) => match std::fs::create_dir_all(dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(writer);
                (Some(layer), Some(guard))
            }
            Err(err) => {
                eprintln!("log dir {} unavailable: {err}", dir.display());
                (None, None)
            }
        },
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(build_filter(settings))
        .with(fmt::layer().with_target(true))
        .with(file_layer);

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("tracing subscriber already installed");
    }

    install_panic_hook();

    if let Some(dir) = settings.dir.as_deref() {
        tracing::info!(dir = %dir.display(), "file logging enabled");
    }

    LoggingGuard { _file: file_guard }
}

fn install_panic_hook() {
    // Payload is not logged; it may carry request data.
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());
        tracing::error!(
            location = %location,
            "PANIC: portal panicked at {location}. Check the log file for context leading up to this panic."
        );
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_level_falls_back_to_info() {
        let settings = LogSettings {
            level: "portal=loud".to_string(),
            dir: None,
        };
        if std::env::var_os("RUST_LOG").is_none() {
            assert_eq!(build_filter(&settings).to_string(), "info");
        }
    }

    #[test]
    fn configured_level_is_used() {
        let settings = LogSettings {
            level: "tenxr_web_portal_lib=debug".to_string(),
            dir: None,
        };
        if std::env::var_os("RUST_LOG").is_none() {
            assert_eq!(
                build_filter(&settings).to_string(),
                "tenxr_web_portal_lib=debug"
            );
        }
    }
}
