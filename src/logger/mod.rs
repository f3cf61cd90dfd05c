//! Opt-in diagnostics output. The library only emits `tracing` events; call
//! [`init_logger`] from a binary or test to see them on stderr.

mod config;
mod formatter;

pub use config::{LogLevel, LoggerConfig};
pub use formatter::FsFormatter;

use std::sync::Once;
use tracing_subscriber::{
    fmt::{self},
    EnvFilter,
};

static INIT: Once = Once::new();

/// Installs the global subscriber once per process. `RUST_LOG` takes
/// precedence over `config.level`.
pub fn init_logger(config: &LoggerConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.level.as_filter()));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);

        // try_init: another subscriber may already be installed by the host
        let installed = if config.colored {
            builder
                .event_format(FsFormatter::new(config.show_target))
                .try_init()
        } else {
            let format = fmt::format()
                .with_level(true)
                .with_target(config.show_target)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false);
            builder.event_format(format).try_init()
        };

        if let Err(e) = installed {
            eprintln!("fshelpers: logger not installed: {}", e);
        }
    });
}
