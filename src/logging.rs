//=========================================================================
// Logging
//
// One-time setup of the `env_logger` backend behind the `log` facade.
//
// Logs go to stderr so they never interleave with the game's own output
// on stdout; `RUST_LOG=debug crystal-collector 2>engine.log` keeps the
// board clean while recording every stack operation.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Once;

use env_logger::{Builder, Target, WriteStyle};
use log::LevelFilter;

//=== LoggingConfig =======================================================

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. `"info"`,
/// `"lantern_engine=debug"`). When unset, `RUST_LOG` is used, then `info`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: WriteStyle,
}

impl LoggingConfig {
    /// Config with an explicit filter.
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            env_filter: Some(filter.into()),
            ..Self::default()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: WriteStyle::Auto,
        }
    }
}

//=== init_logging ========================================================

static INIT: Once = Once::new();

/// Installs the global logger.
///
/// Only the first call does anything. Returns `true` if that call
/// installed the logger (it fails if another logger was set already).
pub fn init_logging(config: LoggingConfig) -> bool {
    let mut installed = false;

    INIT.call_once(|| {
        let mut builder = Builder::new();

        match config.env_filter.or_else(|| std::env::var("RUST_LOG").ok()) {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                builder.filter_level(LevelFilter::Info);
            }
        }

        builder.write_style(config.write_style).target(Target::Stderr);

        installed = builder.try_init().is_ok();
        log::debug!("logging initialized");
    });

    installed
}

//=========================================================================
// Unit Tests
//=========================================================================
