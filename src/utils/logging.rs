//! Module-gated logging macros.
//!
//! Chatty background code (the activity sampler logs once per tick) can be
//! silenced per module without touching `RUST_LOG`. A module opts in by
//! defining the gate and importing the macros from the crate root:
//!
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_debug, log_warn};
//!
//! log_debug!("sampled {app}");
//! ```

/// `log::debug!` behind the calling module's `ENABLE_LOGS` gate.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

/// `log::info!` behind the calling module's `ENABLE_LOGS` gate.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// `log::warn!` behind the calling module's `ENABLE_LOGS` gate.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// Errors are never gated.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        log::error!($($arg)*);
    };
}

/// Installs the global `env_logger`. `RUST_LOG` takes precedence over the
/// default level.
pub fn init_logging(debug: bool) {
    let default_level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let _ = env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .try_init();
}
