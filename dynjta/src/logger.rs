//! Logging bring-up.
//!
//! Diagnostics are emitted with `tracing` macros throughout the crate,
//! with a `group` field on everything that concerns one motion group.
//! [`init_logging`] installs a stderr subscriber and forwards `log` crate
//! records to it.
//!
//! # Example
//!
//! ```ignore
//! use dynjta::logger::init_logging;
//!
//! init_logging("joint_trajectory_action");
//! tracing::info!(group = 0, "Publishing trajectory");
//! ```

use std::sync::OnceLock;
use tracing::info;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initializes logging for the node `name`.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Only the first
/// call has an effect; later calls, or a subscriber installed elsewhere,
/// are tolerated.
pub fn init_logging(name: &str) {
    LOGGER_INITIALIZED.get_or_init(|| {
        tracing_log::LogTracer::init().ok();

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let fmt_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_file(true)
            .with_line_number(true)
            .with_span_events(FmtSpan::NONE)
            .with_writer(std::io::stderr);

        let installed = tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .is_ok();
        if installed {
            info!(node = name, "Logging initialized");
        }
    });
}
