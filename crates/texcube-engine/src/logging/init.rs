use std::sync::Once;

/// Filter used when neither the config nor `RUST_LOG` sets one.
///
/// wgpu's internals log every resource at `info`; keep them at `warn`.
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "debug",
/// "texcube_engine=trace,wgpu_core=warn").
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Picks the filter: explicit config, then `RUST_LOG`, then [`DEFAULT_FILTER`].
pub fn resolve_filter(configured: Option<&str>, rust_log: Option<&str>) -> String {
    let set = |f: &&str| !f.trim().is_empty();
    configured
        .filter(set)
        .or(rust_log.filter(set))
        .unwrap_or(DEFAULT_FILTER)
        .to_owned()
}

/// Initializes the global logger once. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let rust_log = std::env::var("RUST_LOG").ok();
        let filter = resolve_filter(config.env_filter.as_deref(), rust_log.as_deref());

        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&filter);
        builder.write_style(config.write_style);

        // `try_init` so a test harness logger does not make this panic.
        if builder.try_init().is_ok() {
            log::debug!("logging initialized with `{filter}`");
        }
    });
}
