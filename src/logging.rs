use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` applies to this crate
/// and HTTP plumbing is kept at `warn`. Safe to call more than once.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{default_level},hyper=warn,tower_http=warn"))
    });

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
