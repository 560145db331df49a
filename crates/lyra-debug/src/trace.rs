use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber for processes hosting the debug
/// service.
///
/// The filter comes from `LYRA_LOG` (same syntax as `RUST_LOG`), falling
/// back to `info`. Best effort: if a subscriber is already installed this is
/// a no-op, so embedders that bring their own logging win.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LYRA_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
