//! Logging initialization

/// Initialize the logging system for tools built on the animation core
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable, e.g. `RUST_LOG=origin_anim=debug`
/// to see per-clip load statistics.
///
/// # Example
/// ```
/// origin_anim::core::logging::init();
/// log::info!("Rig loaded");
/// ```
pub fn init() {
    // try_init so tests and tools that initialize twice don't panic
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).try_init();
}
