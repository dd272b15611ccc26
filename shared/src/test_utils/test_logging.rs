use env_logger::Builder;
use log::LevelFilter;
use std::str::FromStr;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize logging for tests.
///
/// Tests are quiet by default; set `LOG_LEVEL` (error, warn, info, debug,
/// trace) to see the handler's log output while a test runs.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let level_filter = std::env::var("LOG_LEVEL")
            .ok()
            .and_then(|level| LevelFilter::from_str(&level).ok())
            .unwrap_or(LevelFilter::Error);

        // try_init: another test harness may already have installed a logger
        let _ = Builder::from_default_env()
            .filter_level(level_filter)
            .is_test(true)
            .try_init();
    });
}
