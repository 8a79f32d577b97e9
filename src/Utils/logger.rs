use simplelog::*;
use std::sync::Once;

static LOGGER: Once = Once::new();

/// Installs a terminal logger at `level`.
///
/// Only the first call in a process installs anything; if the host already
/// installed a global logger the request is ignored.
pub fn init_logger(level: LevelFilter) {
    LOGGER.call_once(|| {
        let logger_instance = CombinedLogger::init(vec![TermLogger::new(
            level,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        )]);
        if logger_instance.is_ok() {
            log::info!("logger started with level {}", level);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_twice_is_harmless() {
        init_logger(LevelFilter::Warn);
        init_logger(LevelFilter::Debug);
        log::debug!("still running");
    }
}
