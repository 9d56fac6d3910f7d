use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn default_filter(level: &str, verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("hrm_core=debug,info")
        } else {
            EnvFilter::new(format!("hrm_core={}", level))
        }
    })
}

pub fn init_cli_logger(verbose: bool) {
    init_cli_logger_with_level("info", verbose);
}

pub fn init_cli_logger_with_level(level: &str, verbose: bool) {
    let _ = tracing_subscriber::registry()
        .with(default_filter(level, verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}

/// JSON lines, for when the output is collected by a log shipper.
pub fn init_json_logger(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(default_filter(level, false))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .try_init();
}
