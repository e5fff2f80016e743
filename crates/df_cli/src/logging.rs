use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

const DEFAULT_FILTER: &str = "info";

/// Builds the log filter: an explicit `level` wins, then `RUST_LOG`, then `info`.
pub fn build_filter(level: Option<&str>) -> EnvFilter {
    match level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    }
}

/// Installs the global subscriber once. Logs go to stderr so the feed can be
/// printed on stdout.
pub fn init_logging(level: Option<&str>) {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(build_filter(level))
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_level_wins() {
        assert_eq!(build_filter(Some("debug")).to_string(), "debug");
        assert_eq!(build_filter(Some("df_scrapers=trace")).to_string(), "df_scrapers=trace");
    }

    #[test]
    fn test_invalid_level_falls_back() {
        assert_eq!(build_filter(Some("df_scrapers=notalevel")).to_string(), DEFAULT_FILTER);
    }
}
