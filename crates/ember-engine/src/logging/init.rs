use std::sync::Once;

use log::LevelFilter;

/// Logger setup.
///
/// `filter` uses `env_logger` directive syntax (e.g. `"ember_engine=debug"`).
/// Without it, `RUST_LOG` is read, then `default_level` applies.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter: Option<String>,
    pub default_level: LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: None,
            default_level: LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum FilterSource {
    Directives(String),
    Level(LevelFilter),
}

fn pick_filter(config: &LoggingConfig, env: Option<String>) -> FilterSource {
    match (&config.filter, env) {
        (Some(explicit), _) => FilterSource::Directives(explicit.clone()),
        (None, Some(env)) if !env.trim().is_empty() => FilterSource::Directives(env),
        _ => FilterSource::Level(config.default_level),
    }
}

static INIT: Once = Once::new();

/// Installs the global `env_logger` once. Later calls do nothing, as does a
/// call made after some other logger was installed.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match pick_filter(&config, std::env::var("RUST_LOG").ok()) {
            FilterSource::Directives(d) => builder.parse_filters(&d),
            FilterSource::Level(level) => builder.filter_level(level),
        };
        builder.write_style(config.write_style);

        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        let config = LoggingConfig { filter: Some("warn".into()), ..Default::default() };
        assert_eq!(
            pick_filter(&config, Some("trace".into())),
            FilterSource::Directives("warn".into())
        );
    }

    #[test]
    fn env_then_default() {
        let config = LoggingConfig::default();
        assert_eq!(
            pick_filter(&config, Some("ember_engine=debug".into())),
            FilterSource::Directives("ember_engine=debug".into())
        );
        assert_eq!(pick_filter(&config, Some("  ".into())), FilterSource::Level(LevelFilter::Info));
        assert_eq!(pick_filter(&config, None), FilterSource::Level(LevelFilter::Info));
    }

    #[test]
    fn init_twice_is_harmless() {
        init_logging(LoggingConfig::default());
        init_logging(LoggingConfig { filter: Some("off".into()), ..Default::default() });
    }
}
