use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Installs the fmt subscriber. `heatlayer*` targets log at `level`; other
/// crates are held at WARN.
pub(crate) fn setup_tracing(level: LevelFilter) {
    let own_level = level.into_level();
    let filter_layer = tracing_subscriber::filter::filter_fn(move |metadata| {
        let effective_level = if metadata.target().starts_with("heatlayer") {
            own_level
        } else {
            Some(Level::WARN)
        };
        effective_level.is_some_and(|effective| metadata.level() <= &effective)
    });
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter_layer))
        .init();
}

pub(crate) fn parse_level(value: &str) -> Option<LevelFilter> {
    match value.to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::OFF),
        "error" => Some(LevelFilter::ERROR),
        "warn" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        _ => None,
    }
}
