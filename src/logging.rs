//! Logging setup (tracing subscriber on stderr)

use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use crate::domain::GlobalFlags;

/// `--silent` keeps only errors, `--debug` adds debug output.
pub fn level_for(flags: &GlobalFlags) -> LevelFilter {
    if flags.silent {
        LevelFilter::ERROR
    } else if flags.debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}

/// Install the global subscriber. Later calls keep the first one.
pub fn init(flags: &GlobalFlags) -> LevelFilter {
    let filter = level_for(flags);

    let noisy_modules = ["ureq", "rustls"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(flags.debug)
        .with_thread_names(false);

    let filtered_layer = fmt_layer.with_filter(filter).with_filter(module_filter);

    if tracing_subscriber::registry()
        .with(filtered_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("logger already initialized");
    }

    if filter == LevelFilter::DEBUG {
        tracing::debug!("Debug mode: debug");
    }
    filter
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(false, false, LevelFilter::INFO)]
    #[case(false, true, LevelFilter::DEBUG)]
    #[case(true, false, LevelFilter::ERROR)]
    #[case(true, true, LevelFilter::ERROR)]
    fn test_level_for(#[case] silent: bool, #[case] debug: bool, #[case] expected: LevelFilter) {
        let flags = GlobalFlags {
            silent,
            debug,
            ..Default::default()
        };
        assert_eq!(level_for(&flags), expected);
    }
}
