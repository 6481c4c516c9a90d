use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install a stderr subscriber; `RUST_LOG` overrides the verbosity flag.
pub fn init(verbose: u8) {
    let default_level = match verbose {
        0 => "crm_search=warn",
        1 => "crm_search=info",
        2 => "crm_search=debug",
        _ => "crm_search=trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true),
    );

    if subscriber.try_init().is_err() {
        return;
    }

    tracing::debug!(verbose, "tracing initialized");
}
