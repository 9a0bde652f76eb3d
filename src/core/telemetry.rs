use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log filter used by the proxy server when `RUST_LOG` is unset.
pub fn server_directive() -> String {
    // axum logs rejections from built-in extractors with the `axum::rejection`
    // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
    format!(
        "{}=debug,tower_http=debug,axum::rejection=trace",
        env!("CARGO_CRATE_NAME")
    )
}

/// Log filter for the interactive client. Keeps the REPL quiet unless
/// something goes wrong.
pub fn client_directive() -> String {
    format!("{}=warn", env!("CARGO_CRATE_NAME"))
}

/// Install the global subscriber. Logs go to stderr so they never mix
/// with rendered chat output on stdout.
pub fn init(default_directive: String) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
