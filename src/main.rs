use oa_addons::presentation::cli::CliApp;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app = CliApp::new();

    // RUST_LOG wins; -v raises the default level to debug
    let default_level = if app.verbose() { "oa_addons=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    app.run().await
}
