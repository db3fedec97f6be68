use tracing_subscriber::{EnvFilter, FmtSubscriber};

// Entry point for `cargo run -p web-server`. Loads settings, installs the
// subscriber and hands over to `run_server`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let settings = configuration::load_config(configuration::DEFAULT_CONFIG_PATH)?;
    web_server::run_server(settings).await
}
