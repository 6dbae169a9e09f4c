use slug_shortener::config::{self, LogFormat};
use slug_shortener::server;
use tracing_subscriber::EnvFilter;

fn init_tracing(log_level: &str, log_format: LogFormat) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if log_format == LogFormat::Json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_from_env()?;

    init_tracing(&config.log_level, config.log_format);
    config.print_summary();

    server::run(config).await
}
