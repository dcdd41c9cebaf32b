use clap::Parser;
use tracing_subscriber::EnvFilter;

use finance_api::cli::{self, Cli, OutputFormat};

#[tokio::main]
async fn main() {
    // Load .env if present so local runs pick up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("finance_api=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let output_format = OutputFormat::from_cli(&cli);

    if let Err(e) = cli::run(cli).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => cli::utils::output_error(&output_format, &format!("{e:?}")),
            _ => cli::utils::output_error(&output_format, &format!("{e:#}")),
        }
        std::process::exit(1);
    }
}
