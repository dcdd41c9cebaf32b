pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "finance-api")]
#[command(about = "Finance API - revenue/profit submissions with admin management")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    /// Defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides SERVER_PORT)")]
        port: Option<u16>,
        #[arg(long, help = "Grant admin to this existing account before serving")]
        bootstrap_admin: Option<String>,
    },

    #[command(about = "Apply database migrations and exit")]
    Migrate,

    #[command(about = "Grant the admin role to an existing account")]
    GrantAdmin {
        #[arg(help = "Email of the account to promote")]
        email: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    let command = cli.command.unwrap_or(Commands::Serve {
        port: None,
        bootstrap_admin: None,
    });

    match command {
        Commands::Serve { port, bootstrap_admin } => commands::serve::handle(port, bootstrap_admin).await,
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::GrantAdmin { email } => commands::admin::grant(&email, output_format).await,
    }
}
