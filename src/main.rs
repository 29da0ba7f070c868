use clap::Parser;
use dotenvy::dotenv;

use atc_portal::cli::{Cli, Context};
use atc_portal::models::config::ClientConfig;

#[tokio::main]
async fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let cli = Cli::parse();

    let client_config = match ClientConfig::load() {
        Ok(client_config) => client_config,
        Err(err) => {
            log::error!("Error loading client config: {err}");
            std::process::exit(1);
        }
    };

    let context = match Context::connect(client_config).await {
        Ok(context) => context,
        Err(err) => {
            log::error!("Failed to build the API client: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = cli.command.run(&context).await {
        eprintln!("atc-portal error: {err}");
        std::process::exit(1);
    }
}
