//! Kindred Picker
//!
//! Picks a random user with interests, asks the kindred API for people who share
//! similar interests, and logs the introductions. Runs once or on a cron schedule.

use clap::{Parser, Subcommand};
use core_config::FromEnv;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_interests::Neo4jInterestRepository;
use eyre::Result;
use tracing::info;

mod config;
mod picker;

use config::Config;
use picker::Picker;

#[derive(Parser)]
#[command(name = "kindred-picker")]
#[command(about = "Pick a random person and find who they should meet")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single pick and print the outcome as JSON
    Once,

    /// Run as a scheduled service
    Schedule {
        /// Cron expression for scheduling (default: every 6 hours)
        #[arg(short, long, default_value = "0 0 */6 * * *")]
        cron: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let cli = Cli::parse();

    info!("Connecting to Neo4j at {}", config.neo4j.uri);
    let repository = Neo4jInterestRepository::connect(&config.neo4j)
        .await
        .map_err(|e| eyre::eyre!("Neo4j connection failed: {}", e))?;

    let picker = Picker::new(repository, config.api_url.clone());

    match cli.command {
        Commands::Once => {
            let outcome = picker.pick_once().await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }

        Commands::Schedule { cron } => {
            info!("Starting scheduled picks with cron: {}", cron);
            picker.run_scheduled(&cron).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_default_cron() {
        let cli = Cli::try_parse_from(["kindred-picker", "schedule"]).unwrap();
        match cli.command {
            Commands::Schedule { cron } => assert_eq!(cron, "0 0 */6 * * *"),
            Commands::Once => panic!("expected schedule"),
        }
    }

    #[test]
    fn test_once_subcommand() {
        let cli = Cli::try_parse_from(["kindred-picker", "once"]).unwrap();
        assert!(matches!(cli.command, Commands::Once));
    }
}
