#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the occurrences and events dashboard server.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use crime_dashboard_server::{ServerConfig, load_state, run_server};

#[derive(Parser)]
#[command(
    name = "crime_dashboard_server",
    about = "Occurrences x events dashboard server"
)]
struct Cli {
    /// Criminal occurrences workbook or CSV (overrides `CRIMINAL_FILE`)
    #[arg(long, global = true)]
    criminal_file: Option<PathBuf>,
    /// Events JSON array (overrides `EVENTOS_FILE`)
    #[arg(long, global = true)]
    events_file: Option<PathBuf>,
    /// Venues JSON array (overrides `LOCAIS_FILE`)
    #[arg(long, global = true)]
    venues_file: Option<PathBuf>,
    /// Address to bind to (overrides `BIND_ADDR`)
    #[arg(long)]
    bind_addr: Option<String>,
    /// Port to listen on (overrides `PORT`)
    #[arg(long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dashboard server (default)
    Serve,
    /// Load and validate the data files, print what was loaded, and exit
    Check,
}

impl Cli {
    fn config(&self) -> ServerConfig {
        let mut config = ServerConfig::from_env();
        if let Some(path) = &self.criminal_file {
            config.data.criminal_file.clone_from(path);
        }
        if let Some(path) = &self.events_file {
            config.data.events_file.clone_from(path);
        }
        if let Some(path) = &self.venues_file {
            config.data.venues_file.clone_from(path);
        }
        if let Some(addr) = &self.bind_addr {
            config.bind_addr.clone_from(addr);
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        config
    }
}

fn check(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = load_state(&config.data)?;
    let options = state.dashboard.options();

    println!("{}", serde_json::to_string_pretty(&state.load_status)?);
    println!();
    println!("Filter options:");
    println!("  months:        {}", options.months.len());
    println!("  regions:       {}", options.regions.len());
    println!("  cities:        {}", options.cities.len());
    println!("  neighborhoods: {}", options.neighborhoods.len());
    println!("  categories:    {}", options.categories.len());
    println!("  event names:   {}", options.event_names.len());

    Ok(())
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();
    let config = cli.config();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(config).await?,
        Commands::Check => check(&config)?,
    }

    Ok(())
}
