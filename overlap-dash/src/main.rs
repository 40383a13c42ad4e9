//! Point d'entrée CLI pour overlap-dash

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::Commands;

/// Recouvrement parcelles / terres indigènes par région
#[derive(Parser)]
#[command(name = "overlap-dash")]
#[command(author, version)]
#[command(about = "Intersecter deux couches de polygones par région et résumer les aires")]
#[command(long_about = "Charge deux couches GeoJSON (parcelles, terres indigènes), les filtre par région, calcule leurs intersections et les aires en km².\n\nLa configuration vient du preset 'brasil', d'un fichier JSON (--config) ou de OVERLAP_CONFIG.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Summary { sources, report } => {
            info!(regions = ?sources.regions, "Summary");
            cli::cmd_summary(&sources, report.as_deref()).await?;
        }
        Commands::Export { sources, output } => {
            info!(output = %output.display(), regions = ?sources.regions, "Export");
            cli::cmd_export(&sources, &output).await?;
        }
        Commands::Watch { sources, interval } => {
            cli::cmd_watch(&sources, Duration::from_secs(interval.max(1))).await?;
        }
        Commands::Regions { config } => {
            cli::cmd_regions(config.as_deref())?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
