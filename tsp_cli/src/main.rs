use clap::{Parser, Subcommand};

use mimalloc::MiMalloc;

use crate::{
    build::BuildArgs, generate::GenerateSubcommands, geocode::GeocodeArgs,
    get_matrix::GetMatrixArgs,
};

mod build;
mod client_args;
mod file_utils;
mod generate;
mod geocode;
mod get_matrix;
mod parsers;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a CSV of addresses into a location table
    Geocode {
        #[command(flatten)]
        args: GeocodeArgs,
    },
    /// Build a 10-node TSP instance
    Build {
        #[command(flatten)]
        args: BuildArgs,
    },
    /// Fetch and cache the matrices a build would use
    GetMatrix {
        #[command(flatten)]
        args: GetMatrixArgs,
    },
    #[command(visible_alias = "g")]
    Generate {
        #[command(subcommand)]
        commands: GenerateSubcommands,
    },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::from_filename("./.env.local").ok();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Commands::Geocode { args } => geocode::run(args).await?,
        Commands::Build { args } => build::run(args).await?,
        Commands::GetMatrix { args } => get_matrix::run(args).await?,
        Commands::Generate { commands } => generate::run(commands)?,
    }

    Ok(())
}
