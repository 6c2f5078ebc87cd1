use std::path::PathBuf;

use clap::Args;
use tracing::info;
use tsp_instance::{node::to_points, validator::NODE_COUNT};
use tsp_matrix_providers::{
    travel_matrix_client::{CachedTravelMatrixClient, TravelMatrixClient},
    travel_matrix_provider::TravelMatrixProvider,
};

use crate::{
    build::matrix_provider,
    client_args::ClientArgs,
    file_utils::{read_location_table, write_json},
};

#[derive(Args)]
pub struct GetMatrixArgs {
    /// Location table (JSON) produced by `tsp geocode`
    #[arg(short = 'l', long)]
    locations: PathBuf,

    /// Also write the matrices here (JSON)
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,

    #[arg(long)]
    as_the_crow_flies: Option<f64>,

    #[command(flatten)]
    client: ClientArgs,
}

/// Fills the cache for the nodes a build over the same table would select.
pub async fn run(args: GetMatrixArgs) -> anyhow::Result<()> {
    let table = read_location_table(&args.locations)?;
    let nodes = table.first_nodes(NODE_COUNT);

    let provider = matrix_provider(args.as_the_crow_flies);
    let fetcher = match provider {
        TravelMatrixProvider::GoogleMapsApi { .. } => {
            TravelMatrixClient::new(args.client.google_client()?)
        }
        _ => TravelMatrixClient::offline(),
    };
    let client = CachedTravelMatrixClient::new(fetcher, args.client.file_cache());

    let matrices = client.get_matrix(&to_points(&nodes), &provider).await?;
    info!(
        "Matrices ready for {} nodes in {:?}",
        nodes.len(),
        client.cache().folder()
    );

    if let Some(out) = args.out {
        write_json(&out, &matrices)?;
    }

    Ok(())
}
