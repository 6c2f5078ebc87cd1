use std::{path::PathBuf, sync::Arc};

use clap::Args;
use comfy_table::Table;
use tracing::info;
use tsp_instance::{
    builder::InstanceBuilder, distance_matrix::DistanceMatrixCache, instance::TspInstance,
    location_table::LocationTable, traffic::TrafficEstimator,
};
use tsp_matrix_providers::{
    google_maps::{GoogleMapsClient, TravelMode},
    travel_matrix_client::{CachedTravelMatrixClient, TravelMatrixClient},
    travel_matrix_provider::TravelMatrixProvider,
};

use crate::{
    client_args::ClientArgs,
    file_utils::{read_location_table, write_json},
    geocode::geocode_addresses,
};

#[derive(Args)]
#[group(id = "source", required = true, multiple = false)]
pub struct SourceArgs {
    /// CSV file with the addresses in its first column, geocoded before building
    #[arg(long, short = 'a')]
    addresses: Option<PathBuf>,

    /// Location table (JSON) produced by `tsp geocode`
    #[arg(long, short = 'l')]
    locations: Option<PathBuf>,
}

impl SourceArgs {
    pub async fn load(&self, google: &Arc<GoogleMapsClient>) -> anyhow::Result<LocationTable> {
        match (&self.addresses, &self.locations) {
            (Some(addresses), _) => geocode_addresses(addresses, google).await,
            (None, Some(locations)) => read_location_table(locations),
            (None, None) => Err(anyhow::anyhow!("Either --addresses or --locations is required")),
        }
    }
}

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Where to write the instance (JSON)
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,

    /// Use great-circle distances at this speed instead of the Distance Matrix API
    #[arg(long)]
    as_the_crow_flies: Option<f64>,

    #[command(flatten)]
    client: ClientArgs,
}

pub fn matrix_provider(as_the_crow_flies: Option<f64>) -> TravelMatrixProvider {
    match as_the_crow_flies {
        Some(speed_kmh) => TravelMatrixProvider::AsTheCrowFlies { speed_kmh },
        None => TravelMatrixProvider::GoogleMapsApi {
            mode: TravelMode::Driving,
        },
    }
}

fn print_instance(instance: &TspInstance) {
    let mut table = Table::new();
    table.set_header(vec!["#", "Address", "Lat", "Lng"]);

    for (i, row) in instance
        .locations()
        .rows()
        .iter()
        .take(instance.nodes().len())
        .enumerate()
    {
        table.add_row(vec![
            i.to_string(),
            row.address.clone(),
            format!("{:.6}", row.lat),
            format!("{:.6}", row.lng),
        ]);
    }

    println!("{table}");
    println!("Speed factor: {}", instance.speed_factor().value());

    let mut matrix = Table::new();
    let size = instance.distance_matrix().size();
    let mut header = vec!["from \\ to (s)".to_string()];
    header.extend((0..size).map(|j| j.to_string()));
    matrix.set_header(header);

    for i in 0..size {
        let mut row = vec![i.to_string()];
        row.extend((0..size).map(|j| {
            instance
                .distance_matrix()
                .duration(i, j)
                .map(|duration| format!("{:.0}", duration))
                .unwrap_or_default()
        }));
        matrix.add_row(row);
    }

    println!("{matrix}");
}

pub async fn run(args: BuildArgs) -> anyhow::Result<()> {
    let google = args.client.google_client()?;

    let locations = args.source.load(&google).await?;
    info!("Building instance from {} locations", locations.len());

    let builder = InstanceBuilder::new(
        TrafficEstimator::new(google.clone()),
        DistanceMatrixCache::new(
            CachedTravelMatrixClient::new(
                TravelMatrixClient::new(google),
                args.client.file_cache(),
            ),
            matrix_provider(args.as_the_crow_flies),
        ),
    );

    let instance = builder.build(locations).await?;

    print_instance(&instance);

    if let Some(out) = args.out {
        write_json(&out, &instance)?;
        info!("Wrote instance to {:?}", out);
    }

    Ok(())
}
