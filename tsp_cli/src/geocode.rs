use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tsp_instance::{
    geocoder::{GeocodeReport, GeocoderAdapter},
    location_table::LocationTable,
};
use tsp_matrix_providers::google_maps::GoogleMapsClient;

use crate::{
    client_args::ClientArgs,
    file_utils::{read_addresses, write_json},
};

#[derive(Args)]
pub struct GeocodeArgs {
    /// CSV file with the addresses in its first column
    #[arg(short = 'i', long)]
    input: PathBuf,

    /// Where to write the resolved location table (JSON)
    #[arg(short = 'o', long)]
    out: PathBuf,

    #[command(flatten)]
    client: ClientArgs,
}

/// Geocodes every address of a CSV file, one request at a time. Transient
/// failures are retried with the client's retry settings.
pub async fn geocode_addresses(
    path: &Path,
    google: &Arc<GoogleMapsClient>,
) -> anyhow::Result<LocationTable> {
    let addresses = read_addresses(path)?;
    info!("Geocoding {} addresses from {:?}", addresses.len(), path);

    let params = google.params();
    let adapter = GeocoderAdapter::new(google.clone())
        .with_retries(params.max_retries, params.retry_delay);

    let bar = ProgressBar::new(addresses.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("[{bar:40}] {pos}/{len} addresses") {
        bar.set_style(style);
    }

    let GeocodeReport {
        table,
        unresolved,
        failed,
        rejected,
    } = adapter
        .resolve_all_with_progress(&addresses, |done, _| bar.set_position(done as u64))
        .await;

    bar.finish_and_clear();

    for address in &unresolved {
        info!("Unresolved: {}", address);
    }
    for (address, reason) in &failed {
        info!("Failed: {} ({})", address, reason);
    }
    for (address, reason) in &rejected {
        info!("Rejected: {} ({})", address, reason);
    }

    Ok(table)
}

pub async fn run(args: GeocodeArgs) -> anyhow::Result<()> {
    let google = args.client.google_client()?;
    let table = geocode_addresses(&args.input, &google).await?;

    write_json(&args.out, &table)?;
    info!("Wrote {} locations to {:?}", table.len(), args.out);

    Ok(())
}
