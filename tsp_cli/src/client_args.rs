use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Args;
use tsp_instance::credentials::Credentials;
use tsp_matrix_providers::{
    cache::FileCache,
    google_maps::{GoogleMapsClient, GoogleMapsClientParams},
};

use crate::parsers;

#[derive(Args)]
pub struct ClientArgs {
    /// JSON file holding `{"gmaps": "<key>"}`. Falls back to GOOGLE_MAPS_API_KEY
    #[arg(long, short = 'c')]
    credentials: Option<PathBuf>,

    /// Timeout of a single request (e.g., "10s", "PT1M")
    #[arg(long, value_parser = parsers::parse_duration, default_value = "10s")]
    timeout: Duration,

    /// Retries for transient request failures
    #[arg(long, default_value_t = 2)]
    retries: u32,

    /// Folder of cached matrices. Falls back to TSP_CACHE_FOLDER
    #[arg(long)]
    cache_folder: Option<PathBuf>,
}

impl ClientArgs {
    /// Reads the credentials and builds the client. Commands call this once and
    /// share the result.
    pub fn google_client(&self) -> anyhow::Result<Arc<GoogleMapsClient>> {
        let credentials = Credentials::load(self.credentials.as_deref())?;

        let mut params = GoogleMapsClientParams::new(credentials.google_maps_api_key);
        params.timeout = self.timeout;
        params.max_retries = self.retries;

        Ok(Arc::new(GoogleMapsClient::new(params)?))
    }

    pub fn file_cache(&self) -> FileCache {
        match &self.cache_folder {
            Some(folder) => FileCache::new(folder),
            None => FileCache::from_env(),
        }
    }
}
