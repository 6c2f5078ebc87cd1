use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::{
    as_the_crow_flies::as_the_crow_flies_matrices,
    cache::{FileCache, MatricesCache},
    google_maps::GoogleMapsClient,
    travel_matrices::{FetchedMatrices, TravelMatrices},
    travel_matrix_provider::TravelMatrixProvider,
};

/// A source of full origins × destinations matrices over a point sequence.
#[async_trait]
pub trait TravelMatrixFetcher: Send + Sync {
    async fn fetch_matrix(
        &self,
        points: &[geo_types::Point],
        provider: &TravelMatrixProvider,
    ) -> anyhow::Result<FetchedMatrices>;
}

pub struct TravelMatrixClient {
    google_client: Option<Arc<GoogleMapsClient>>,
}

impl TravelMatrixClient {
    pub fn new(google_client: impl Into<Arc<GoogleMapsClient>>) -> Self {
        Self {
            google_client: Some(google_client.into()),
        }
    }

    /// A client that only serves the offline providers.
    pub fn offline() -> Self {
        Self {
            google_client: None,
        }
    }

    pub fn google_client(&self) -> Option<&GoogleMapsClient> {
        self.google_client.as_deref()
    }
}

#[async_trait]
impl TravelMatrixFetcher for TravelMatrixClient {
    async fn fetch_matrix(
        &self,
        points: &[geo_types::Point],
        provider: &TravelMatrixProvider,
    ) -> anyhow::Result<FetchedMatrices> {
        match provider {
            TravelMatrixProvider::GoogleMapsApi { mode } => {
                let client = self.google_client.as_ref().ok_or_else(|| {
                    anyhow::anyhow!("GoogleMapsApi provider requires an API key")
                })?;
                Ok(client.fetch_matrix(points, *mode).await?)
            }
            TravelMatrixProvider::AsTheCrowFlies { speed_kmh } => {
                Ok(as_the_crow_flies_matrices(points, *speed_kmh).into())
            }
            TravelMatrixProvider::Custom { matrices } => Ok(matrices.clone().into()),
        }
    }
}

/// Serves matrices from `cache` when an entry exists for the exact point
/// sequence, otherwise fetches them once and persists them together with the
/// provider responses.
pub struct CachedTravelMatrixClient<F, C = FileCache> {
    fetcher: F,
    cache: C,
}

impl<F, C> CachedTravelMatrixClient<F, C>
where
    F: TravelMatrixFetcher,
    C: MatricesCache,
{
    pub fn new(fetcher: F, cache: C) -> Self {
        Self { fetcher, cache }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    #[instrument(skip_all, level = "debug")]
    pub async fn get_matrix(
        &self,
        points: &[geo_types::Point],
        provider: &TravelMatrixProvider,
    ) -> anyhow::Result<TravelMatrices> {
        let num_points = points.len();

        match self.cache.get_cached(provider, points) {
            Ok(Some(cached)) if cached.matrices.covers(num_points) => {
                debug!("Matrix cache hit for {} points", num_points);
                return Ok(cached.matrices);
            }
            Ok(Some(_)) => {
                warn!(
                    "Cached matrices do not cover {} points, fetching again",
                    num_points
                );
            }
            Ok(None) => {
                debug!("Matrix cache miss for {} points", num_points);
            }
            Err(err) => {
                warn!("Unreadable matrix cache entry, fetching again: {}", err);
            }
        }

        let fetched = self.fetcher.fetch_matrix(points, provider).await?;

        if !fetched.matrices.covers(num_points) {
            return Err(anyhow::anyhow!(
                "Provider returned {} cells, expected {}",
                fetched.matrices.times.len(),
                num_points * num_points
            ));
        }

        match self.cache.cache(provider, points, &fetched) {
            Ok(()) => info!("Cached matrices for {} points", num_points),
            Err(err) => warn!("Failed to persist matrices: {}", err),
        }

        Ok(fetched.matrices)
    }
}
