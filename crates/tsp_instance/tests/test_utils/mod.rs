use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use tempfile::TempDir;
use tsp_instance::{
    builder::InstanceBuilder,
    distance_matrix::DistanceMatrixCache,
    location_table::{LocationRow, LocationTable},
    node::Node,
    traffic::{RouteAlternatives, TrafficEstimator},
};
use tsp_matrix_providers::{
    as_the_crow_flies::as_the_crow_flies_matrices,
    cache::FileCache,
    travel_matrices::FetchedMatrices,
    travel_matrix_client::{CachedTravelMatrixClient, TravelMatrixFetcher},
    travel_matrix_provider::TravelMatrixProvider,
};

pub struct FakeRoutes {
    durations: Vec<f64>,
    pub requests: Mutex<Vec<(Node, Node)>>,
}

impl FakeRoutes {
    pub fn new(durations: Vec<f64>) -> Self {
        Self {
            durations,
            requests: Mutex::new(vec![]),
        }
    }
}

#[async_trait]
impl RouteAlternatives for FakeRoutes {
    async fn traffic_durations(
        &self,
        origin: &Node,
        destination: &Node,
    ) -> anyhow::Result<Vec<f64>> {
        self.requests.lock().unwrap().push((*origin, *destination));
        Ok(self.durations.clone())
    }
}

pub struct FakeMatrixFetcher {
    pub calls: AtomicUsize,
    pub partial: bool,
    pub fail: bool,
}

impl FakeMatrixFetcher {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            partial: false,
            fail: false,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TravelMatrixFetcher for FakeMatrixFetcher {
    async fn fetch_matrix(
        &self,
        points: &[geo_types::Point],
        _provider: &TravelMatrixProvider,
    ) -> anyhow::Result<FetchedMatrices> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail {
            anyhow::bail!("REQUEST_DENIED");
        }

        let mut matrices = as_the_crow_flies_matrices(points, 40.0);
        if self.partial {
            matrices.times.pop();
            matrices.distances.pop();
        }
        Ok(matrices.into())
    }
}

pub type TestBuilder = InstanceBuilder<FakeRoutes, FakeMatrixFetcher, FileCache>;

pub fn create_builder(
    cache_dir: &TempDir,
    durations: Vec<f64>,
    fetcher: FakeMatrixFetcher,
) -> TestBuilder {
    InstanceBuilder::new(
        TrafficEstimator::new(FakeRoutes::new(durations)),
        DistanceMatrixCache::new(
            CachedTravelMatrixClient::new(fetcher, FileCache::new(cache_dir.path())),
            TravelMatrixProvider::default(),
        ),
    )
}

/// `count` distinct locations around Brussels, in a grid.
pub fn create_location_table(count: usize) -> LocationTable {
    LocationTable::new(
        (0..count)
            .map(|i| {
                LocationRow::new(
                    format!("Rue de Test {}, Brussels", i + 1),
                    Node::new(50.80 + (i / 4) as f64 * 0.01, 4.30 + (i % 4) as f64 * 0.01),
                )
            })
            .collect(),
    )
}
