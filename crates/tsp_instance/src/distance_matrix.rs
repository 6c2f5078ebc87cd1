use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use tsp_matrix_providers::{
    cache::MatricesCache,
    travel_matrices::TravelMatrices,
    travel_matrix_client::{CachedTravelMatrixClient, TravelMatrixFetcher},
    travel_matrix_provider::TravelMatrixProvider,
};

use crate::{
    error::BuildError,
    node::{Node, to_points},
};

/// Travel times (seconds) and distances (meters) between every ordered pair
/// of nodes, indexed 0-based in node order. Not assumed symmetric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "UncheckedDistanceMatrix")]
pub struct DistanceMatrix {
    size: usize,
    matrices: TravelMatrices,
}

#[derive(Deserialize, JsonSchema)]
struct UncheckedDistanceMatrix {
    size: usize,
    matrices: TravelMatrices,
}

impl TryFrom<UncheckedDistanceMatrix> for DistanceMatrix {
    type Error = BuildError;

    fn try_from(unchecked: UncheckedDistanceMatrix) -> Result<Self, Self::Error> {
        DistanceMatrix::new(unchecked.matrices, unchecked.size)
    }
}

impl DistanceMatrix {
    /// Accepts only matrices with a cell for every ordered pair of `size`
    /// nodes.
    pub fn new(matrices: TravelMatrices, size: usize) -> Result<Self, BuildError> {
        if !matrices.covers(size) {
            return Err(BuildError::IncompleteMatrix {
                expected: size * size,
                actual: matrices.times.len().min(matrices.distances.len()),
            });
        }

        Ok(Self { size, matrices })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn duration(&self, from: usize, to: usize) -> Option<f64> {
        self.matrices.time(from, to)
    }

    pub fn distance(&self, from: usize, to: usize) -> Option<f64> {
        self.matrices.distance(from, to)
    }

    pub fn travel_matrices(&self) -> &TravelMatrices {
        &self.matrices
    }
}

/// Fetches node matrices through a cache keyed by the exact node sequence.
pub struct DistanceMatrixCache<F, C> {
    client: CachedTravelMatrixClient<F, C>,
    provider: TravelMatrixProvider,
}

impl<F, C> DistanceMatrixCache<F, C>
where
    F: TravelMatrixFetcher,
    C: MatricesCache,
{
    pub fn new(client: CachedTravelMatrixClient<F, C>, provider: TravelMatrixProvider) -> Self {
        Self { client, provider }
    }

    pub fn client(&self) -> &CachedTravelMatrixClient<F, C> {
        &self.client
    }

    pub fn provider(&self) -> &TravelMatrixProvider {
        &self.provider
    }

    #[instrument(skip_all, level = "debug")]
    pub async fn get_matrix(&self, nodes: &[Node]) -> Result<DistanceMatrix, BuildError> {
        let matrices = self
            .client
            .get_matrix(&to_points(nodes), &self.provider)
            .await
            .map_err(BuildError::Matrix)?;

        DistanceMatrix::new(matrices, nodes.len())
    }
}
