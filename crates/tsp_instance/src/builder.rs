use tracing::{debug, info, instrument};
use tsp_matrix_providers::{cache::MatricesCache, travel_matrix_client::TravelMatrixFetcher};

use crate::{
    distance_matrix::DistanceMatrixCache,
    error::BuildError,
    instance::TspInstance,
    location_table::LocationTable,
    traffic::{RouteAlternatives, SpeedFactor, TrafficEstimator},
    validator::{NODE_COUNT, validate_nodes},
};

pub struct InstanceBuilder<R, F, C> {
    estimator: TrafficEstimator<R>,
    matrices: DistanceMatrixCache<F, C>,
}

impl<R, F, C> InstanceBuilder<R, F, C>
where
    R: RouteAlternatives,
    F: TravelMatrixFetcher,
    C: MatricesCache,
{
    pub fn new(estimator: TrafficEstimator<R>, matrices: DistanceMatrixCache<F, C>) -> Self {
        Self {
            estimator,
            matrices,
        }
    }

    pub fn estimator(&self) -> &TrafficEstimator<R> {
        &self.estimator
    }

    pub fn matrices(&self) -> &DistanceMatrixCache<F, C> {
        &self.matrices
    }

    /// Builds an instance from the first [`NODE_COUNT`] rows of `locations`.
    ///
    /// Tables with fewer rows fail before any external request is made. The
    /// speed factor comes from the pair (node 0, node 1); the matrix covers
    /// every ordered pair of the selected nodes.
    #[instrument(skip_all, level = "debug")]
    pub async fn build(&self, locations: LocationTable) -> Result<TspInstance, BuildError> {
        if locations.len() < NODE_COUNT {
            return Err(BuildError::InsufficientNodes {
                available: locations.len(),
                required: NODE_COUNT,
            });
        }

        let nodes = locations.first_nodes(NODE_COUNT);
        debug!(
            "Selected {} of {} locations",
            nodes.len(),
            locations.len()
        );

        let speed_factor = match nodes.as_slice() {
            [origin, destination, ..] => self.estimator.estimate(origin, destination).await,
            _ => SpeedFactor::Normal,
        };

        let distance_matrix = self.matrices.get_matrix(&nodes).await?;

        let nodes = validate_nodes(nodes)?;

        info!(
            "Built instance with {} nodes, speed factor {}",
            nodes.len(),
            speed_factor.value()
        );

        Ok(TspInstance::new(
            nodes,
            distance_matrix,
            speed_factor,
            locations,
        ))
    }
}
