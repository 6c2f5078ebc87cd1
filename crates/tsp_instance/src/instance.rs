use schemars::{JsonSchema, schema_for};
use serde::Serialize;

use crate::{
    distance_matrix::DistanceMatrix, location_table::LocationTable, node::Node,
    traffic::SpeedFactor,
};

/// A complete problem instance for the downstream planner. Only the builder
/// constructs one, after every check has passed.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename = "TspInstance")]
pub struct TspInstance {
    nodes: Vec<Node>,
    distance_matrix: DistanceMatrix,
    #[schemars(with = "f64")]
    speed_factor: SpeedFactor,
    locations: LocationTable,
}

impl TspInstance {
    pub(crate) fn new(
        nodes: Vec<Node>,
        distance_matrix: DistanceMatrix,
        speed_factor: SpeedFactor,
        locations: LocationTable,
    ) -> Self {
        Self {
            nodes,
            distance_matrix,
            speed_factor,
            locations,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn distance_matrix(&self) -> &DistanceMatrix {
        &self.distance_matrix
    }

    pub fn speed_factor(&self) -> SpeedFactor {
        self.speed_factor
    }

    /// The full table the nodes were taken from, including rows past the
    /// first ten.
    pub fn locations(&self) -> &LocationTable {
        &self.locations
    }

    /// Travel time between two nodes slowed down by the speed factor.
    pub fn adjusted_duration(&self, from: usize, to: usize) -> Option<f64> {
        self.distance_matrix
            .duration(from, to)
            .map(|duration| duration / self.speed_factor.value())
    }
}

pub fn generate_json_schema() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&schema_for!(TspInstance))
}
