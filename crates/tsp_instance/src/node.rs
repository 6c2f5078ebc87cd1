use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A coordinate pair in degrees. Two nodes are the same node when both
/// coordinates compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Node {
    pub lat: f64,
    pub lng: f64,
}

impl Node {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl From<&Node> for geo_types::Point {
    fn from(node: &Node) -> Self {
        geo_types::Point::new(node.lng, node.lat)
    }
}

impl From<geo_types::Point> for Node {
    fn from(point: geo_types::Point) -> Self {
        Node::new(point.y(), point.x())
    }
}

pub fn to_points(nodes: &[Node]) -> Vec<geo_types::Point> {
    nodes.iter().map(geo_types::Point::from).collect()
}
