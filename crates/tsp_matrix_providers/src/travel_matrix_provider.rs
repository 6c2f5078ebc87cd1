use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{google_maps::TravelMode, travel_matrices::TravelMatrices};

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub enum TravelMatrixProvider {
    /// https://developers.google.com/maps/documentation/distance-matrix
    /// Always requested with `departure_time=now` so durations include traffic.
    GoogleMapsApi { mode: TravelMode },

    AsTheCrowFlies { speed_kmh: f64 },

    Custom { matrices: TravelMatrices },
}

impl Default for TravelMatrixProvider {
    fn default() -> Self {
        TravelMatrixProvider::GoogleMapsApi {
            mode: TravelMode::Driving,
        }
    }
}

impl std::hash::Hash for TravelMatrixProvider {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            TravelMatrixProvider::GoogleMapsApi { mode } => {
                state.write_u8(0);
                mode.hash(state);
            }
            TravelMatrixProvider::AsTheCrowFlies { speed_kmh } => {
                state.write_u8(1);
                state.write_u64(speed_kmh.to_bits());
            }
            TravelMatrixProvider::Custom { matrices } => {
                state.write_u8(2);
                matrices.hash(state);
            }
        }
    }
}
