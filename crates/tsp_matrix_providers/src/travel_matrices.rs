use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// TravelMatrices holds the travel distance, time, and cost matrices.
/// Stored as flat row-major vectors: the cell for `from -> to` lives at
/// `from * num_locations + to`.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct TravelMatrices {
    /// Distances in meters
    pub distances: Vec<f64>,

    /// Travel times in seconds
    pub times: Vec<f64>,

    // Some providers don't give us a cost
    pub costs: Option<Vec<f64>>,
}

impl TravelMatrices {
    /// Number of locations covered, or `None` when the matrices are not square
    /// or the distance and time matrices disagree in size.
    pub fn num_locations(&self) -> Option<usize> {
        let len = self.times.len();
        let n = len.isqrt();

        if n * n != len || self.distances.len() != len {
            return None;
        }

        if self.costs.as_ref().is_some_and(|costs| costs.len() != len) {
            return None;
        }

        Some(n)
    }

    /// Whether every ordered pair of `num_locations` locations has a cell.
    pub fn covers(&self, num_locations: usize) -> bool {
        self.num_locations() == Some(num_locations)
    }

    pub fn time(&self, from: usize, to: usize) -> Option<f64> {
        let n = self.num_locations()?;
        if from >= n || to >= n {
            return None;
        }
        self.times.get(from * n + to).copied()
    }

    pub fn distance(&self, from: usize, to: usize) -> Option<f64> {
        let n = self.num_locations()?;
        if from >= n || to >= n {
            return None;
        }
        self.distances.get(from * n + to).copied()
    }
}

/// Matrices together with the provider responses they were read from, kept
/// byte for byte. Offline providers have no responses.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct FetchedMatrices {
    pub matrices: TravelMatrices,

    #[serde(default)]
    pub responses: Vec<Box<RawValue>>,
}

impl From<TravelMatrices> for FetchedMatrices {
    fn from(matrices: TravelMatrices) -> Self {
        Self {
            matrices,
            responses: vec![],
        }
    }
}

impl std::hash::Hash for TravelMatrices {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        for d in &self.distances {
            state.write_u64(d.to_bits());
        }
        for t in &self.times {
            state.write_u64(t.to_bits());
        }
        if let Some(costs) = &self.costs {
            for c in costs {
                state.write_u64(c.to_bits());
            }
        } else {
            state.write_u8(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrices(n: usize) -> TravelMatrices {
        TravelMatrices {
            distances: (0..n * n).map(|i| i as f64 * 10.0).collect(),
            times: (0..n * n).map(|i| i as f64).collect(),
            costs: None,
        }
    }

    #[test]
    fn test_num_locations() {
        assert_eq!(matrices(3).num_locations(), Some(3));
        assert!(matrices(10).covers(10));
        assert!(!matrices(9).covers(10));
    }

    #[test]
    fn test_num_locations_rejects_ragged_matrices() {
        let mut m = matrices(3);
        m.times.pop();
        assert_eq!(m.num_locations(), None);

        let mut m = matrices(3);
        m.costs = Some(vec![1.0; 4]);
        assert_eq!(m.num_locations(), None);
    }

    #[test]
    fn test_row_major_lookup() {
        let m = matrices(3);

        assert_eq!(m.time(1, 2), Some(5.0));
        assert_eq!(m.time(2, 1), Some(7.0));
        assert_eq!(m.distance(2, 0), Some(60.0));
        assert_eq!(m.time(3, 0), None);
    }
}
