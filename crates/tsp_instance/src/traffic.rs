use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use tsp_matrix_providers::google_maps::{GoogleMapsClient, TravelMode};

use crate::node::Node;

/// Routes considered when comparing alternatives.
pub const MAX_ALTERNATIVE_ROUTES: usize = 3;

/// Spread between the slowest and fastest alternative above which traffic
/// counts as congested.
pub const CONGESTION_RATIO_THRESHOLD: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "f64", try_from = "f64")]
pub enum SpeedFactor {
    #[default]
    Normal,
    Congested,
}

impl SpeedFactor {
    pub fn value(&self) -> f64 {
        match self {
            SpeedFactor::Normal => 1.0,
            SpeedFactor::Congested => 0.8,
        }
    }
}

impl From<SpeedFactor> for f64 {
    fn from(factor: SpeedFactor) -> Self {
        factor.value()
    }
}

impl TryFrom<f64> for SpeedFactor {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value == SpeedFactor::Normal.value() {
            Ok(SpeedFactor::Normal)
        } else if value == SpeedFactor::Congested.value() {
            Ok(SpeedFactor::Congested)
        } else {
            Err(format!("{} is not a valid speed factor", value))
        }
    }
}

/// External routing capability: traffic-adjusted first-leg durations, in
/// seconds, of the alternative routes departing now.
#[async_trait]
pub trait RouteAlternatives: Send + Sync {
    async fn traffic_durations(
        &self,
        origin: &Node,
        destination: &Node,
    ) -> anyhow::Result<Vec<f64>>;
}

#[async_trait]
impl RouteAlternatives for GoogleMapsClient {
    async fn traffic_durations(
        &self,
        origin: &Node,
        destination: &Node,
    ) -> anyhow::Result<Vec<f64>> {
        let durations = self
            .alternative_route_durations(&origin.into(), &destination.into(), TravelMode::Driving)
            .await?;
        Ok(durations)
    }
}

#[async_trait]
impl<T> RouteAlternatives for Arc<T>
where
    T: RouteAlternatives + ?Sized,
{
    async fn traffic_durations(
        &self,
        origin: &Node,
        destination: &Node,
    ) -> anyhow::Result<Vec<f64>> {
        (**self).traffic_durations(origin, destination).await
    }
}

/// Ratio of the slowest to the fastest of the first three durations. A zero
/// fastest duration yields 1.0.
pub fn duration_spread(durations: &[f64]) -> Option<f64> {
    let considered = &durations[..durations.len().min(MAX_ALTERNATIVE_ROUTES)];

    let min = considered.iter().copied().reduce(f64::min)?;
    let max = considered.iter().copied().reduce(f64::max)?;

    Some(if min > 0.0 { max / min } else { 1.0 })
}

pub fn speed_factor_from_durations(durations: &[f64]) -> SpeedFactor {
    match duration_spread(durations) {
        Some(ratio) if ratio > CONGESTION_RATIO_THRESHOLD => SpeedFactor::Congested,
        _ => SpeedFactor::Normal,
    }
}

pub struct TrafficEstimator<R> {
    routes: R,
}

impl<R> TrafficEstimator<R>
where
    R: RouteAlternatives,
{
    pub fn new(routes: R) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &R {
        &self.routes
    }

    /// Coarse conditions for a single representative pair. Routing failures
    /// fall back to [`SpeedFactor::Normal`].
    pub async fn estimate(&self, origin: &Node, destination: &Node) -> SpeedFactor {
        match self.routes.traffic_durations(origin, destination).await {
            Ok(durations) => {
                let factor = speed_factor_from_durations(&durations);
                debug!(
                    "Speed factor {} from {} alternative routes",
                    factor.value(),
                    durations.len()
                );
                factor
            }
            Err(err) => {
                warn!("Routing request failed, assuming normal traffic: {}", err);
                SpeedFactor::Normal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRoutes(anyhow::Result<Vec<f64>>);

    #[async_trait]
    impl RouteAlternatives for FixedRoutes {
        async fn traffic_durations(&self, _: &Node, _: &Node) -> anyhow::Result<Vec<f64>> {
            match &self.0 {
                Ok(durations) => Ok(durations.clone()),
                Err(err) => Err(anyhow::anyhow!("{}", err)),
            }
        }
    }

    #[test]
    fn test_equal_durations_are_normal() {
        assert_eq!(duration_spread(&[100.0, 100.0, 100.0]), Some(1.0));
        assert_eq!(
            speed_factor_from_durations(&[100.0, 100.0, 100.0]),
            SpeedFactor::Normal
        );
    }

    #[test]
    fn test_wide_spread_is_congested() {
        assert_eq!(duration_spread(&[100.0, 130.0, 150.0]), Some(1.5));
        assert_eq!(
            speed_factor_from_durations(&[100.0, 130.0, 150.0]),
            SpeedFactor::Congested
        );
    }

    #[test]
    fn test_spread_just_under_threshold_is_normal() {
        assert_eq!(
            speed_factor_from_durations(&[100.0, 118.0]),
            SpeedFactor::Normal
        );
    }

    #[test]
    fn test_spread_at_threshold_is_normal() {
        assert_eq!(
            speed_factor_from_durations(&[100.0, 120.0]),
            SpeedFactor::Normal
        );
    }

    #[test]
    fn test_no_routes_is_normal() {
        assert_eq!(duration_spread(&[]), None);
        assert_eq!(speed_factor_from_durations(&[]), SpeedFactor::Normal);
    }

    #[test]
    fn test_zero_minimum_forces_ratio_one() {
        assert_eq!(duration_spread(&[0.0, 300.0]), Some(1.0));
        assert_eq!(
            speed_factor_from_durations(&[0.0, 300.0]),
            SpeedFactor::Normal
        );
    }

    #[test]
    fn test_only_first_three_routes_count() {
        assert_eq!(
            speed_factor_from_durations(&[100.0, 105.0, 110.0, 400.0]),
            SpeedFactor::Normal
        );
    }

    #[test]
    fn test_speed_factor_serializes_as_scalar() {
        assert_eq!(serde_json::to_string(&SpeedFactor::Congested).unwrap(), "0.8");
        assert_eq!(
            serde_json::from_str::<SpeedFactor>("1.0").unwrap(),
            SpeedFactor::Normal
        );
        assert!(serde_json::from_str::<SpeedFactor>("0.5").is_err());
    }

    #[tokio::test]
    async fn test_estimate_falls_back_on_routing_error() {
        let estimator = TrafficEstimator::new(FixedRoutes(Err(anyhow::anyhow!("denied"))));

        let factor = estimator
            .estimate(&Node::new(50.0, 4.0), &Node::new(51.0, 4.0))
            .await;

        assert_eq!(factor, SpeedFactor::Normal);
    }

    #[tokio::test]
    async fn test_estimate_uses_route_durations() {
        let estimator = TrafficEstimator::new(FixedRoutes(Ok(vec![600.0, 900.0])));

        let factor = estimator
            .estimate(&Node::new(50.0, 4.0), &Node::new(51.0, 4.0))
            .await;

        assert_eq!(factor, SpeedFactor::Congested);
    }

    #[tokio::test]
    async fn test_estimate_through_shared_routes() {
        let routes = Arc::new(FixedRoutes(Ok(vec![600.0, 650.0])));
        let estimator = TrafficEstimator::new(routes.clone());

        let factor = estimator
            .estimate(&Node::new(50.0, 4.0), &Node::new(51.0, 4.0))
            .await;

        assert_eq!(factor, SpeedFactor::Normal);
        assert_eq!(Arc::strong_count(&routes), 2);
    }
}
