use serde::Deserialize;

use super::{
    ApiResponse, GoogleMapsClient, GoogleMapsError, TextValue, TravelMode, format_lat_lng,
};

#[derive(Deserialize, Debug)]
pub(crate) struct DirectionsResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Deserialize, Debug)]
struct Route {
    legs: Vec<Leg>,
}

#[derive(Deserialize, Debug)]
struct Leg {
    duration: Option<TextValue>,
    duration_in_traffic: Option<TextValue>,
}

impl ApiResponse for DirectionsResponse {
    fn status(&self) -> &str {
        &self.status
    }

    fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

impl DirectionsResponse {
    /// Traffic-adjusted duration of the first leg of every route, in seconds.
    /// Falls back to the plain duration when the API has no traffic data for
    /// the leg.
    fn first_leg_durations(&self) -> Result<Vec<f64>, GoogleMapsError> {
        self.routes
            .iter()
            .enumerate()
            .map(|(i, route)| {
                let leg = route.legs.first().ok_or_else(|| {
                    GoogleMapsError::IncompleteResponse(format!("route {} has no legs", i))
                })?;

                leg.duration_in_traffic
                    .or(leg.duration)
                    .map(|duration| duration.value)
                    .ok_or_else(|| {
                        GoogleMapsError::IncompleteResponse(format!(
                            "route {} first leg has no duration",
                            i
                        ))
                    })
            })
            .collect()
    }
}

impl GoogleMapsClient {
    /// Requests alternative routes departing now and returns the
    /// traffic-adjusted first-leg duration of each, in API order.
    pub async fn alternative_route_durations(
        &self,
        origin: &geo_types::Point,
        destination: &geo_types::Point,
        mode: TravelMode,
    ) -> Result<Vec<f64>, GoogleMapsError> {
        let response: DirectionsResponse = self
            .get_json(
                "directions",
                &[
                    ("origin", format_lat_lng(origin)),
                    ("destination", format_lat_lng(destination)),
                    ("mode", mode.to_string()),
                    ("departure_time", "now".to_string()),
                    ("alternatives", "true".to_string()),
                ],
            )
            .await?;

        response.first_leg_durations()
    }
}
