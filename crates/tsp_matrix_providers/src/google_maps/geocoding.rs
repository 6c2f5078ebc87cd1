use serde::Deserialize;

use super::{ApiResponse, GoogleMapsClient, GoogleMapsError};

#[derive(Deserialize, Debug)]
pub(crate) struct GeocodeResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Deserialize, Debug)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Deserialize, Debug)]
struct Geometry {
    location: LatLng,
}

#[derive(Deserialize, Debug)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl ApiResponse for GeocodeResponse {
    fn status(&self) -> &str {
        &self.status
    }

    fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

impl GeocodeResponse {
    fn into_candidates(self) -> Vec<geo_types::Point> {
        self.results
            .into_iter()
            .map(|result| {
                geo_types::Point::new(result.geometry.location.lng, result.geometry.location.lat)
            })
            .collect()
    }
}

impl GoogleMapsClient {
    /// Candidates for `address` in the order the API ranks them. An empty list
    /// means the address could not be resolved.
    ///
    /// Makes a single request; [`GoogleMapsError::is_transient`] tells the
    /// caller whether another attempt is worthwhile.
    pub async fn geocode(&self, address: &str) -> Result<Vec<geo_types::Point>, GoogleMapsError> {
        let response: GeocodeResponse = self
            .get_json_once("geocode", &[("address", address.to_string())])
            .await?;

        Ok(response.into_candidates())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_keep_api_order() {
        let body = r#"{
            "status": "OK",
            "results": [
                { "formatted_address": "Grand Place, Brussels", "geometry": { "location": { "lat": 50.8467, "lng": 4.3525 } } },
                { "formatted_address": "Grote Markt, Antwerp", "geometry": { "location": { "lat": 51.2211, "lng": 4.3997 } } }
            ]
        }"#;

        let response: GeocodeResponse = serde_json::from_str(body).unwrap();
        let candidates = response.into_candidates();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].y(), 50.8467);
        assert_eq!(candidates[0].x(), 4.3525);
    }

    #[test]
    fn test_zero_results_has_no_candidates() {
        let body = r#"{ "status": "ZERO_RESULTS", "results": [] }"#;

        let response: GeocodeResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.status(), "ZERO_RESULTS");
        assert!(response.into_candidates().is_empty());
    }
}
