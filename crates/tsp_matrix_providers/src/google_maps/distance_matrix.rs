use serde::Deserialize;
use tracing::debug;

use crate::travel_matrices::{FetchedMatrices, TravelMatrices};

use super::{
    ApiResponse, GoogleMapsClient, GoogleMapsError, TextValue, TravelMode, format_lat_lng,
};

/// Maximum origins × destinations elements per request.
pub const MAX_ELEMENTS_PER_REQUEST: usize = 100;

#[derive(Deserialize, Debug)]
pub(crate) struct DistanceMatrixResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    rows: Vec<Row>,
}

#[derive(Deserialize, Debug)]
struct Row {
    elements: Vec<Element>,
}

#[derive(Deserialize, Debug)]
struct Element {
    status: String,
    duration: Option<TextValue>,
    duration_in_traffic: Option<TextValue>,
    distance: Option<TextValue>,
}

impl ApiResponse for DistanceMatrixResponse {
    fn status(&self) -> &str {
        &self.status
    }

    fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

impl DistanceMatrixResponse {
    /// Appends the rows of this response to the flat `times` / `distances`
    /// buffers. Every cell must be present and `OK`.
    fn append_rows(
        self,
        expected_rows: usize,
        num_destinations: usize,
        times: &mut Vec<f64>,
        distances: &mut Vec<f64>,
    ) -> Result<(), GoogleMapsError> {
        if self.rows.len() != expected_rows {
            return Err(GoogleMapsError::IncompleteResponse(format!(
                "expected {} rows, got {}",
                expected_rows,
                self.rows.len()
            )));
        }

        for (i, row) in self.rows.into_iter().enumerate() {
            if row.elements.len() != num_destinations {
                return Err(GoogleMapsError::IncompleteResponse(format!(
                    "row {} has {} elements, expected {}",
                    i,
                    row.elements.len(),
                    num_destinations
                )));
            }

            for (j, element) in row.elements.into_iter().enumerate() {
                if element.status != "OK" {
                    return Err(GoogleMapsError::IncompleteResponse(format!(
                        "element ({}, {}) has status {}",
                        i, j, element.status
                    )));
                }

                let time = element
                    .duration_in_traffic
                    .or(element.duration)
                    .ok_or_else(|| {
                        GoogleMapsError::IncompleteResponse(format!(
                            "element ({}, {}) has no duration",
                            i, j
                        ))
                    })?;
                let distance = element.distance.ok_or_else(|| {
                    GoogleMapsError::IncompleteResponse(format!(
                        "element ({}, {}) has no distance",
                        i, j
                    ))
                })?;

                times.push(time.value);
                distances.push(distance.value);
            }
        }

        Ok(())
    }
}

fn join_points(points: &[geo_types::Point]) -> String {
    points
        .iter()
        .map(format_lat_lng)
        .collect::<Vec<_>>()
        .join("|")
}

impl GoogleMapsClient {
    /// Full origins × destinations matrix over `points`, departing now.
    ///
    /// Origins are batched so that no request exceeds
    /// [`MAX_ELEMENTS_PER_REQUEST`]; ten points fit in a single request. The
    /// response bodies are returned alongside the matrices, unmodified.
    pub async fn fetch_matrix(
        &self,
        points: &[geo_types::Point],
        mode: TravelMode,
    ) -> Result<FetchedMatrices, GoogleMapsError> {
        let num_points = points.len();
        let mut times = Vec::with_capacity(num_points * num_points);
        let mut distances = Vec::with_capacity(num_points * num_points);
        let mut responses = Vec::new();

        if num_points == 0 {
            return Ok(TravelMatrices {
                distances,
                times,
                costs: None,
            }
            .into());
        }

        if num_points > MAX_ELEMENTS_PER_REQUEST {
            return Err(GoogleMapsError::IncompleteResponse(format!(
                "{} destinations exceed the per-request limit of {}",
                num_points, MAX_ELEMENTS_PER_REQUEST
            )));
        }

        let destinations = join_points(points);
        let rows_per_request = (MAX_ELEMENTS_PER_REQUEST / num_points).max(1);

        for origins in points.chunks(rows_per_request) {
            debug!(
                "GoogleMapsApi: requesting {}x{} distance matrix",
                origins.len(),
                num_points
            );

            let (response, raw): (DistanceMatrixResponse, _) = self
                .get_json_raw(
                    "distancematrix",
                    &[
                        ("origins", join_points(origins)),
                        ("destinations", destinations.clone()),
                        ("mode", mode.to_string()),
                        ("departure_time", "now".to_string()),
                    ],
                )
                .await?;

            response.append_rows(origins.len(), num_points, &mut times, &mut distances)?;
            responses.push(raw);
        }

        Ok(FetchedMatrices {
            matrices: TravelMatrices {
                distances,
                times,
                costs: None,
            },
            responses,
        })
    }
}
