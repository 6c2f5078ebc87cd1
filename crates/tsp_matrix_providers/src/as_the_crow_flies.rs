use crate::travel_matrices::TravelMatrices;

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance in meters. Points are `(x = lng, y = lat)`.
pub fn haversine_distance(from: &geo_types::Point, to: &geo_types::Point) -> f64 {
    let lat1_rad = from.y().to_radians();
    let lat2_rad = to.y().to_radians();

    let delta_lat = lat2_rad - lat1_rad;
    let delta_lon = (to.x() - from.x()).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

pub fn as_the_crow_flies_matrices(points: &[geo_types::Point], speed_kmh: f64) -> TravelMatrices {
    let num_points = points.len();
    let mut distances: Vec<f64> = vec![0.0; num_points * num_points];
    let mut times: Vec<f64> = vec![0.0; num_points * num_points];

    let meters_per_second = speed_kmh / 3.6;

    for (i, from) in points.iter().enumerate() {
        for (j, to) in points.iter().enumerate() {
            let distance = haversine_distance(from, to);
            distances[i * num_points + j] = distance;
            times[i * num_points + j] = if meters_per_second > 0.0 {
                distance / meters_per_second
            } else {
                0.0
            };
        }
    }

    TravelMatrices {
        distances,
        times,
        costs: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_brussels_antwerp() {
        let brussels = geo_types::Point::new(4.3517, 50.8503);
        let antwerp = geo_types::Point::new(4.4025, 51.2194);

        let distance = haversine_distance(&brussels, &antwerp);

        // Roughly 41 km apart
        assert!((distance - 41_000.0).abs() < 1_000.0);
    }

    #[test]
    fn test_matrices_shape_and_times() {
        let points = vec![
            geo_types::Point::new(4.3517, 50.8503),
            geo_types::Point::new(4.4025, 51.2194),
            geo_types::Point::new(3.7174, 51.0543),
        ];

        let matrices = as_the_crow_flies_matrices(&points, 36.0);

        assert!(matrices.covers(3));
        assert_eq!(matrices.distance(0, 0), Some(0.0));
        assert_eq!(matrices.distance(0, 1), matrices.distance(1, 0));

        // 36 km/h is 10 m/s
        let distance = matrices.distance(0, 2).unwrap();
        let time = matrices.time(0, 2).unwrap();
        assert!((time - distance / 10.0).abs() < 1e-6);
    }
}
