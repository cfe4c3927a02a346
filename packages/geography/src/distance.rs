//! Haversine distance and the conservative bounding box around a centre.

use std::f64::consts::{FRAC_PI_2, PI};

use wildfire_aq_geography_models::{BoundingBox, GeoPoint};

use crate::GeoError;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Slack (in degrees) added to every edge of the bounding box so that
/// rounding never pushes a point that is inside the radius out of the box.
const BBOX_SLACK_DEG: f64 = 1e-9;

/// Great-circle distance in kilometres between two WGS84 points.
#[must_use]
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    EARTH_RADIUS_KM * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Checks that `center` and `radius_km` describe a usable search circle.
///
/// # Errors
///
/// Returns [`GeoError::InvalidRadius`] for a non-positive or non-finite
/// radius and [`GeoError::InvalidCenter`] for coordinates outside WGS84.
pub fn validate_circle(center: GeoPoint, radius_km: f64) -> Result<(), GeoError> {
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(GeoError::InvalidRadius { radius_km });
    }
    if !center.is_valid() {
        return Err(GeoError::InvalidCenter {
            latitude: center.latitude,
            longitude: center.longitude,
        });
    }
    Ok(())
}

/// Computes a bounding box that contains every point within `radius_km`
/// of `center`.
///
/// The latitude span is the angular radius. The longitude span is the
/// widest longitude reached by the circle, `asin(sin(d) / cos(lat))`.
/// When the circle reaches a pole, or the box would wrap the antimeridian,
/// the full longitude range is used.
///
/// # Errors
///
/// Returns [`GeoError`] if the centre or radius is invalid.
pub fn bounding_box(center: GeoPoint, radius_km: f64) -> Result<BoundingBox, GeoError> {
    validate_circle(center, radius_km)?;

    let angular = radius_km / EARTH_RADIUS_KM;
    if angular >= PI {
        return Ok(BoundingBox::new(-90.0, 90.0, -180.0, 180.0));
    }

    let lat = center.latitude.to_radians();
    let lon = center.longitude.to_radians();
    let lat_min = lat - angular;
    let lat_max = lat + angular;

    if lat_max >= FRAC_PI_2 || lat_min <= -FRAC_PI_2 {
        return Ok(BoundingBox::new(
            lat_min.to_degrees().max(-90.0),
            lat_max.to_degrees().min(90.0),
            -180.0,
            180.0,
        ));
    }

    let d_lon = (angular.sin() / lat.cos()).min(1.0).asin();
    let lon_min = (lon - d_lon).to_degrees() - BBOX_SLACK_DEG;
    let lon_max = (lon + d_lon).to_degrees() + BBOX_SLACK_DEG;
    let (lon_min, lon_max) = if lon_min < -180.0 || lon_max > 180.0 {
        (-180.0, 180.0)
    } else {
        (lon_min, lon_max)
    };

    Ok(BoundingBox::new(
        lat_min.to_degrees() - BBOX_SLACK_DEG,
        lat_max.to_degrees() + BBOX_SLACK_DEG,
        lon_min,
        lon_max,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const IBIRAPUERA: GeoPoint = GeoPoint::new(-23.5870, -46.6610);

    #[test]
    fn zero_distance_to_self() {
        assert!(haversine_km(IBIRAPUERA, IBIRAPUERA).abs() < 1e-12);
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = haversine_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        // 6371 * pi / 180
        assert!((d - 111.194_926_644_558_7).abs() < 1e-6, "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let campinas = GeoPoint::new(-23.1884, -47.8970);
        let a = haversine_km(IBIRAPUERA, campinas);
        let b = haversine_km(campinas, IBIRAPUERA);
        assert!((a - b).abs() < 1e-9);
        assert!(a > 120.0 && a < 140.0, "got {a}");
    }

    #[test]
    fn rejects_non_positive_radius() {
        assert!(matches!(
            bounding_box(IBIRAPUERA, 0.0),
            Err(GeoError::InvalidRadius { .. })
        ));
        assert!(matches!(
            bounding_box(IBIRAPUERA, -5.0),
            Err(GeoError::InvalidRadius { .. })
        ));
        assert!(matches!(
            bounding_box(IBIRAPUERA, f64::NAN),
            Err(GeoError::InvalidRadius { .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_center() {
        assert!(matches!(
            bounding_box(GeoPoint::new(91.0, 0.0), 10.0),
            Err(GeoError::InvalidCenter { .. })
        ));
    }

    #[test]
    fn box_contains_cardinal_points_at_radius() {
        let radius = 150.0;
        let bbox = bounding_box(IBIRAPUERA, radius).unwrap();
        let deg = radius / (EARTH_RADIUS_KM.to_radians());
        assert!(bbox.contains(IBIRAPUERA.latitude + deg * 0.999_999, IBIRAPUERA.longitude));
        assert!(bbox.contains(IBIRAPUERA.latitude - deg * 0.999_999, IBIRAPUERA.longitude));
        assert!(bbox.lon_min < IBIRAPUERA.longitude - deg);
        assert!(bbox.lon_max > IBIRAPUERA.longitude + deg);
    }

    #[test]
    fn polar_circle_spans_all_longitudes() {
        let bbox = bounding_box(GeoPoint::new(89.9, 10.0), 50.0).unwrap();
        assert!((bbox.lat_max - 90.0).abs() < f64::EPSILON);
        assert!((bbox.lon_min + 180.0).abs() < f64::EPSILON);
        assert!((bbox.lon_max - 180.0).abs() < f64::EPSILON);
    }

    #[test]
    fn antimeridian_circle_spans_all_longitudes() {
        let bbox = bounding_box(GeoPoint::new(0.0, 179.9), 100.0).unwrap();
        assert!((bbox.lon_min + 180.0).abs() < f64::EPSILON);
        assert!((bbox.lon_max - 180.0).abs() < f64::EPSILON);
    }
}
