//! Radius filter over positioned items.

use wildfire_aq_geography_models::{GeoPoint, Located, Positioned};

use crate::GeoError;
use crate::distance::{bounding_box, haversine_km};

/// Keeps the items whose Haversine distance to `center` is at most
/// `radius_km`, annotating each with that distance.
///
/// Items are first screened against [`bounding_box`], which only discards
/// points that are certainly outside the circle, so the result is the same
/// as applying the Haversine cutoff to every item. Input order is kept.
///
/// # Errors
///
/// Returns [`GeoError`] if the centre or radius is invalid.
pub fn within_radius<T, I>(
    center: GeoPoint,
    radius_km: f64,
    items: I,
) -> Result<Vec<Located<T>>, GeoError>
where
    T: Positioned,
    I: IntoIterator<Item = T>,
{
    let bbox = bounding_box(center, radius_km)?;

    let mut candidates = 0usize;
    let located: Vec<Located<T>> = items
        .into_iter()
        .filter(|item| bbox.contains(item.latitude(), item.longitude()))
        .filter_map(|item| {
            candidates += 1;
            let distance_km =
                haversine_km(center, GeoPoint::new(item.latitude(), item.longitude()));
            (distance_km <= radius_km).then_some(Located { item, distance_km })
        })
        .collect();

    log::debug!(
        "Radius filter: {} of {candidates} bounding-box candidates within {radius_km} km of {center}",
        located.len()
    );

    Ok(located)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng as _, SeedableRng as _};

    use super::*;

    const IBIRAPUERA: GeoPoint = GeoPoint::new(-23.5870, -46.6610);

    #[test]
    fn keeps_points_inside_and_drops_points_outside() {
        let points = vec![
            GeoPoint::new(-23.5870, -46.6610),
            GeoPoint::new(-23.1884, -47.8970),
            GeoPoint::new(-22.3146, -49.0629),
        ];

        let kept = within_radius(IBIRAPUERA, 150.0, points).unwrap();

        assert_eq!(kept.len(), 2);
        assert!(kept[0].distance_km.abs() < 1e-9);
        assert!(kept[1].distance_km > 100.0 && kept[1].distance_km < 150.0);
    }

    #[test]
    fn point_exactly_on_the_radius_is_kept() {
        let edge = GeoPoint::new(1.0, 0.0);
        let radius = haversine_km(GeoPoint::new(0.0, 0.0), edge);

        let kept = within_radius(GeoPoint::new(0.0, 0.0), radius, vec![edge]).unwrap();

        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let kept = within_radius(IBIRAPUERA, 10.0, Vec::<GeoPoint>::new()).unwrap();
        assert!(kept.is_empty());
    }

    #[test]
    fn invalid_radius_is_rejected() {
        let result = within_radius(IBIRAPUERA, 0.0, vec![IBIRAPUERA]);
        assert!(matches!(result, Err(GeoError::InvalidRadius { .. })));
    }

    #[test]
    fn matches_direct_haversine_for_random_points() {
        let mut rng = StdRng::seed_from_u64(0x5EED_F1E5);

        for _ in 0..200 {
            let center = GeoPoint::new(rng.random_range(-85.0..85.0), rng.random_range(-179.0..179.0));
            let radius = rng.random_range(1.0..2_000.0);
            let spread = radius / 50.0;

            let points: Vec<GeoPoint> = (0..100)
                .map(|_| {
                    GeoPoint::new(
                        (center.latitude + rng.random_range(-spread..spread)).clamp(-90.0, 90.0),
                        (center.longitude + rng.random_range(-spread..spread))
                            .clamp(-180.0, 180.0),
                    )
                })
                .collect();

            let expected: Vec<GeoPoint> = points
                .iter()
                .copied()
                .filter(|p| haversine_km(center, *p) <= radius)
                .collect();

            let kept: Vec<GeoPoint> = within_radius(center, radius, points.clone())
                .unwrap()
                .into_iter()
                .map(|l| l.item)
                .collect();

            assert_eq!(kept, expected, "center {center}, radius {radius}");
        }
    }
}
