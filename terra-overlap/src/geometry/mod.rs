//! Adaptateur des primitives géométriques (aire, intersection)
//!
//! Isole le reste du crate des particularités de `geo`: les géométries
//! dégénérées valent une aire nulle, une intersection impossible à évaluer
//! vaut "pas d'intersection". Rien ne remonte à l'appelant.

pub mod bounds;
pub mod polygonal;

use std::panic::{self, AssertUnwindSafe};

use geo::{
    Area, BooleanOps, BoundingRect, ChamberlainDuquetteArea, Geometry, Intersects, MultiPolygon,
    Polygon,
};
use tracing::trace;

use crate::types::{Feature, FeatureCollection};

pub use bounds::{bounds, Bounds};

/// Issue de l'évaluation d'une paire.
///
/// Les deux cas d'échec sont traités de la même façon par l'appelant.
#[derive(Debug)]
pub(crate) enum Overlap {
    /// Recouvrement non vide
    Found(MultiPolygon),
    /// Évaluation réussie, aucun recouvrement
    Disjoint,
    /// Évaluation impossible
    Failed(&'static str),
}

/// Aire sphérique d'une géométrie en m² (0 si non polygonale ou dégénérée)
pub fn geometry_area_m2(geometry: &Geometry) -> f64 {
    let Some(mp) = polygonal::to_multipolygon(geometry) else {
        return 0.0;
    };
    let area = mp.chamberlain_duquette_unsigned_area();
    if area.is_finite() {
        area
    } else {
        0.0
    }
}

/// Aire d'une feature en m²
pub fn area_m2(feature: &Feature) -> f64 {
    feature.geometry.as_ref().map_or(0.0, geometry_area_m2)
}

/// Somme des aires d'une collection en m²
pub fn collection_area_m2(collection: &FeatureCollection) -> f64 {
    collection.iter().map(area_m2).sum()
}

/// Intersection de deux features polygonales.
///
/// `None` si les géométries ne se recouvrent pas ou si l'intersection ne
/// peut pas être calculée. La feature produite reprend les propriétés de
/// `left`.
pub fn intersect(left: &Feature, right: &Feature) -> Option<Feature> {
    match overlap(left, right) {
        Overlap::Found(mp) => Some(overlap_feature(left, mp)),
        Overlap::Disjoint => None,
        Overlap::Failed(reason) => {
            trace!(reason, "Intersection could not be evaluated");
            None
        }
    }
}

pub(crate) fn overlap(left: &Feature, right: &Feature) -> Overlap {
    let a = left.geometry.as_ref().and_then(polygonal::to_multipolygon);
    let b = right.geometry.as_ref().and_then(polygonal::to_multipolygon);
    let (Some(a), Some(b)) = (a, b) else {
        return Overlap::Failed("not polygonal");
    };

    let (Some(rect_a), Some(rect_b)) = (a.bounding_rect(), b.bounding_rect()) else {
        return Overlap::Failed("no bounding box");
    };
    if !rect_a.intersects(&rect_b) {
        return Overlap::Disjoint;
    }

    // Les opérations booléennes de `geo` peuvent paniquer sur des anneaux
    // auto-intersectants.
    let Ok(result) = panic::catch_unwind(AssertUnwindSafe(|| a.intersection(&b))) else {
        return Overlap::Failed("boolean operation panicked");
    };

    let polygons: Vec<Polygon> = result
        .0
        .into_iter()
        .filter(|p| p.unsigned_area() > 0.0)
        .collect();

    if polygons.is_empty() {
        Overlap::Disjoint
    } else {
        Overlap::Found(MultiPolygon::new(polygons))
    }
}

/// Feature résultat d'un recouvrement, avec les propriétés de `left`
pub(crate) fn overlap_feature(left: &Feature, mp: MultiPolygon) -> Feature {
    Feature {
        id: None,
        geometry: Some(into_geometry(mp)),
        properties: left.properties.clone(),
    }
}

/// Un seul polygone -> `Polygon`, sinon `MultiPolygon`
fn into_geometry(mp: MultiPolygon) -> Geometry {
    match <[Polygon; 1]>::try_from(mp.0) {
        Ok([polygon]) => Geometry::Polygon(polygon),
        Err(polygons) => Geometry::MultiPolygon(MultiPolygon::new(polygons)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, BoundingRect, LineString, Point, Rect};

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Feature {
        Feature::new(Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 }).to_polygon())
    }

    #[test]
    fn test_area_one_degree_square_at_equator() {
        let km2 = area_m2(&square(0.0, 0.0, 1.0, 1.0)) / 1_000_000.0;
        assert!(km2 > 12_000.0 && km2 < 12_500.0, "got {km2}");
    }

    #[test]
    fn test_area_degenerate_is_zero() {
        let empty_ring = Feature::new(Polygon::new(LineString::new(vec![]), vec![]));
        assert_eq!(area_m2(&empty_ring), 0.0);
        assert_eq!(area_m2(&Feature::default()), 0.0);
        assert_eq!(area_m2(&Feature::new(Point::new(1.0, 1.0))), 0.0);
    }

    #[test]
    fn test_collection_area_is_sum() {
        let a = square(0.0, 0.0, 1.0, 1.0);
        let b = square(10.0, 10.0, 11.0, 11.0);
        let total = collection_area_m2(&FeatureCollection::new(vec![a.clone(), b.clone()]));
        assert!((total - (area_m2(&a) + area_m2(&b))).abs() < 1e-6);
    }

    #[test]
    fn test_intersect_overlapping_squares() {
        let a = square(0.0, 0.0, 2.0, 2.0).with_property("sigla_uf", "X");
        let b = square(1.0, 1.0, 3.0, 3.0).with_property("sigla_uf", "Y");

        let result = intersect(&a, &b).unwrap();
        let geometry = result.geometry.unwrap();
        assert!(matches!(geometry, Geometry::Polygon(_)));
        assert!((geometry.unsigned_area() - 1.0).abs() < 1e-9);

        let rect = geometry.bounding_rect().unwrap();
        assert!((rect.min().x - 1.0).abs() < 1e-9 && (rect.min().y - 1.0).abs() < 1e-9);
        assert!((rect.max().x - 2.0).abs() < 1e-9 && (rect.max().y - 2.0).abs() < 1e-9);
        assert_eq!(result.properties["sigla_uf"], "X");
    }

    #[test]
    fn test_intersect_disjoint() {
        let a = square(0.0, 0.0, 1.0, 1.0);
        let b = square(5.0, 5.0, 6.0, 6.0);
        assert!(matches!(overlap(&a, &b), Overlap::Disjoint));
        assert!(intersect(&a, &b).is_none());
    }

    #[test]
    fn test_intersect_touching_edges_is_none() {
        let a = square(0.0, 0.0, 1.0, 1.0);
        let b = square(1.0, 0.0, 2.0, 1.0);
        assert!(intersect(&a, &b).is_none());
    }

    #[test]
    fn test_intersect_invalid_input_is_none() {
        let a = square(0.0, 0.0, 1.0, 1.0);
        let point = Feature::new(Point::new(0.5, 0.5));
        assert!(matches!(overlap(&a, &point), Overlap::Failed(_)));
        assert!(intersect(&a, &Feature::default()).is_none());
    }

    #[test]
    fn test_intersect_multipolygon_result() {
        let a = square(0.0, 0.0, 3.0, 1.0);
        let b = Feature::new(MultiPolygon::new(vec![
            Rect::new(coord! { x: 0.5, y: -1.0 }, coord! { x: 1.0, y: 2.0 }).to_polygon(),
            Rect::new(coord! { x: 2.0, y: -1.0 }, coord! { x: 2.5, y: 2.0 }).to_polygon(),
        ]));
        let geometry = intersect(&a, &b).unwrap().geometry.unwrap();
        match geometry {
            Geometry::MultiPolygon(mp) => {
                assert_eq!(mp.0.len(), 2);
                assert!((mp.unsigned_area() - 1.0).abs() < 1e-9);
            }
            other => panic!("expected MultiPolygon, got {other:?}"),
        }
    }
}
