//! Extraction et nettoyage des parties polygonales d'une géométrie

use geo::{Area, Geometry, LineString, MultiPolygon, Polygon};

/// Extrait les polygones exploitables d'une géométrie.
///
/// Retourne `None` si aucun polygone ne survit au nettoyage (géométrie non
/// polygonale, anneaux vides ou dégénérés).
pub fn to_multipolygon(geometry: &Geometry) -> Option<MultiPolygon> {
    let mut polygons = Vec::new();
    collect_polygons(geometry, &mut polygons);

    let polygons: Vec<Polygon> = polygons.into_iter().filter_map(sanitize_polygon).collect();
    if polygons.is_empty() {
        None
    } else {
        Some(MultiPolygon::new(polygons))
    }
}

fn collect_polygons(geometry: &Geometry, out: &mut Vec<Polygon>) {
    match geometry {
        Geometry::Polygon(p) => out.push(p.clone()),
        Geometry::MultiPolygon(mp) => out.extend(mp.0.iter().cloned()),
        Geometry::Rect(r) => out.push(r.to_polygon()),
        Geometry::Triangle(t) => out.push(t.to_polygon()),
        Geometry::GeometryCollection(gc) => {
            for member in gc.0.iter() {
                collect_polygons(member, out);
            }
        }
        _ => {}
    }
}

/// Anneau exploitable: >= 4 points, coordonnées finies
fn ring_ok(ring: &LineString) -> bool {
    ring.0.len() >= 4 && ring.0.iter().all(|c| c.x.is_finite() && c.y.is_finite())
}

/// Écarte un polygone dont l'extérieur est dégénéré, retire les trous dégénérés
fn sanitize_polygon(polygon: Polygon) -> Option<Polygon> {
    if !ring_ok(polygon.exterior()) {
        return None;
    }

    let (exterior, interiors) = polygon.into_inner();
    let interiors = interiors.into_iter().filter(ring_ok).collect();
    let polygon = Polygon::new(exterior, interiors);

    if polygon.unsigned_area() > 0.0 {
        Some(polygon)
    } else {
        None
    }
}
