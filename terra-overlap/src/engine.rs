//! Moteur d'intersection: produit cartésien naïf de deux collections
//!
//! Pas d'index spatial: chaque paire (gauche, droite) est évaluée, gauche en
//! boucle externe. Le coût est O(|gauche| x |droite|), ce qui convient aux
//! volumes visés; le rejet par emprise se fait dans l'adaptateur.

use tracing::{debug, trace};

use crate::geometry::{self, Overlap};
use crate::types::FeatureCollection;

/// Compteurs d'une passe, pour les logs uniquement
#[derive(Debug, Default)]
struct PassStats {
    pairs: usize,
    found: usize,
    disjoint: usize,
    failed: usize,
}

/// Intersections non vides de toutes les paires.
///
/// Une entrée absente ou vide donne une collection vide (jamais d'erreur).
/// Chaque paire qui se recouvre produit exactement une feature, dans l'ordre
/// de visite; aucune fusion ni déduplication.
pub fn intersect_all<'a>(
    left: impl Into<Option<&'a FeatureCollection>>,
    right: impl Into<Option<&'a FeatureCollection>>,
) -> FeatureCollection {
    let (Some(left), Some(right)) = (left.into(), right.into()) else {
        return FeatureCollection::default();
    };

    let mut stats = PassStats::default();
    let mut features = Vec::new();

    for l in left {
        for r in right {
            stats.pairs += 1;
            match geometry::overlap(l, r) {
                Overlap::Found(mp) => {
                    stats.found += 1;
                    features.push(geometry::overlap_feature(l, mp));
                }
                Overlap::Disjoint => stats.disjoint += 1,
                Overlap::Failed(reason) => {
                    stats.failed += 1;
                    trace!(reason, "Pair skipped");
                }
            }
        }
    }

    debug!(
        left = left.len(),
        right = right.len(),
        pairs = stats.pairs,
        found = stats.found,
        disjoint = stats.disjoint,
        skipped = stats.failed,
        "Intersection pass done"
    );

    FeatureCollection::new(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::total_area_km2;
    use crate::types::Feature;
    use geo::{coord, Rect};

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Feature {
        Feature::new(Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 }).to_polygon())
    }

    #[test]
    fn test_absent_or_empty_inputs() {
        let a = FeatureCollection::new(vec![square(0.0, 0.0, 1.0, 1.0)]);
        let empty = FeatureCollection::default();

        assert!(intersect_all(&a, &empty).is_empty());
        assert!(intersect_all(&empty, &a).is_empty());
        assert!(intersect_all(&a, None::<&FeatureCollection>).is_empty());
        assert!(intersect_all(None::<&FeatureCollection>, &a).is_empty());
    }

    #[test]
    fn test_visit_order_left_outer() {
        let left = FeatureCollection::new(vec![
            square(0.0, 0.0, 2.0, 2.0).with_property("n", 1),
            square(10.0, 10.0, 12.0, 12.0).with_property("n", 2),
        ]);
        let right = FeatureCollection::new(vec![
            square(11.0, 11.0, 13.0, 13.0),
            square(1.0, 1.0, 3.0, 3.0),
            square(-1.0, -1.0, 0.5, 0.5),
        ]);

        let result = intersect_all(&left, &right);
        assert_eq!(result.len(), 3);
        let order: Vec<i64> = result
            .iter()
            .map(|f| f.properties["n"].as_i64().unwrap())
            .collect();
        assert_eq!(order, vec![1, 1, 2]);
    }

    #[test]
    fn test_no_dedup_of_coincident_results() {
        let left = FeatureCollection::new(vec![square(0.0, 0.0, 1.0, 1.0)]);
        let right = FeatureCollection::new(vec![
            square(-1.0, -1.0, 2.0, 2.0),
            square(-1.0, -1.0, 2.0, 2.0),
        ]);
        assert_eq!(intersect_all(&left, &right).len(), 2);
    }

    #[test]
    fn test_invalid_pairs_skipped() {
        let left = FeatureCollection::new(vec![Feature::default(), square(0.0, 0.0, 2.0, 2.0)]);
        let right = FeatureCollection::new(vec![square(1.0, 1.0, 3.0, 3.0)]);
        assert_eq!(intersect_all(&left, &right).len(), 1);
    }

    #[test]
    fn test_area_bounded_by_operands() {
        let a = FeatureCollection::new(vec![
            square(-50.0, -10.0, -49.0, -9.0),
            square(-48.0, -10.0, -47.0, -9.0),
        ]);
        let b = FeatureCollection::new(vec![square(-49.5, -9.5, -47.5, -8.0)]);

        let inter = total_area_km2(&intersect_all(&a, &b));
        assert!(inter > 0.0);
        assert!(inter <= total_area_km2(&a).min(total_area_km2(&b)) + 1e-6);

        let reverse = total_area_km2(&intersect_all(&b, &a));
        assert!((inter - reverse).abs() <= 1e-6 * inter.max(1.0));
    }
}
