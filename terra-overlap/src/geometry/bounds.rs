//! Emprise d'une collection (cadrage de la carte)

use geo::{BoundingRect, Rect};
use serde::Serialize;

use crate::types::FeatureCollection;

/// Emprise en degrés (longitude/latitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Bounds {
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            west: rect.min().x,
            south: rect.min().y,
            east: rect.max().x,
            north: rect.max().y,
        }
    }

    /// Plus petite emprise contenant les deux
    pub fn union(self, other: Self) -> Self {
        Self {
            west: self.west.min(other.west),
            south: self.south.min(other.south),
            east: self.east.max(other.east),
            north: self.north.max(other.north),
        }
    }

    /// Coins `[[sud, ouest], [nord, est]]`, ordre lat/lng attendu par les widgets de carte
    pub fn to_lat_lng(&self) -> [[f64; 2]; 2] {
        [[self.south, self.west], [self.north, self.east]]
    }

    fn is_finite(&self) -> bool {
        [self.west, self.south, self.east, self.north]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Emprise de toutes les features qui en ont une.
///
/// Les features sans géométrie ou à coordonnées non finies sont ignorées.
/// `None` si aucune feature n'a d'emprise.
pub fn bounds(collection: &FeatureCollection) -> Option<Bounds> {
    collection
        .iter()
        .filter_map(|f| f.geometry.as_ref()?.bounding_rect())
        .map(Bounds::from_rect)
        .filter(Bounds::is_finite)
        .reduce(Bounds::union)
}
