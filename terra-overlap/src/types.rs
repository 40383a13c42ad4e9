//! Types de données pour le crate terra-overlap

use std::str::FromStr;

use geo::Geometry;
use geojson::{feature::Id, GeoJson, JsonObject, JsonValue};
use tracing::trace;

use crate::OverlapError;

/// Une feature: géométrie en longitude/latitude et ses propriétés
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feature {
    /// Identifiant GeoJSON (optionnel)
    pub id: Option<Id>,

    /// Géométrie convertie, `None` si absente ou inexploitable
    pub geometry: Option<Geometry>,

    /// Propriétés (clé -> valeur scalaire)
    pub properties: JsonObject,
}

impl Feature {
    /// Crée une feature sans propriétés
    pub fn new(geometry: impl Into<Geometry>) -> Self {
        Self {
            id: None,
            geometry: Some(geometry.into()),
            properties: JsonObject::new(),
        }
    }

    /// Ajoute une propriété (builder)
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Convertit en feature GeoJSON
    pub fn to_geojson(&self) -> geojson::Feature {
        geojson::Feature {
            bbox: None,
            geometry: self
                .geometry
                .as_ref()
                .map(|g| geojson::Geometry::new(geojson::Value::from(g))),
            id: self.id.clone(),
            properties: Some(self.properties.clone()),
            foreign_members: None,
        }
    }
}

impl From<geojson::Feature> for Feature {
    fn from(feature: geojson::Feature) -> Self {
        let geometry = feature.geometry.and_then(convert_geometry);
        Self {
            id: feature.id,
            geometry,
            properties: feature.properties.unwrap_or_default(),
        }
    }
}

/// Collection ordonnée de features
///
/// Une collection vide est valide: elle signifie "pas de données" ou
/// "aucune correspondance", jamais une erreur.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    /// Parse un document GeoJSON.
    ///
    /// # Errors
    ///
    /// Retourne `OverlapError` si le document n'est pas du GeoJSON ou n'est pas
    /// une `FeatureCollection` (liste `features` absente comprise). Les
    /// géométries individuelles invalides ne sont pas des erreurs.
    pub fn from_geojson_str(s: &str) -> Result<Self, OverlapError> {
        match GeoJson::from_str(s)? {
            GeoJson::FeatureCollection(fc) => Ok(Self::from(fc)),
            GeoJson::Feature(_) => Err(OverlapError::NotAFeatureCollection("Feature".into())),
            GeoJson::Geometry(_) => Err(OverlapError::NotAFeatureCollection("Geometry".into())),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }

    /// Convertit en FeatureCollection GeoJSON
    pub fn to_geojson(&self) -> geojson::FeatureCollection {
        geojson::FeatureCollection {
            bbox: None,
            features: self.features.iter().map(Feature::to_geojson).collect(),
            foreign_members: None,
        }
    }

    /// Sérialise en texte GeoJSON
    pub fn to_geojson_string(&self) -> String {
        GeoJson::from(self.to_geojson()).to_string()
    }
}

impl From<geojson::FeatureCollection> for FeatureCollection {
    fn from(fc: geojson::FeatureCollection) -> Self {
        Self {
            features: fc.features.into_iter().map(Feature::from).collect(),
        }
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FeatureCollection {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

/// Convertit une géométrie GeoJSON en `geo::Geometry`.
///
/// Les positions de moins de deux nombres finis feraient échouer (voire
/// paniquer) la conversion: elles sont rejetées avant.
fn convert_geometry(geometry: geojson::Geometry) -> Option<Geometry> {
    if !positions_ok(&geometry.value) {
        trace!("Dropping geometry with malformed positions");
        return None;
    }
    match Geometry::<f64>::try_from(geometry) {
        Ok(g) => Some(g),
        Err(e) => {
            trace!(error = %e, "Dropping unconvertible geometry");
            None
        }
    }
}

fn positions_ok(value: &geojson::Value) -> bool {
    use geojson::Value;

    fn position_ok(p: &[f64]) -> bool {
        p.len() >= 2 && p[0].is_finite() && p[1].is_finite()
    }

    match value {
        Value::Point(p) => position_ok(p),
        Value::MultiPoint(ps) | Value::LineString(ps) => ps.iter().all(|p| position_ok(p)),
        Value::MultiLineString(lines) | Value::Polygon(lines) => {
            lines.iter().flatten().all(|p| position_ok(p))
        }
        Value::MultiPolygon(polygons) => polygons.iter().flatten().flatten().all(|p| position_ok(p)),
        Value::GeometryCollection(members) => members.iter().all(|g| positions_ok(&g.value)),
    }
}
