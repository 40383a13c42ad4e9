//! Types d'erreurs pour le crate terra-overlap
//!
//! Seules les erreurs structurelles remontent à l'appelant. Les géométries
//! invalides sont absorbées par l'adaptateur géométrique (aire nulle, paire
//! ignorée) et n'apparaissent jamais ici.

use thiserror::Error;

/// Erreurs pouvant survenir à la frontière du système
#[derive(Debug, Error)]
pub enum OverlapError {
    /// Le document n'est pas du GeoJSON valide
    #[error("Invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),

    /// Le document est du GeoJSON mais pas une FeatureCollection
    #[error("Expected a FeatureCollection, got {0}")]
    NotAFeatureCollection(String),

    /// Code de région absent du catalogue
    #[error("Unknown region code: {code} (known: {known})")]
    UnknownRegion { code: String, known: String },

    /// Liste de clés de région invalide
    #[error("Invalid region keys: {0}")]
    InvalidRegionKeys(String),
}

impl OverlapError {
    /// Crée une erreur de région inconnue avec le catalogue pour contexte
    pub fn unknown_region(code: impl Into<String>, catalog: &[String]) -> Self {
        Self::UnknownRegion {
            code: code.into(),
            known: catalog.join(", "),
        }
    }
}
