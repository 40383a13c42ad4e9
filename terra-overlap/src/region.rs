//! Filtrage par région administrative
//!
//! Les sources ne s'accordent pas sur le nom de la propriété portant le code
//! de région: on essaie une liste ordonnée de clés candidates, la première
//! valeur "vraie" l'emporte.

use std::collections::BTreeSet;

use geojson::{JsonObject, JsonValue};
use tracing::debug;

use crate::types::{Feature, FeatureCollection};
use crate::OverlapError;

/// Clés par défaut, par ordre de priorité
pub const DEFAULT_REGION_KEYS: [&str; 3] = ["sigla_uf", "UF", "estado"];

/// Liste ordonnée des clés de propriété candidates pour le code de région
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionKeys(Vec<String>);

impl Default for RegionKeys {
    fn default() -> Self {
        Self(DEFAULT_REGION_KEYS.iter().map(|k| k.to_string()).collect())
    }
}

impl RegionKeys {
    /// Crée une liste de clés.
    ///
    /// # Errors
    ///
    /// Retourne `OverlapError::InvalidRegionKeys` si la liste est vide ou
    /// contient une clé vide.
    pub fn new<I, S>(keys: I) -> Result<Self, OverlapError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            return Err(OverlapError::InvalidRegionKeys("at least one key is required".into()));
        }
        if keys.iter().any(|k| k.is_empty()) {
            return Err(OverlapError::InvalidRegionKeys("empty key name".into()));
        }
        Ok(Self(keys))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Résout le code de région d'un jeu de propriétés.
    ///
    /// Une valeur nulle, `false`, `0` ou `""` passe à la clé suivante. Une
    /// valeur vraie qui n'est pas du texte arrête la recherche et ne
    /// correspond à aucun code.
    pub fn resolve<'a>(&self, properties: &'a JsonObject) -> &'a str {
        for key in &self.0 {
            match properties.get(key) {
                Some(JsonValue::String(code)) if !code.is_empty() => return code,
                Some(value) if is_truthy(value) => return "",
                _ => {}
            }
        }
        ""
    }

    /// Code de région d'une feature
    pub fn region_of<'a>(&self, feature: &'a Feature) -> &'a str {
        self.resolve(&feature.properties)
    }
}

fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

/// Ensemble de codes de région sélectionnés.
///
/// Valeur immuable: chaque modification produit une nouvelle sélection.
/// L'ensemble vide signifie "pas de filtre".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RegionSelection(BTreeSet<String>);

impl RegionSelection {
    /// Sélection vide (toutes les régions passent)
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.contains(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Vrai si une feature de ce code passe le filtre
    pub fn matches(&self, code: &str) -> bool {
        self.is_empty() || self.contains(code)
    }

    /// Nouvelle sélection avec `code` ajouté
    pub fn with(&self, code: impl Into<String>) -> Self {
        let mut codes = self.0.clone();
        codes.insert(code.into());
        Self(codes)
    }

    /// Nouvelle sélection sans `code`
    pub fn without(&self, code: &str) -> Self {
        let mut codes = self.0.clone();
        codes.remove(code);
        Self(codes)
    }

    /// Coche/décoche un code (comportement d'une case à cocher)
    pub fn toggle(&self, code: &str) -> Self {
        if self.contains(code) {
            self.without(code)
        } else {
            self.with(code)
        }
    }

    /// Vérifie que chaque code appartient au catalogue.
    ///
    /// # Errors
    ///
    /// Retourne `OverlapError::UnknownRegion` pour le premier code inconnu.
    pub fn validate_against(&self, catalog: &[String]) -> Result<(), OverlapError> {
        match self.iter().find(|code| !catalog.iter().any(|c| c == *code)) {
            Some(code) => Err(OverlapError::unknown_region(code, catalog)),
            None => Ok(()),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for RegionSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Filtre une collection par région.
///
/// Sélection vide: la collection est renvoyée telle quelle. Collection
/// absente: résultat absent. L'ordre des features est conservé.
pub fn filter_by_region<'a>(
    collection: impl Into<Option<&'a FeatureCollection>>,
    selection: &RegionSelection,
    keys: &RegionKeys,
) -> Option<FeatureCollection> {
    let collection = collection.into()?;
    if selection.is_empty() {
        return Some(collection.clone());
    }

    let filtered: FeatureCollection = collection
        .iter()
        .filter(|f| selection.contains(keys.region_of(f)))
        .cloned()
        .collect();

    debug!(
        input = collection.len(),
        kept = filtered.len(),
        regions = selection.len(),
        "Region filter applied"
    );
    Some(filtered)
}
