//! Agrégation des aires: totaux en km² et ventilation par région

use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;

use crate::geometry;
use crate::region::RegionKeys;
use crate::types::FeatureCollection;

/// m² par km²
pub const M2_PER_KM2: f64 = 1_000_000.0;

/// Aire totale d'une collection en km² (0 si absente ou vide)
pub fn total_area_km2<'a>(collection: impl Into<Option<&'a FeatureCollection>>) -> f64 {
    collection
        .into()
        .map_or(0.0, |c| geometry::collection_area_m2(c) / M2_PER_KM2)
}

/// Nombre de features et aire cumulée pour un code de région
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionStats {
    pub code: String,
    pub count: usize,
    pub area_km2: f64,
}

impl RegionStats {
    fn empty(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            count: 0,
            area_km2: 0.0,
        }
    }
}

/// Ventilation par région, dans l'ordre des codes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegionBreakdown {
    pub rows: Vec<RegionStats>,
}

impl RegionBreakdown {
    pub fn get(&self, code: &str) -> Option<&RegionStats> {
        self.rows.iter().find(|r| r.code == code)
    }

    pub fn total_count(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }

    pub fn total_area_km2(&self) -> f64 {
        self.rows.iter().map(|r| r.area_km2).sum()
    }

    /// Table "nombre de features par région"
    pub fn count_table(&self, region_header: &str, count_header: &str) -> ChartTable {
        let mut table = ChartTable::new([region_header, count_header]);
        for row in &self.rows {
            table.push(&row.code, [ChartValue::Count(row.count as u64)]);
        }
        table
    }

    /// Table "aire par région"
    pub fn area_table(&self, region_header: &str, area_header: &str) -> ChartTable {
        let mut table = ChartTable::new([region_header, area_header]);
        for row in &self.rows {
            table.push(&row.code, [ChartValue::Measure(row.area_km2)]);
        }
        table
    }
}

/// Ventilation sur une liste fixe de codes.
///
/// Chaque code apparaît, même sans correspondance (axes de graphique
/// stables). Une collection absente donne des lignes à zéro.
pub fn breakdown_by_region<'a, S: AsRef<str>>(
    collection: impl Into<Option<&'a FeatureCollection>>,
    codes: &[S],
    keys: &RegionKeys,
) -> RegionBreakdown {
    let mut rows: Vec<RegionStats> = codes
        .iter()
        .map(|c| RegionStats::empty(c.as_ref()))
        .collect();

    if let Some(collection) = collection.into() {
        for feature in collection {
            let code = keys.region_of(feature);
            let mut area_km2 = None;
            for row in rows.iter_mut().filter(|r| r.code == code) {
                let area = *area_km2.get_or_insert_with(|| geometry::area_m2(feature) / M2_PER_KM2);
                row.count += 1;
                row.area_km2 += area;
            }
        }
    }

    RegionBreakdown { rows }
}

/// Ventilation sur les codes effectivement présents, par ordre d'apparition
pub fn breakdown_observed(collection: &FeatureCollection, keys: &RegionKeys) -> RegionBreakdown {
    let mut rows: Vec<RegionStats> = Vec::new();

    for feature in collection {
        let code = keys.region_of(feature);
        let area = geometry::area_m2(feature) / M2_PER_KM2;
        let idx = match rows.iter().position(|r| r.code == code) {
            Some(idx) => idx,
            None => {
                rows.push(RegionStats::empty(code));
                rows.len() - 1
            }
        };
        rows[idx].count += 1;
        rows[idx].area_km2 += area;
    }

    RegionBreakdown { rows }
}

/// Aire totale et, optionnellement, sa ventilation par région
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AreaSummary {
    pub total_km2: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_region: Option<RegionBreakdown>,
}

impl AreaSummary {
    pub fn of<'a>(collection: impl Into<Option<&'a FeatureCollection>>) -> Self {
        Self {
            total_km2: total_area_km2(collection),
            by_region: None,
        }
    }

    pub fn with_breakdown<'a, S: AsRef<str>>(
        collection: impl Into<Option<&'a FeatureCollection>>,
        codes: &[S],
        keys: &RegionKeys,
    ) -> Self {
        let collection = collection.into();
        Self {
            total_km2: total_area_km2(collection),
            by_region: Some(breakdown_by_region(collection, codes, keys)),
        }
    }
}

/// Valeur d'une cellule de table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartValue {
    Count(u64),
    Measure(f64),
}

/// Table orientée lignes pour un widget de graphique.
///
/// Sérialisée en `[[en-têtes...], [libellé, valeurs...], ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartTable {
    pub header: Vec<String>,
    pub rows: Vec<(String, Vec<ChartValue>)>,
}

impl ChartTable {
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, label: impl Into<String>, values: impl IntoIterator<Item = ChartValue>) {
        self.rows
            .push((label.into(), values.into_iter().collect()));
    }

    /// Table à deux colonnes (libellé, aire) depuis des paires
    pub fn from_measures<I, S>(label_header: &str, value_header: &str, rows: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut table = Self::new([label_header, value_header]);
        for (label, value) in rows {
            table.push(label, [ChartValue::Measure(value)]);
        }
        table
    }
}

struct RowRef<'a>(&'a str, &'a [ChartValue]);

impl Serialize for RowRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.1.len() + 1))?;
        seq.serialize_element(self.0)?;
        for value in self.1 {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

impl Serialize for ChartTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len() + 1))?;
        seq.serialize_element(&self.header)?;
        for (label, values) in &self.rows {
            seq.serialize_element(&RowRef(label, values))?;
        }
        seq.end()
    }
}
