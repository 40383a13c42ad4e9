//! # terra-overlap
//!
//! Intersection et agrégation d'aires entre deux couches de polygones
//! (parcelles rurales, terres indigènes), filtrées par région administrative.
//!
//! ## Features
//!
//! - Filtrage par code de région avec résolution tolérante du nom de propriété
//! - Intersections deux à deux (produit cartésien, rejet par emprise)
//! - Aires sphériques en km², ventilation par région, tables pour graphiques
//! - Recalcul complet sur changement d'entrée (`Dashboard`)
//! - Les géométries invalides ne font jamais échouer un calcul
//!
//! ## Usage
//!
//! ```rust,ignore
//! use terra_overlap::{intersect_all, filter_by_region, total_area_km2};
//! use terra_overlap::{FeatureCollection, RegionKeys, RegionSelection};
//!
//! let imoveis = FeatureCollection::from_geojson_str(&imoveis_json)?;
//! let terras = FeatureCollection::from_geojson_str(&terras_json)?;
//!
//! let selection: RegionSelection = ["PA"].into_iter().collect();
//! let keys = RegionKeys::default();
//! let left = filter_by_region(&imoveis, &selection, &keys);
//! let right = filter_by_region(&terras, &selection, &keys);
//!
//! let overlap = intersect_all(left.as_ref(), right.as_ref());
//! println!("Interseção: {:.2} km²", total_area_km2(&overlap));
//! ```

pub mod aggregate;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod region;
pub mod types;

pub use aggregate::{
    breakdown_by_region, breakdown_observed, total_area_km2, AreaSummary, ChartTable, ChartValue,
    RegionBreakdown, RegionStats,
};
pub use dashboard::{recompute, Dashboard, Inputs, Snapshot, SnapshotObserver};
pub use engine::intersect_all;
pub use error::OverlapError;
pub use geometry::{area_m2, bounds, intersect, Bounds};
pub use region::{filter_by_region, RegionKeys, RegionSelection, DEFAULT_REGION_KEYS};
pub use types::{Feature, FeatureCollection};

pub use geojson::{JsonObject, JsonValue};
