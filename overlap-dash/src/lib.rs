//! # overlap-dash
//!
//! Tableau de bord de recouvrement entre parcelles rurales et terres
//! indigènes, construit sur `terra-overlap`.
//!
//! ## Features
//!
//! - Configuration JSON (preset `brasil` embarqué ou fichier)
//! - Chargement asynchrone des deux couches, source illisible = couche absente
//! - Rapport console/JSON avec tables de graphiques et emprise
//! - Export GeoJSON streaming des couches filtrées et de l'intersection
//! - Surveillance des sources avec recalcul à chaque modification
//!
//! ## Usage CLI
//!
//! ```bash
//! # Résumé sur le preset brasil
//! overlap-dash summary --region PA --region AM
//!
//! # Export pour le rendu carte/graphiques
//! overlap-dash export --output ./out/
//!
//! # Recalcul à chaque modification des sources
//! overlap-dash watch --left imoveis.geojson --right terras.geojson
//! ```

pub mod config;
pub mod export;
pub mod report;
pub mod source;

pub use config::Config;
pub use report::{DashboardReport, DashboardStatus};
pub use source::LoadedSource;
