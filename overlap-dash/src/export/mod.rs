//! Modules d'export

pub mod geojson;
