//! Rapport de tableau de bord avec graceful degradation
//!
//! Ce module assemble un instantané, la configuration et l'état des sources
//! en un rapport affichable sur la console ou sauvegardable en JSON.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use terra_overlap::{ChartTable, RegionBreakdown, Snapshot};

use crate::config::{Config, LayerStyle};
use crate::source::LoadedSource;

/// Statut global du rapport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DashboardStatus {
    /// Les deux sources sont chargées
    Complete,
    /// Une source est absente
    Partial,
    /// Aucune source chargée
    Empty,
}

/// État d'une couche dans le rapport
#[derive(Debug, Clone, Serialize)]
pub struct LayerReport {
    pub label: String,
    /// Source chargée (toujours vrai pour l'intersection)
    pub present: bool,
    /// Nombre de features après filtrage
    pub features: usize,
    pub area_km2: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    pub style: LayerStyle,
}

/// Tables prêtes pour les widgets de graphiques
#[derive(Debug, Clone, Serialize)]
pub struct ChartSet {
    /// Nombre de features de la couche gauche par région
    pub count_by_region: ChartTable,
    /// Aire de la couche gauche par région
    pub area_by_region: ChartTable,
    /// Aire par couche (gauche, droite, intersection)
    pub area_by_layer: ChartTable,
}

/// Rapport complet d'une passe
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    /// Numéro de passe de l'instantané
    pub generation: u64,
    /// Durée du chargement et du calcul
    pub duration_secs: f64,
    /// Statut global
    pub status: DashboardStatus,
    /// Régions sélectionnées (vide: toutes)
    pub selection: Vec<String>,

    pub left: LayerReport,
    pub right: LayerReport,
    pub intersection: LayerReport,

    /// Ventilation de la couche gauche filtrée
    pub by_region: RegionBreakdown,
    pub charts: ChartSet,

    /// `[[sud, ouest], [nord, est]]` de la couche gauche filtrée
    pub bounds: Option<[[f64; 2]; 2]>,

    /// Liste des warnings
    pub warnings: Vec<String>,
}

impl DashboardReport {
    /// Construit le rapport d'un instantané.
    ///
    /// `sources` donne les couches gauche et droite telles que chargées.
    pub fn from_snapshot(
        snapshot: &Snapshot,
        config: &Config,
        sources: [Option<&LoadedSource>; 2],
    ) -> Self {
        let [left_source, right_source] = sources;
        let labels = &config.charts;

        let left = LayerReport {
            label: config.layers.left.label.clone(),
            present: snapshot.left.is_some(),
            features: snapshot.left.as_ref().map_or(0, |c| c.len()),
            area_km2: snapshot.left_km2,
            path: left_source.map(|s| s.path.display().to_string()),
            fingerprint: left_source.map(|s| s.fingerprint.clone()),
            style: config.layers.left.style.clone(),
        };
        let right = LayerReport {
            label: config.layers.right.label.clone(),
            present: snapshot.right.is_some(),
            features: snapshot.right.as_ref().map_or(0, |c| c.len()),
            area_km2: snapshot.right_km2,
            path: right_source.map(|s| s.path.display().to_string()),
            fingerprint: right_source.map(|s| s.fingerprint.clone()),
            style: config.layers.right.style.clone(),
        };
        let intersection = LayerReport {
            label: config.layers.intersection.label.clone(),
            present: true,
            features: snapshot.intersection.len(),
            area_km2: snapshot.intersection_km2,
            path: None,
            fingerprint: None,
            style: config.layers.intersection.style.clone(),
        };

        let charts = ChartSet {
            count_by_region: snapshot
                .left_by_region
                .count_table(&labels.region_header, &labels.count_header),
            area_by_region: snapshot
                .left_by_region
                .area_table(&labels.region_header, &labels.area_header),
            area_by_layer: snapshot.area_table(
                [labels.type_header.as_str(), labels.area_header.as_str()],
                config.layer_labels(),
            ),
        };

        let mut report = Self {
            generation: snapshot.generation,
            duration_secs: 0.0,
            status: DashboardStatus::Complete,
            selection: snapshot.selection.clone(),
            left,
            right,
            intersection,
            by_region: snapshot.left_by_region.clone(),
            charts,
            bounds: snapshot.bounds.map(|b| b.to_lat_lng()),
            warnings: Vec::new(),
        };
        report.finalize();
        report
    }

    /// Définit la durée de la passe
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final et les warnings selon les sources présentes
    pub fn finalize(&mut self) {
        self.warnings.clear();
        for layer in [&self.left, &self.right] {
            if !layer.present {
                self.warnings
                    .push(format!("{}: source absent, treated as empty", layer.label));
            }
        }

        self.status = match (self.left.present, self.right.present) {
            (true, true) => DashboardStatus::Complete,
            (false, false) => DashboardStatus::Empty,
            _ => DashboardStatus::Partial,
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("DASHBOARD REPORT - pass #{}", self.generation);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);
        if self.selection.is_empty() {
            println!("Regions: all");
        } else {
            println!("Regions: {}", self.selection.join(", "));
        }

        println!("\n--- AREA SUMMARY (km²) ---");
        for layer in [&self.left, &self.right, &self.intersection] {
            let features = if layer.present {
                format!("{} features", layer.features)
            } else {
                "absent".to_string()
            };
            println!("  {}: {:.2} ({})", layer.label, layer.area_km2, features);
        }

        if !self.by_region.rows.is_empty() {
            println!("\n--- {} BY REGION ---", self.left.label.to_uppercase());
            for row in &self.by_region.rows {
                println!(
                    "  {}: {} features, {:.2} km²",
                    row.code, row.count, row.area_km2
                );
            }
        }

        if let Some([[south, west], [north, east]]) = self.bounds {
            println!("\nBounds: [{south:.4}, {west:.4}] -> [{north:.4}, {east:.4}]");
        }

        if !self.warnings.is_empty() {
            println!("\n--- WARNINGS ({}) ---", self.warnings.len());
            for w in &self.warnings {
                println!("  {}", w);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "#{} {:?}: {} {:.2} km², {} {:.2} km², {} {:.2} km²",
            self.generation,
            self.status,
            self.left.label,
            self.left.area_km2,
            self.right.label,
            self.right.area_km2,
            self.intersection.label,
            self.intersection.area_km2
        )
    }
}
