//! Recalcul complet sur changement d'entrée
//!
//! Le tableau de bord ne garde aucun état incrémental: chaque changement
//! (source gauche, source droite, sélection) relance filtre -> intersection
//! -> agrégation sur un instantané cohérent des entrées. Les observateurs
//! sont notifiés après chaque passe.

use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use crate::aggregate::{breakdown_by_region, total_area_km2, ChartTable, RegionBreakdown};
use crate::engine::intersect_all;
use crate::geometry::{bounds, Bounds};
use crate::region::{filter_by_region, RegionKeys, RegionSelection};
use crate::types::FeatureCollection;

/// Entrées d'une passe de recalcul
#[derive(Debug, Clone, Copy)]
pub struct Inputs<'a> {
    pub left: Option<&'a FeatureCollection>,
    pub right: Option<&'a FeatureCollection>,
    pub selection: &'a RegionSelection,
    /// Codes connus (axes des graphiques)
    pub catalog: &'a [String],
    pub keys: &'a RegionKeys,
}

/// Résultat d'une passe
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    /// Numéro de passe, croissant
    pub generation: u64,
    pub selection: Vec<String>,
    #[serde(skip)]
    pub left: Option<FeatureCollection>,
    #[serde(skip)]
    pub right: Option<FeatureCollection>,
    #[serde(skip)]
    pub intersection: FeatureCollection,
    pub left_km2: f64,
    pub right_km2: f64,
    pub intersection_km2: f64,
    /// Ventilation de la couche gauche filtrée
    pub left_by_region: RegionBreakdown,
    /// Emprise de la couche gauche filtrée
    pub bounds: Option<Bounds>,
}

impl Snapshot {
    /// Table "aire par couche" (gauche, droite, intersection)
    pub fn area_table(&self, header: [&str; 2], labels: [&str; 3]) -> ChartTable {
        ChartTable::from_measures(
            header[0],
            header[1],
            [
                (labels[0], self.left_km2),
                (labels[1], self.right_km2),
                (labels[2], self.intersection_km2),
            ],
        )
    }
}

/// Passe complète: filtre -> intersection -> agrégation
pub fn recompute(inputs: Inputs<'_>) -> Snapshot {
    let started = Instant::now();

    let left = filter_by_region(inputs.left, inputs.selection, inputs.keys);
    let right = filter_by_region(inputs.right, inputs.selection, inputs.keys);
    let intersection = intersect_all(left.as_ref(), right.as_ref());

    let left_km2 = total_area_km2(left.as_ref());
    let right_km2 = total_area_km2(right.as_ref());
    let intersection_km2 = total_area_km2(&intersection);
    let left_by_region = breakdown_by_region(left.as_ref(), inputs.catalog, inputs.keys);
    let bounds = left.as_ref().and_then(bounds);

    debug!(
        left = left.as_ref().map(FeatureCollection::len),
        right = right.as_ref().map(FeatureCollection::len),
        intersections = intersection.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Recompute pass done"
    );

    Snapshot {
        generation: 0,
        selection: inputs.selection.iter().map(str::to_string).collect(),
        left,
        right,
        intersection,
        left_km2,
        right_km2,
        intersection_km2,
        left_by_region,
        bounds,
    }
}

/// Reçoit chaque nouvel instantané
pub trait SnapshotObserver {
    fn on_snapshot(&mut self, snapshot: &Snapshot);
}

impl<F: FnMut(&Snapshot)> SnapshotObserver for F {
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self(snapshot)
    }
}

/// État courant des entrées et dernier instantané calculé
pub struct Dashboard {
    left: Option<FeatureCollection>,
    right: Option<FeatureCollection>,
    selection: RegionSelection,
    catalog: Vec<String>,
    keys: RegionKeys,
    snapshot: Snapshot,
    generation: u64,
    observers: Vec<Box<dyn SnapshotObserver>>,
}

impl Dashboard {
    /// Crée un tableau de bord sans données; l'instantané initial est vide.
    pub fn new(catalog: Vec<String>, keys: RegionKeys) -> Self {
        let mut dashboard = Self {
            left: None,
            right: None,
            selection: RegionSelection::all(),
            catalog,
            keys,
            snapshot: Snapshot::default(),
            generation: 0,
            observers: Vec::new(),
        };
        dashboard.snapshot = dashboard.compute();
        dashboard
    }

    pub fn subscribe(&mut self, observer: impl SnapshotObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn selection(&self) -> &RegionSelection {
        &self.selection
    }

    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    pub fn keys(&self) -> &RegionKeys {
        &self.keys
    }

    pub fn left(&self) -> Option<&FeatureCollection> {
        self.left.as_ref()
    }

    pub fn right(&self) -> Option<&FeatureCollection> {
        self.right.as_ref()
    }

    /// Remplace la source gauche (`None`: absente) et recalcule
    pub fn set_left(&mut self, collection: Option<FeatureCollection>) -> &Snapshot {
        self.left = collection;
        self.recompute()
    }

    /// Remplace la source droite (`None`: absente) et recalcule
    pub fn set_right(&mut self, collection: Option<FeatureCollection>) -> &Snapshot {
        self.right = collection;
        self.recompute()
    }

    /// Remplace la sélection et recalcule
    pub fn set_selection(&mut self, selection: RegionSelection) -> &Snapshot {
        self.selection = selection;
        self.recompute()
    }

    /// Coche/décoche une région et recalcule
    pub fn toggle_region(&mut self, code: &str) -> &Snapshot {
        let selection = self.selection.toggle(code);
        self.set_selection(selection)
    }

    /// Recalcule depuis zéro et notifie les observateurs
    pub fn recompute(&mut self) -> &Snapshot {
        self.snapshot = self.compute();
        for observer in &mut self.observers {
            observer.on_snapshot(&self.snapshot);
        }
        &self.snapshot
    }

    fn compute(&mut self) -> Snapshot {
        self.generation += 1;
        let mut snapshot = recompute(Inputs {
            left: self.left.as_ref(),
            right: self.right.as_ref(),
            selection: &self.selection,
            catalog: &self.catalog,
            keys: &self.keys,
        });
        snapshot.generation = self.generation;
        snapshot
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("selection", &self.selection)
            .field("catalog", &self.catalog)
            .field("generation", &self.generation)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}
