//! Implémentation des commandes CLI

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use overlap_dash::config::{Config, MapView};
use overlap_dash::export::geojson::export_to_geojson;
use overlap_dash::report::DashboardReport;
use overlap_dash::source::{self, LoadedSource};
use terra_overlap::{Dashboard, FeatureCollection, RegionSelection, Snapshot};
use tracing::{debug, info, warn};

#[derive(Subcommand)]
pub enum Commands {
    /// Calculer et afficher les aires (couches, intersection, régions)
    Summary {
        #[command(flatten)]
        sources: SourceArgs,

        /// Sauvegarder le rapport en JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Exporter les couches filtrées, l'intersection et les données de graphiques
    Export {
        #[command(flatten)]
        sources: SourceArgs,

        /// Dossier de sortie
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Surveiller les sources et recalculer à chaque modification
    Watch {
        #[command(flatten)]
        sources: SourceArgs,

        /// Intervalle de scrutation en secondes
        #[arg(long, default_value = "2")]
        interval: u64,
    },

    /// Lister le catalogue de régions et l'ordre des clés
    Regions {
        /// Preset (brasil) ou fichier de configuration JSON
        #[arg(short, long)]
        config: Option<String>,
    },
}

/// Sources, sélection et configuration communes aux commandes de calcul
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Couche gauche (défaut: chemin de la configuration)
    #[arg(long)]
    pub left: Option<PathBuf>,

    /// Couche droite (défaut: chemin de la configuration)
    #[arg(long)]
    pub right: Option<PathBuf>,

    /// Région à conserver, répétable (défaut: toutes)
    #[arg(short, long = "region", value_name = "CODE")]
    pub regions: Vec<String>,

    /// Preset (brasil) ou fichier de configuration JSON
    #[arg(short, long)]
    pub config: Option<String>,
}

/// Une source surveillée: chemin, dernière empreinte vue, dernière version chargée
struct Watched {
    path: Option<PathBuf>,
    seen: Option<String>,
    loaded: Option<LoadedSource>,
}

impl Watched {
    fn new(path: Option<PathBuf>, loaded: Option<LoadedSource>) -> Self {
        Self {
            path,
            seen: loaded.as_ref().map(|s| s.fingerprint.clone()),
            loaded,
        }
    }

    /// Recharge la source si son empreinte a changé; renvoie vrai dans ce cas
    async fn refresh(&mut self) -> bool {
        let Some(path) = self.path.as_deref() else {
            return false;
        };

        let current = source::fingerprint(path).await;
        if current == self.seen {
            return false;
        }

        info!(path = %path.display(), "Source changed, reloading");
        self.loaded = match current {
            Some(_) => source::load(path).await,
            None => {
                warn!(path = %path.display(), "Source disappeared, treated as absent");
                None
            }
        };
        self.seen = current;
        true
    }

    fn collection(&self) -> Option<FeatureCollection> {
        self.loaded.as_ref().map(|s| s.collection.clone())
    }
}

/// Configuration, sources chargées et tableau de bord
struct Session {
    config: Config,
    left: Watched,
    right: Watched,
    dashboard: Dashboard,
}

impl Session {
    async fn open(args: &SourceArgs) -> Result<Self> {
        let config = Config::resolve(args.config.as_deref())?;
        let selection = parse_selection(&args.regions, &config)?;

        let left_path = args.left.clone().or_else(|| config.layers.left.path.clone());
        let right_path = args.right.clone().or_else(|| config.layers.right.path.clone());
        for (label, path) in [
            (&config.layers.left.label, &left_path),
            (&config.layers.right.label, &right_path),
        ] {
            if path.is_none() {
                warn!(layer = %label, "No path configured, layer treated as absent");
            }
        }

        let (left, right) = source::load_pair(left_path.as_deref(), right_path.as_deref()).await;

        let mut dashboard = Dashboard::new(config.regions.clone(), config.region_keys()?);
        // Sélection d'abord: seule la dernière passe calcule les intersections
        dashboard.set_selection(selection);
        let left = Watched::new(left_path, left);
        let right = Watched::new(right_path, right);
        dashboard.set_left(left.collection());
        dashboard.set_right(right.collection());

        Ok(Self {
            config,
            left,
            right,
            dashboard,
        })
    }

    fn snapshot(&self) -> &Snapshot {
        self.dashboard.snapshot()
    }

    fn report(&self) -> DashboardReport {
        DashboardReport::from_snapshot(
            self.snapshot(),
            &self.config,
            [self.left.loaded.as_ref(), self.right.loaded.as_ref()],
        )
    }
}

/// Normalise les codes saisis et les vérifie contre le catalogue
fn parse_selection(codes: &[String], config: &Config) -> Result<RegionSelection> {
    let selection: RegionSelection = codes
        .iter()
        .map(|c| normalize_region_code(c))
        .collect();
    selection
        .validate_against(&config.regions)
        .context("Invalid --region")?;
    Ok(selection)
}

fn normalize_region_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Commande summary
pub async fn cmd_summary(args: &SourceArgs, report_path: Option<&Path>) -> Result<()> {
    let start = Instant::now();
    let session = Session::open(args).await?;

    let mut report = session.report();
    report.set_duration(start.elapsed());
    report.display();

    if let Some(path) = report_path {
        report.save_to_file(path)?;
        info!(path = %path.display(), "Report saved");
    }

    Ok(())
}

/// Document consommé par le rendu (carte et graphiques)
#[derive(Serialize)]
struct DashboardDocument<'a> {
    map: &'a MapView,
    report: &'a DashboardReport,
    files: Vec<LayerFile>,
}

#[derive(Serialize)]
struct LayerFile {
    layer: String,
    file: String,
    features: usize,
}

/// Commande export
pub async fn cmd_export(args: &SourceArgs, output: &Path) -> Result<()> {
    let start = Instant::now();
    let session = Session::open(args).await?;

    tokio::fs::create_dir_all(output)
        .await
        .with_context(|| format!("Cannot create output directory {}", output.display()))?;

    let snapshot = session.snapshot();
    let layers = [
        ("left", &session.config.layers.left.label, snapshot.left.as_ref()),
        ("right", &session.config.layers.right.label, snapshot.right.as_ref()),
        (
            "intersection",
            &session.config.layers.intersection.label,
            Some(&snapshot.intersection),
        ),
    ];

    let mut files = Vec::new();
    for (name, label, collection) in layers {
        let Some(collection) = collection else {
            debug!(layer = %label, "Layer absent, nothing to export");
            continue;
        };
        let file = format!("{}.geojson", name);
        let features = export_to_geojson(collection, &output.join(&file))?;
        info!(layer = %label, features, file = %file, "Exported layer");
        files.push(LayerFile {
            layer: name.to_string(),
            file,
            features,
        });
    }

    let mut report = session.report();
    report.set_duration(start.elapsed());

    let document = DashboardDocument {
        map: &session.config.map,
        report: &report,
        files,
    };
    let dashboard_path = output.join("dashboard.json");
    let json = serde_json::to_string_pretty(&document)?;
    tokio::fs::write(&dashboard_path, json)
        .await
        .with_context(|| format!("Failed to write {}", dashboard_path.display()))?;

    println!(
        "Export complete: {} layers to {} ({:?})",
        document.files.len(),
        output.display(),
        report.status
    );

    Ok(())
}

/// Commande watch
pub async fn cmd_watch(args: &SourceArgs, interval: Duration) -> Result<()> {
    let mut session = Session::open(args).await?;
    println!("{}", session.report().summary());

    session.dashboard.subscribe(|snapshot: &Snapshot| {
        info!(
            generation = snapshot.generation,
            left_km2 = snapshot.left_km2,
            right_km2 = snapshot.right_km2,
            intersection_km2 = snapshot.intersection_km2,
            "Dashboard updated"
        );
    });

    info!(interval_secs = interval.as_secs(), "Watching sources (Ctrl-C to stop)");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Watch stopped");
                break;
            }
            _ = tokio::time::sleep(interval) => {
                let mut changed = false;
                if session.left.refresh().await {
                    let collection = session.left.collection();
                    session.dashboard.set_left(collection);
                    changed = true;
                }
                if session.right.refresh().await {
                    let collection = session.right.collection();
                    session.dashboard.set_right(collection);
                    changed = true;
                }
                if changed {
                    println!("{}", session.report().summary());
                }
            }
        }
    }

    Ok(())
}

/// Commande regions
pub fn cmd_regions(config: Option<&str>) -> Result<()> {
    let config = Config::resolve(config)?;

    println!("Regions ({}):", config.regions.len());
    for code in &config.regions {
        println!("  {}", code);
    }
    println!("Region keys (by priority): {}", config.region_keys.join(" -> "));

    Ok(())
}
