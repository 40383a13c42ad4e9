//! Chargement asynchrone des couches sources
//!
//! Un échec de lecture ou de parsing n'interrompt jamais le tableau de bord:
//! il est journalisé et la couche devient absente.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use terra_overlap::FeatureCollection;
use tracing::{debug, info, warn};

/// Couche chargée avec l'empreinte des octets lus
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub path: PathBuf,
    pub collection: FeatureCollection,
    /// BLAKE3 du fichier, en hexadécimal
    pub fingerprint: String,
}

/// Calcule le checksum blake3 d'un contenu
pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Empreinte courante d'un fichier (`None` s'il est illisible)
pub async fn fingerprint(path: &Path) -> Option<String> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Some(fingerprint_bytes(&bytes)),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Cannot fingerprint source");
            None
        }
    }
}

/// Lit et parse une couche; l'erreur est remontée telle quelle
pub async fn try_load(path: &Path) -> Result<LoadedSource> {
    let started = Instant::now();
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let fingerprint = fingerprint_bytes(&bytes);

    let collection = tokio::task::spawn_blocking(move || {
        let text = std::str::from_utf8(&bytes).context("Source is not valid UTF-8")?;
        FeatureCollection::from_geojson_str(text).context("Source is not a GeoJSON FeatureCollection")
    })
    .await
    .context("Parsing task failed")??;

    info!(
        path = %path.display(),
        features = collection.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Loaded source"
    );

    Ok(LoadedSource {
        path: path.to_path_buf(),
        collection,
        fingerprint,
    })
}

/// Charge une couche; tout échec donne une couche absente
pub async fn load(path: &Path) -> Option<LoadedSource> {
    match try_load(path).await {
        Ok(source) => Some(source),
        Err(e) => {
            warn!(path = %path.display(), error = %format!("{e:#}"), "Source unavailable, treated as absent");
            None
        }
    }
}

/// Charge les deux couches en parallèle
pub async fn load_pair(
    left: Option<&Path>,
    right: Option<&Path>,
) -> (Option<LoadedSource>, Option<LoadedSource>) {
    tokio::join!(load_optional(left), load_optional(right))
}

async fn load_optional(path: Option<&Path>) -> Option<LoadedSource> {
    match path {
        Some(path) => load(path).await,
        None => None,
    }
}
