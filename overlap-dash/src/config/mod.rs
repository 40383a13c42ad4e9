//! Configuration du tableau de bord
//!
//! Une configuration décrit le catalogue de régions, l'ordre des clés de
//! propriété, les deux couches sources et les libellés des graphiques.
//! Elle vient soit d'un preset embarqué, soit d'un fichier JSON.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use terra_overlap::{RegionKeys, DEFAULT_REGION_KEYS};

/// Presets embarqués dans le binaire
pub const PRESETS: [&str; 1] = ["brasil"];

/// Variable d'environnement désignant la configuration par défaut
pub const CONFIG_ENV: &str = "OVERLAP_CONFIG";

const REGION_CODE_PATTERN: &str = r"^[A-Z]{2,3}$";

/// Configuration principale
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Catalogue des codes de région, dans l'ordre d'affichage
    pub regions: Vec<String>,

    /// Clés de propriété candidates, par priorité
    #[serde(default = "default_region_keys")]
    pub region_keys: Vec<String>,

    #[serde(default)]
    pub map: MapView,

    pub layers: Layers,

    #[serde(default)]
    pub charts: ChartLabels,
}

/// Vue initiale de la carte
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MapView {
    /// `[lat, lng]`
    pub center: [f64; 2],
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: [0.0, 0.0],
            zoom: 2,
        }
    }
}

/// Les trois couches affichées
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Layers {
    pub left: LayerConfig,
    pub right: LayerConfig,
    pub intersection: LayerConfig,
}

/// Configuration d'une couche
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LayerConfig {
    /// Libellé (légende, graphiques)
    pub label: String,

    /// Fichier GeoJSON source (absent pour la couche calculée)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default)]
    pub style: LayerStyle,
}

/// Style de rendu transmis tel quel au widget de carte
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LayerStyle {
    pub color: String,
    pub weight: f64,
    pub fill_opacity: f64,
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            color: "#3388ff".to_string(),
            weight: 1.0,
            fill_opacity: 0.2,
        }
    }
}

/// En-têtes des tables de graphiques
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChartLabels {
    pub region_header: String,
    pub count_header: String,
    pub type_header: String,
    pub area_header: String,
}

impl Default for ChartLabels {
    fn default() -> Self {
        Self {
            region_header: "Region".to_string(),
            count_header: "Features".to_string(),
            type_header: "Layer".to_string(),
            area_header: "Area (km²)".to_string(),
        }
    }
}

fn default_region_keys() -> Vec<String> {
    DEFAULT_REGION_KEYS.iter().map(|k| k.to_string()).collect()
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Self = serde_json::from_str(&content).context("Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "brasil" => Self::load_embedded(include_str!("presets/brasil.json")),
            _ => bail!("Unknown preset: {}. Use: {}", preset, PRESETS.join(", ")),
        }
    }

    /// Nom de preset ou chemin de fichier.
    ///
    /// Sans argument, `OVERLAP_CONFIG` est consulté, puis le preset `brasil`.
    pub fn resolve(name_or_path: Option<&str>) -> Result<Self> {
        let from_env = std::env::var(CONFIG_ENV).ok();
        let target = name_or_path
            .or(from_env.as_deref())
            .unwrap_or(PRESETS[0]);

        if PRESETS.contains(&target) {
            Self::from_preset(target)
        } else {
            Self::load(Path::new(target))
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Failed to parse embedded config")?;
        config.validate()?;
        Ok(config)
    }

    /// Vérifie le catalogue et les clés de région
    pub fn validate(&self) -> Result<()> {
        let pattern = Regex::new(REGION_CODE_PATTERN).context("Invalid region code pattern")?;

        if self.regions.is_empty() {
            bail!("Region catalog is empty");
        }

        let mut seen = HashSet::new();
        for code in &self.regions {
            if !pattern.is_match(code) {
                bail!(
                    "Invalid region code: {:?} (expected {})",
                    code,
                    REGION_CODE_PATTERN
                );
            }
            if !seen.insert(code.as_str()) {
                bail!("Duplicate region code: {}", code);
            }
        }

        let mut seen = HashSet::new();
        for key in &self.region_keys {
            if !seen.insert(key.as_str()) {
                bail!("Duplicate region key: {}", key);
            }
        }
        self.region_keys()?;

        Ok(())
    }

    /// Clés de région typées
    pub fn region_keys(&self) -> Result<RegionKeys> {
        RegionKeys::new(self.region_keys.iter().cloned()).context("Invalid region_keys")
    }

    /// Libellés des trois couches (gauche, droite, intersection)
    pub fn layer_labels(&self) -> [&str; 3] {
        [
            self.layers.left.label.as_str(),
            self.layers.right.label.as_str(),
            self.layers.intersection.label.as_str(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal(regions: &str, keys: &str) -> String {
        format!(
            r#"{{
                "regions": {regions},
                "region_keys": {keys},
                "layers": {{
                    "left": {{"label": "A", "path": "a.geojson"}},
                    "right": {{"label": "B"}},
                    "intersection": {{"label": "C"}}
                }}
            }}"#
        )
    }

    fn parse(json: &str) -> Result<Config> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn test_preset_brasil() {
        let config = Config::from_preset("brasil").unwrap();
        assert_eq!(config.regions, vec!["AM", "PA", "MG"]);
        assert_eq!(config.region_keys().unwrap(), RegionKeys::default());
        assert_eq!(config.layers.intersection.style.color, "red");
        assert!(config.layers.intersection.path.is_none());
        assert_eq!(config.charts.region_header, "Estado");
        assert_eq!(config.map.zoom, 4);
    }

    #[test]
    fn test_unknown_preset() {
        let err = Config::from_preset("france").unwrap_err();
        assert!(err.to_string().contains("brasil"));
    }

    #[test]
    fn test_defaults_applied() {
        let config = parse(&minimal(r#"["PA"]"#, r#"["UF"]"#)).unwrap();
        assert_eq!(config.layers.left.path, Some(PathBuf::from("a.geojson")));
        assert_eq!(config.layers.right.style, LayerStyle::default());
        assert_eq!(config.charts, ChartLabels::default());
        assert_eq!(config.layer_labels(), ["A", "B", "C"]);

        let without_keys: Config = serde_json::from_str(
            r#"{"regions":["PA"],"layers":{"left":{"label":"A"},"right":{"label":"B"},"intersection":{"label":"C"}}}"#,
        )
        .unwrap();
        assert_eq!(without_keys.region_keys, default_region_keys());
    }

    #[test]
    fn test_invalid_region_code() {
        assert!(parse(&minimal(r#"["pa"]"#, r#"["UF"]"#)).is_err());
        assert!(parse(&minimal(r#"["PARA"]"#, r#"["UF"]"#)).is_err());
        assert!(parse(&minimal(r#"[]"#, r#"["UF"]"#)).is_err());
        assert!(parse(&minimal(r#"["PA","PA"]"#, r#"["UF"]"#)).is_err());
    }

    #[test]
    fn test_invalid_region_keys() {
        assert!(parse(&minimal(r#"["PA"]"#, r#"[]"#)).is_err());
        assert!(parse(&minimal(r#"["PA"]"#, r#"["UF","UF"]"#)).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("overlap_dash_config_test.json");
        std::fs::write(&path, minimal(r#"["AM","PA"]"#, r#"["estado"]"#)).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.regions.len(), 2);

        std::fs::remove_file(path).ok();
    }
}
