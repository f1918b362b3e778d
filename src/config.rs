use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Source {
    GeoJson { parks: PathBuf, trails: PathBuf },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    pub base_url: String,
    pub app_id: String,
    pub positions: Vec<u32>,
}

impl Default for ShareConfig {
    fn default() -> Self {
        ShareConfig {
            base_url: "https://jsapi.maps.arcgis.com/apps/instant/countdown/index.html".to_string(),
            app_id: "5bede2bb8c344f0baa464b6e142bc5b0".to_string(),
            positions: vec![1, 2],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FadeConfig {
    /// Opacity removed from the mask on every frame
    pub step: f32,
    #[serde(deserialize_with = "millis::deserialize")]
    pub frame: Duration,
}

impl Default for FadeConfig {
    fn default() -> Self {
        FadeConfig {
            step: 0.1,
            frame: Duration::from_millis(16),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip)]
    pub source: Option<Source>,
    pub boundary_layer_title: String,
    /// Layer filtered to the focused park and bound to the table at startup
    pub trails_layer_title: String,
    /// Bound layers with this title get the trail columns
    pub hiking_trails_title: String,
    pub park_name_field: String,
    pub share: ShareConfig,
    pub fade: FadeConfig,
    pub hit_tolerance: f64,
    pub park_cache_capacity: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source: None,
            boundary_layer_title: "Swiss National Parks".to_string(),
            trails_layer_title: "Hiking trails".to_string(),
            hiking_trails_title: "Hiking trails".to_string(),
            park_name_field: "Name".to_string(),
            share: ShareConfig::default(),
            fade: FadeConfig::default(),
            hit_tolerance: 0.0005,
            park_cache_capacity: 64,
        }
    }
}

impl Config {
    /// Reads overrides from a JSON file; missing keys keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
