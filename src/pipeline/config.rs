// Read once on startup from <project_dir>/.rapbeat/config.json. Nothing is
// ever written back; the drum grid and tempo are not saved between runs.
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::shared::DEFAULT_BPM;

const RAPBEAT_DIR: &str = ".rapbeat";
const CONFIG_FILE: &str = "config.json";
const LOG_FILE: &str = "rapbeat.log";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bpm: f32,
    pub style: String, // passed to the pattern generator as a vibe hint

    // argv of the external pattern generator, e.g. ["llm", "-m", "some-model"];
    // empty = no generator configured
    pub pattern_command: Vec<String>,

    // relative paths are resolved against the project dir
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            style: String::from("Rap"),
            pattern_command: Vec::new(),
            log_file: None,
        }
    }
}

impl Config {
    pub fn log_path(&self, project_dir: &Path) -> PathBuf {
        match &self.log_file {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => project_dir.join(p),
            None => rapbeat_dir(project_dir).join(LOG_FILE),
        }
    }
}

// <project_dir>/.rapbeat
pub fn rapbeat_dir(project_dir: &Path) -> PathBuf {
    project_dir.join(RAPBEAT_DIR)
}

fn config_file_path(project_dir: &Path) -> PathBuf {
    rapbeat_dir(project_dir).join(CONFIG_FILE)
}

// A missing file means defaults; a broken one is an error worth reporting.
pub fn load_config(project_dir: &Path) -> anyhow::Result<Config> {
    let path = config_file_path(project_dir);
    if !path.exists() {
        return Ok(Config::default());
    }
    let data = std::fs::read_to_string(&path)
        .with_context(|| format!("could not read {}", path.display()))?;
    let config = serde_json::from_str(&data)
        .with_context(|| format!("could not parse {}", path.display()))?;
    Ok(config)
}
