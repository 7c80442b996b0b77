//! Configuration handling for migrant

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::MigrantError;
use crate::template::Classpath;

/// Migrant configuration (`migrant.toml` or `.migrant/config.toml`)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Run settings
    #[serde(default)]
    pub run: RunConfig,

    /// Types the template engine may resolve
    #[serde(default)]
    pub classpath: ClasspathConfig,
}

/// Run settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct RunConfig {
    /// Recipes run when none are named on the command line
    #[serde(default)]
    pub recipes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ClasspathConfig {
    #[serde(default)]
    pub types: Vec<String>,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, MigrantError> {
        let content = fs::read_to_string(path)
            .map_err(|e| MigrantError::Config(format!("failed to read config file: {}", e)))?;
        toml::from_str(&content)
            .map_err(|e| MigrantError::Config(format!("failed to parse config file: {}", e)))
    }

    /// Load configuration from .migrant/config.toml in the given project root
    pub fn load_from_project(project_root: &Path) -> Result<Self, MigrantError> {
        let config_path = project_root.join(".migrant").join("config.toml");
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Config::default())
        }
    }

    /// Recipe names to run: `requested` first, then configured ones not
    /// already requested.
    pub fn merge_recipes(&self, requested: &[String]) -> Vec<String> {
        let mut names = requested.to_vec();
        for name in &self.run.recipes {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    pub fn classpath(&self) -> Classpath {
        Classpath::new(self.classpath.types.iter().cloned())
    }
}
