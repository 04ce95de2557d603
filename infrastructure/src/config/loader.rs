//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Application directory name under the platform config/data dirs
const APP_DIR: &str = "toolgate";

/// Project-level config file names, checked in order
const PROJECT_FILES: &[&str] = &["toolgate.toml", ".toolgate.toml"];

/// Environment variable prefix (`TOOLGATE_MODEL__NAME=...`)
const ENV_PREFIX: &str = "TOOLGATE_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment: `TOOLGATE_<SECTION>__<KEY>`
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./toolgate.toml` or `./.toolgate.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/toolgate/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path, Self::project_config_path())
            .extract()
            .map_err(Box::new)
    }

    fn figment(config_path: Option<&Path>, project_path: Option<PathBuf>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = project_path {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Directory for history and log files
    pub fn data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR)
    }

    /// Print the config file locations being used (for --show-config)
    pub fn print_config_sources(config_path: Option<&Path>) {
        println!("Configuration sources (in priority order):");

        println!("  [ENV  ] Environment: {}<SECTION>__<KEY>", ENV_PREFIX);

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISS " };
            println!("  [{}] Explicit: {}", mark, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./toolgate.toml or ./.toolgate.toml");
        }

        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "     " };
            println!("  [{}] Global:  {}", mark, path.display());
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.model.name, "qwen3:14b");
        assert_eq!(config.agent.max_iterations, 5);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("toolgate"));
    }

    #[test]
    fn test_explicit_file_overrides_project_file() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("toolgate.toml");
        let explicit = dir.path().join("explicit.toml");
        std::fs::write(&project, "[model]\nname = \"project-model\"\n[agent]\nmax_iterations = 7\n")
            .unwrap();
        std::fs::write(&explicit, "[model]\nname = \"explicit-model\"\n").unwrap();

        let config: FileConfig = ConfigLoader::figment(Some(&explicit), Some(project))
            .extract()
            .unwrap();

        assert_eq!(config.model.name, "explicit-model");
        assert_eq!(config.agent.max_iterations, 7);
        assert_eq!(config.model.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("bad.toml");
        std::fs::write(&explicit, "[agent]\nmax_iterations = \"many\"\n").unwrap();

        let result: Result<FileConfig, _> = ConfigLoader::figment(Some(&explicit), None).extract();
        assert!(result.is_err());
    }
}
