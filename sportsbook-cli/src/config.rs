//! Database path resolution.
//!
//! Priority: `--db` flag > `SPORTSBOOK_DB` env var > `[database] path` in
//! `<config_dir>/sportsbook/config.toml` > `app.sqlite` in the working
//! directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::CliError;

pub(crate) const DB_ENV_VAR: &str = "SPORTSBOOK_DB";
pub(crate) const DEFAULT_DB_FILE: &str = "app.sqlite";

/// TOML config file format.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    database: DatabaseConfig,
}

#[derive(Debug, Default, Deserialize)]
struct DatabaseConfig {
    path: Option<PathBuf>,
}

/// Where the database path came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DbPathSource {
    Flag,
    EnvVar(&'static str),
    ConfigFile(PathBuf),
    Default,
}

impl std::fmt::Display for DbPathSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flag => write!(f, "--db"),
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::ConfigFile(path) => write!(f, "{}", path.display()),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Path to the config file, if the platform has a config directory.
pub(crate) fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sportsbook").join("config.toml"))
}

/// Resolve the database path from the flag, environment, and config file.
pub(crate) fn resolve_db_path(flag: Option<PathBuf>) -> Result<(PathBuf, DbPathSource), CliError> {
    let env = std::env::var_os(DB_ENV_VAR)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    resolve(flag, env, config_path().as_deref())
}

fn resolve(
    flag: Option<PathBuf>,
    env: Option<PathBuf>,
    config: Option<&Path>,
) -> Result<(PathBuf, DbPathSource), CliError> {
    if let Some(path) = flag {
        return Ok((path, DbPathSource::Flag));
    }
    if let Some(path) = env {
        return Ok((path, DbPathSource::EnvVar(DB_ENV_VAR)));
    }
    if let Some(config) = config {
        if let Some(path) = load_config_file(config)?.database.path {
            return Ok((path, DbPathSource::ConfigFile(config.to_path_buf())));
        }
    }
    Ok((PathBuf::from(DEFAULT_DB_FILE), DbPathSource::Default))
}

/// Read the config file. A missing file is an empty config.
fn load_config_file(path: &Path) -> Result<ConfigFile, CliError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ConfigFile::default()),
        Err(e) => {
            return Err(CliError::config(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )));
        }
    };
    toml::from_str(&contents)
        .map_err(|e| CliError::config(format!("Invalid config file {}: {}", path.display(), e)))
}
