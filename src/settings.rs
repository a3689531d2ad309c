use std::{env, path::PathBuf};

use anyhow::{Context, Result};

const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_LOCK_PORT: u16 = 54052;

/// Runtime configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// SQLite file holding the task table. Parent directories are created on
    /// first run.
    pub db_path: PathBuf,
    /// Loopback port the API binds.
    pub http_port: u16,
    /// Loopback port used as the cross-process single-instance mutex.
    pub lock_port: u16,
    /// Origins allowed through CORS.
    pub allowed_origins: Vec<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let db_path = match env::var_os("TASKTRACK_DB_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_data_dir()?.join("tasks.db"),
        };

        let allowed_origins = match env::var("TASKTRACK_ALLOWED_ORIGINS") {
            Ok(raw) => raw
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            Err(_) => vec![
                "http://localhost".to_string(),
                "http://127.0.0.1".to_string(),
            ],
        };

        Ok(Self {
            db_path,
            http_port: port_from_env("TASKTRACK_PORT", DEFAULT_HTTP_PORT)?,
            lock_port: port_from_env("TASKTRACK_LOCK_PORT", DEFAULT_LOCK_PORT)?,
            allowed_origins,
        })
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let base = dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .context("could not determine a data directory for the task database")?;

    Ok(base.join("tasktrack"))
}

fn port_from_env(var: &str, default: u16) -> Result<u16> {
    match env::var(var) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{var} must be a port number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
