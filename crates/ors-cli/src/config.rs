use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ors_admin::ClientConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PATH: &str = "/admin-notification";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfileConfig {
    pub server: Option<String>,
    pub format: Option<String>,
    pub path: Option<String>,
    pub timeout: Option<u64>,
}

pub type ConfigFile = HashMap<String, ProfileConfig>;

pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::home_dir()
        .context("Cannot determine home directory")?
        .join(".ors");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Identity and UI state for a profile.
pub fn session_path(profile: &str) -> Result<PathBuf> {
    Ok(config_dir()?.join(format!("session.{profile}.json")))
}

pub fn load_all() -> Result<ConfigFile> {
    load_all_from(&config_path()?)
}

fn load_all_from(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::new());
    }
    let content = fs::read_to_string(path)?;
    let cfg: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    Ok(cfg)
}

pub fn load_profile(profile: &str) -> Result<ProfileConfig> {
    Ok(load_all()?.remove(profile).unwrap_or_default())
}

pub fn save_profile(profile: &str, config: &ProfileConfig) -> Result<()> {
    save_profile_to(&config_path()?, profile, config)
}

fn save_profile_to(path: &Path, profile: &str, config: &ProfileConfig) -> Result<()> {
    let mut all = load_all_from(path)?;
    all.insert(profile.to_string(), config.clone());
    let content = toml::to_string_pretty(&all)?;
    fs::write(path, content)?;
    Ok(())
}

/// Apply `key = value` to a profile.
pub fn set_key(cfg: &mut ProfileConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "server" => cfg.server = Some(value.to_string()),
        "format" => {
            if crate::cli::OutputFormat::parse(value).is_none() {
                anyhow::bail!("Unknown format: {value}. Valid formats: json, table");
            }
            cfg.format = Some(value.to_string());
        }
        "path" => cfg.path = Some(value.to_string()),
        "timeout" => {
            let secs = value
                .parse()
                .with_context(|| format!("timeout must be a number of seconds, got \"{value}\""))?;
            cfg.timeout = Some(secs);
        }
        other => {
            anyhow::bail!("Unknown config key: {other}. Valid keys: server, format, path, timeout")
        }
    }
    Ok(())
}

pub fn resolve_server(cli_server: &Option<String>, profile: &ProfileConfig) -> Result<String> {
    // 1. --server flag / ORS_URL env
    if let Some(s) = cli_server {
        return Ok(s.clone());
    }
    // 2. config.toml profile
    if let Some(s) = &profile.server {
        return Ok(s.clone());
    }
    anyhow::bail!(
        "No server URL configured. Use --server, set ORS_URL env var, or run: ors config set server <url>"
    )
}

pub fn client_config(server: &str, profile: &ProfileConfig) -> ClientConfig {
    let mut cfg = ClientConfig::default().with_base_url(server);
    if let Some(secs) = profile.timeout {
        cfg = cfg.with_timeout_secs(secs);
    }
    cfg
}
