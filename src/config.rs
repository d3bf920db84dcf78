//! Configuration - command line flags layered over an optional YAML file

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use reqwest::Url;
use serde::Deserialize;

use crate::constants::{APP_NAME, DEFAULT_AREA_ID, DEFAULT_PAGE_URL};
use crate::error::ConfigError;
use crate::network::Endpoints;

#[derive(Parser, Debug, Default)]
#[command(name = "ninja-dash")]
#[command(about = "Live terminal dashboard for a ninja logistics installation")]
#[command(version)]
pub struct Cli {
    /// Dashboard page location; sync and export endpoints are derived from it
    /// Example: http://localhost:4456/72ceda8b/
    #[arg(short, long, env = "NINJA_DASH_URL")]
    pub url: Option<String>,

    /// Storage area to display
    #[arg(short, long)]
    pub area: Option<String>,

    /// Item catalog, either a URL or a local JSON file
    #[arg(long)]
    pub catalog: Option<String>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Where to write the log
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Contents of `config.yaml`; every field is optional
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub url: Option<String>,
    pub area: Option<String>,
    pub catalog: Option<String>,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Url(String),
    File(PathBuf),
}

impl CatalogSource {
    fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            CatalogSource::Url(value.to_string())
        } else {
            CatalogSource::File(PathBuf::from(value))
        }
    }
}

/// Fully resolved settings
#[derive(Debug, Clone)]
pub struct Config {
    pub page_url: Url,
    pub area_id: String,
    pub endpoints: Endpoints,
    pub catalog: CatalogSource,
    pub log_file: PathBuf,
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join("config.yaml")
}

impl FileConfig {
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        // an empty file deserializes to unit, not a mapping
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Read a config file; a missing file is only an error when `required`
    pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_yaml(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl Config {
    /// Load the config file named by the CLI (or the default one) and resolve
    pub fn load(cli: Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path, true)?,
            None => FileConfig::load(&default_config_path(), false)?,
        };
        Self::resolve(cli, file)
    }

    /// CLI flags win over the file, the file wins over defaults
    pub fn resolve(cli: Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let url = cli.url.or(file.url).unwrap_or_else(|| DEFAULT_PAGE_URL.to_string());
        let page_url = parse_page_url(&url)?;
        let endpoints = Endpoints::from_page(&page_url);

        let area_id = cli
            .area
            .or(file.area)
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_AREA_ID.to_string());

        let catalog = match cli.catalog.or(file.catalog) {
            Some(value) => CatalogSource::parse(&value),
            None => CatalogSource::Url(endpoints.catalog.clone()),
        };

        let log_file = cli
            .log_file
            .or(file.log_file)
            .unwrap_or_else(|| PathBuf::from(format!("{}.log", APP_NAME)));

        Ok(Config {
            page_url,
            area_id,
            endpoints,
            catalog,
            log_file,
        })
    }
}

fn parse_page_url(url: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        url: url.to_string(),
        reason,
    };
    let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme {}", other))),
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(parsed)
}
