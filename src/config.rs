use crate::model::Month;
use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub path: PathBuf,
    pub config: SourceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub source: SourceMeta,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

impl SourceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.source.key.trim().is_empty() {
            bail!("source.key must not be empty");
        }
        if self.source.name.trim().is_empty() {
            bail!("source.name must not be empty");
        }

        match self.fetch.mode {
            FetchMode::Http => {
                if self.fetch.base_url.is_none() {
                    bail!("fetch.base_url is required for http mode");
                }
                let method = self.fetch.method.to_ascii_uppercase();
                if method != "GET" && method != "POST" {
                    bail!("unsupported fetch method {}", self.fetch.method);
                }
            }
            FetchMode::File => {
                if self.fetch.file_path.is_none() {
                    bail!("fetch.file_path is required for file mode");
                }
            }
            FetchMode::Inline => {
                if self.fetch.inline_data.is_none() {
                    bail!("fetch.inline_data is required for inline mode");
                }
            }
        }

        if self.engine.months.is_empty() {
            bail!("engine.months must list at least one month");
        }
        if self.engine.distance_token.trim().is_empty() {
            bail!("engine.distance_token must not be empty");
        }
        if self.engine.states.is_empty() {
            bail!("engine.states must map at least one state alias");
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceMeta {
    pub key: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Display name of the state this source covers, surfaced in run
    /// reports and validate output.
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    #[default]
    Http,
    File,
    Inline,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    #[default]
    Html,
    Text,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default)]
    pub mode: FetchMode,
    #[serde(default = "default_get")]
    pub method: String,
    #[serde(default)]
    pub format: DocumentFormat,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    #[serde(default)]
    pub inline_data: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub template_vars: BTreeMap<String, String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u8,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            mode: FetchMode::Http,
            method: default_get(),
            format: DocumentFormat::Html,
            base_url: None,
            file_path: None,
            inline_data: None,
            headers: BTreeMap::new(),
            template_vars: BTreeMap::new(),
            user_agent: None,
            timeout_secs: default_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// What the engine does with a candidate whose date window comes up empty.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnknownDatePolicy {
    /// Emit the record with a visible placeholder date.
    #[default]
    Keep,
    /// Discard the candidate entirely.
    Drop,
}

/// Literal label strings that delimit fields within a listing line.
#[derive(Debug, Clone, Deserialize)]
pub struct Labels {
    #[serde(default = "default_distance_label")]
    pub distance: String,
    #[serde(default = "default_state_label")]
    pub state: String,
    #[serde(default = "default_kind_label")]
    pub kind: String,
    #[serde(default = "default_director_label")]
    pub director: String,
}

impl Labels {
    pub fn all(&self) -> [&str; 4] {
        [&self.distance, &self.state, &self.kind, &self.director]
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            distance: default_distance_label(),
            state: default_state_label(),
            kind: default_kind_label(),
            director: default_director_label(),
        }
    }
}

/// Full configuration surface of the extraction engine. Everything is an
/// explicit parameter; the engine holds no globals.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_months")]
    pub months: Vec<Month>,
    #[serde(default = "default_distance_token")]
    pub distance_token: String,
    #[serde(default = "default_date_lookback")]
    pub date_lookback: usize,
    #[serde(default = "default_name_lookback")]
    pub name_lookback: usize,
    #[serde(default)]
    pub unknown_date: UnknownDatePolicy,
    #[serde(default)]
    pub labels: Labels,
    /// Lowercased state alias -> canonical display name.
    #[serde(default = "default_states")]
    pub states: BTreeMap<String, String>,
}

impl EngineConfig {
    pub fn month_allowed(&self, month: Month) -> bool {
        self.months.contains(&month)
    }

    /// Exact-token lookup against the alias map.
    pub fn lookup_state(&self, token: &str) -> Option<&str> {
        self.states
            .get(&token.trim().to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_canonical_state(&self, name: &str) -> bool {
        self.states.values().any(|canonical| canonical == name)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            months: default_months(),
            distance_token: default_distance_token(),
            date_lookback: default_date_lookback(),
            name_lookback: default_name_lookback(),
            unknown_date: UnknownDatePolicy::default(),
            labels: Labels::default(),
            states: default_states(),
        }
    }
}

pub fn load_sources_from_dir(config_dir: &Path) -> Result<Vec<LoadedSource>> {
    if !config_dir.exists() {
        bail!("config dir does not exist: {}", config_dir.display());
    }

    let mut loaded = Vec::new();
    for entry in WalkDir::new(config_dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("toml") {
            continue;
        }
        loaded.push(load_source_file(path)?);
    }

    loaded.sort_by(|a, b| a.config.source.key.cmp(&b.config.source.key));
    Ok(loaded)
}

pub fn load_source_file(config_path: &Path) -> Result<LoadedSource> {
    let text = std::fs::read_to_string(config_path)
        .with_context(|| format!("failed to read source config: {}", config_path.display()))?;
    let config: SourceConfig = toml::from_str(&text)
        .with_context(|| format!("failed to parse toml in {}", config_path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid source config {}", config_path.display()))?;
    Ok(LoadedSource {
        path: config_path.to_path_buf(),
        config,
    })
}

pub fn resolve_path(base_config_path: &Path, maybe_relative: &Path) -> Result<PathBuf> {
    if maybe_relative.is_absolute() {
        return Ok(maybe_relative.to_path_buf());
    }

    let parent = base_config_path.parent().ok_or_else(|| {
        anyhow!(
            "source config has no parent directory: {}",
            base_config_path.display()
        )
    })?;

    Ok(parent.join(maybe_relative))
}

fn default_true() -> bool {
    true
}

fn default_get() -> String {
    "GET".to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_retry_attempts() -> u8 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_months() -> Vec<Month> {
    vec![
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
    ]
}

fn default_distance_token() -> String {
    "10K".to_string()
}

fn default_date_lookback() -> usize {
    30
}

fn default_name_lookback() -> usize {
    6
}

fn default_distance_label() -> String {
    "Race Distance:".to_string()
}

fn default_state_label() -> String {
    "State:".to_string()
}

fn default_kind_label() -> String {
    "Race Type:".to_string()
}

fn default_director_label() -> String {
    "Race Director:".to_string()
}

fn default_states() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("vermont".to_string(), "Vermont".to_string()),
        ("new hampshire".to_string(), "New Hampshire".to_string()),
    ])
}
