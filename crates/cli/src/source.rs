//! Where artifact documents come from: the live platform API or a directory
//! of saved API responses with the same shapes.

use crate::config::ClientConfig;
use anyhow::{bail, Context as AnyhowContext, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// One read the scanner performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    DashboardList,
    Dashboard(&'a str),
    Monitors,
    Slos,
    Notebooks,
}

impl Endpoint<'_> {
    pub fn api_path(&self) -> String {
        match self {
            Endpoint::DashboardList => "/api/v1/dashboard".to_string(),
            Endpoint::Dashboard(id) => format!("/api/v1/dashboard/{id}"),
            Endpoint::Monitors => "/api/v1/monitor".to_string(),
            Endpoint::Slos => "/api/v1/slo".to_string(),
            Endpoint::Notebooks => "/api/v1/notebooks".to_string(),
        }
    }

    /// File holding this response inside an export directory.
    pub fn export_path(&self) -> Result<PathBuf> {
        Ok(match self {
            Endpoint::DashboardList => PathBuf::from("dashboards.json"),
            Endpoint::Dashboard(id) => {
                if id.is_empty() || id.contains(&['/', '\\'][..]) || *id == "." || *id == ".." {
                    bail!("Refusing to read dashboard with unsafe id '{id}'");
                }
                Path::new("dashboards").join(format!("{id}.json"))
            }
            Endpoint::Monitors => PathBuf::from("monitors.json"),
            Endpoint::Slos => PathBuf::from("slos.json"),
            Endpoint::Notebooks => PathBuf::from("notebooks.json"),
        })
    }

    /// Body standing in for a list export that was never saved.
    fn empty_body(&self) -> Option<Value> {
        match self {
            Endpoint::DashboardList => Some(serde_json::json!({ "dashboards": [] })),
            Endpoint::Dashboard(_) => None,
            Endpoint::Monitors => Some(Value::Array(Vec::new())),
            Endpoint::Slos | Endpoint::Notebooks => Some(serde_json::json!({ "data": [] })),
        }
    }
}

#[derive(Deserialize)]
struct DashboardList {
    #[serde(default)]
    dashboards: Vec<DashboardSummary>,
}

#[derive(Deserialize)]
struct DashboardSummary {
    id: String,
}

#[derive(Deserialize)]
struct DataEnvelope {
    #[serde(default)]
    data: Vec<Value>,
}

fn decode<T: for<'de> Deserialize<'de>>(endpoint: Endpoint<'_>, body: Value) -> Result<T> {
    serde_json::from_value(body)
        .with_context(|| format!("Unexpected response shape for {}", endpoint.api_path()))
}

/// Read access to the four artifact collections.
///
/// Implementors only provide [`ArtifactSource::fetch`]; the list operations
/// unwrap the response envelopes the same way for every source.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    async fn fetch(&self, endpoint: Endpoint<'_>) -> Result<Value>;

    async fn list_dashboard_ids(&self) -> Result<Vec<String>> {
        let body = self.fetch(Endpoint::DashboardList).await?;
        let list: DashboardList = decode(Endpoint::DashboardList, body)?;
        Ok(list.dashboards.into_iter().map(|d| d.id).collect())
    }

    async fn get_dashboard(&self, id: &str) -> Result<Value> {
        self.fetch(Endpoint::Dashboard(id)).await
    }

    async fn list_monitors(&self) -> Result<Vec<Value>> {
        let body = self.fetch(Endpoint::Monitors).await?;
        decode(Endpoint::Monitors, body)
    }

    async fn list_slos(&self) -> Result<Vec<Value>> {
        let body = self.fetch(Endpoint::Slos).await?;
        Ok(decode::<DataEnvelope>(Endpoint::Slos, body)?.data)
    }

    async fn list_notebooks(&self) -> Result<Vec<Value>> {
        let body = self.fetch(Endpoint::Notebooks).await?;
        Ok(decode::<DataEnvelope>(Endpoint::Notebooks, body)?.data)
    }
}

pub struct ApiSource {
    client: Client,
    base: String,
}

impl ApiSource {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            "DD-API-KEY",
            HeaderValue::from_str(&config.api_key).context("API key is not a valid header")?,
        );
        headers.insert(
            "DD-APPLICATION-KEY",
            HeaderValue::from_str(&config.app_key)
                .context("Application key is not a valid header")?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base: config.api_base(),
        })
    }
}

#[async_trait]
impl ArtifactSource for ApiSource {
    async fn fetch(&self, endpoint: Endpoint<'_>) -> Result<Value> {
        let url = format!("{}{}", self.base, endpoint.api_path());
        log::debug!("GET {url}");
        self.client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Request failed: GET {url}"))?
            .error_for_status()
            .with_context(|| format!("Request failed: GET {url}"))?
            .json::<Value>()
            .await
            .with_context(|| format!("Invalid JSON from GET {url}"))
    }
}

/// Saved API responses laid out as:
///
/// ```text
/// <dir>/dashboards.json        {"dashboards": [{"id": ...}]}
/// <dir>/dashboards/<id>.json   full dashboard document
/// <dir>/monitors.json          [ ... ]
/// <dir>/slos.json              {"data": [ ... ]}
/// <dir>/notebooks.json         {"data": [ ... ]}
/// ```
///
/// A missing list file reads as an empty collection.
pub struct ExportDirSource {
    root: PathBuf,
}

impl ExportDirSource {
    pub fn new(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            bail!("Export directory {} does not exist", root.display());
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }
}

#[async_trait]
impl ArtifactSource for ExportDirSource {
    async fn fetch(&self, endpoint: Endpoint<'_>) -> Result<Value> {
        let path = self.root.join(endpoint.export_path()?);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                if let Some(body) = endpoint.empty_body() {
                    log::debug!("{} not found; treating as empty", path.display());
                    return Ok(body);
                }
                bail!("Missing export file {}", path.display());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to read {}", path.display()))
            }
        };
        serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
    }
}
