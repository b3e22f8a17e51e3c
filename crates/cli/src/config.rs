use anyhow::{bail, Result};
use std::time::Duration;

pub const API_KEY_ENV: &str = "DD_API_KEY";
pub const APP_KEY_ENV: &str = "DD_APP_KEY";
pub const SITE_ENV: &str = "DD_SITE";
pub const DEFAULT_SITE: &str = "datadoghq.com";

/// Site used for links in reports. Does not require credentials.
pub fn resolve_site(flag: Option<&str>) -> String {
    flag.map(str::to_string)
        .or_else(|| std::env::var(SITE_ENV).ok())
        .map(|site| site.trim().to_string())
        .filter(|site| !site.is_empty())
        .unwrap_or_else(|| DEFAULT_SITE.to_string())
}

/// Web UI host for a site: `datadoghq.com` → `app.datadoghq.com`, while
/// regional sites such as `us5.datadoghq.com` are served as-is.
pub fn web_host(site: &str) -> String {
    if site.matches('.').count() > 1 {
        site.to_string()
    } else {
        format!("app.{site}")
    }
}

/// Credentials and endpoint for the platform API.
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub app_key: String,
    pub site: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("app_key", &"<redacted>")
            .field("site", &self.site)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    pub fn from_env(site: Option<&str>, timeout: Duration) -> Result<Self> {
        Self::from_lookup(
            |key| std::env::var(key).ok(),
            site.map(str::to_string),
            timeout,
        )
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        site: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = required(&lookup, API_KEY_ENV)?;
        let app_key = required(&lookup, APP_KEY_ENV)?;
        let site = site
            .or_else(|| lookup(SITE_ENV))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SITE.to_string());
        let config = Self {
            api_key,
            app_key,
            site,
            timeout,
        };
        if let Err(err) = config.validate() {
            bail!("Invalid client configuration: {err}");
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.site.contains('/') || self.site.contains(char::is_whitespace) {
            return Err(format!("site must be a bare host name, got '{}'", self.site));
        }
        if self.timeout.is_zero() {
            return Err("timeout must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn api_base(&self) -> String {
        format!("https://api.{}", self.site)
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => bail!("{key} is not set; export it or pass --from-dir to scan saved exports"),
    }
}
