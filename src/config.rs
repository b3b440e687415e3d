use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use directories::ProjectDirs;

use crate::domain::entities::document::UserId;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_LARGE_CHART_PAGES: u32 = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub user_id: UserId,
    pub default_page_size: usize,
    /// Charts with more pages than this are highlighted in the grid.
    pub large_chart_page_threshold: u32,
    pub request_timeout: Duration,
    pub db_path: PathBuf,
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "chartaudit", "chart-audit-desk")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))
}

pub fn default_db_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_local_dir().join("view_prefs.sqlite"))
}

pub fn ensure_webview_data_dir(base_data_dir: &Path) -> Result<PathBuf> {
    let webview_data_dir = base_data_dir.join("webview2");
    std::fs::create_dir_all(&webview_data_dir).with_context(|| {
        format!(
            "failed to create webview dir: {}",
            webview_data_dir.display()
        )
    })?;
    Ok(webview_data_dir)
}

pub fn default_webview_data_dir() -> Result<PathBuf> {
    ensure_webview_data_dir(project_dirs()?.data_local_dir())
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key).map(|value| value.trim().to_string()) {
        Some(value) if !value.is_empty() => value
            .parse::<T>()
            .map_err(|err| anyhow!("invalid {key}={value}: {err}")),
        _ => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_base_url = lookup("CHART_AUDIT_API_URL")
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            bail!("CHART_AUDIT_API_URL must be an http(s) url: {api_base_url}");
        }

        let default_page_size = parse_var(&lookup, "CHART_AUDIT_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if default_page_size == 0 {
            bail!("CHART_AUDIT_PAGE_SIZE must be greater than zero");
        }

        let db_path = match lookup("CHART_AUDIT_DB_PATH").filter(|value| !value.trim().is_empty()) {
            Some(path) => PathBuf::from(path.trim()),
            None => default_db_path()?,
        };

        Ok(Self {
            api_base_url,
            user_id: UserId(parse_var(&lookup, "CHART_AUDIT_USER_ID", 1_i64)?),
            default_page_size,
            large_chart_page_threshold: parse_var(
                &lookup,
                "CHART_AUDIT_LARGE_CHART_PAGES",
                DEFAULT_LARGE_CHART_PAGES,
            )?,
            request_timeout: Duration::from_secs(parse_var(
                &lookup,
                "CHART_AUDIT_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
            db_path,
        })
    }
}
