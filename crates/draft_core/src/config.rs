use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const SETTINGS_FILE: &str = "gencms.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub api_base: String,
    pub request_deadline_secs: Option<u64>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            request_deadline_secs: None,
        }
    }
}

impl ApiSettings {
    pub fn request_deadline(&self) -> Option<Duration> {
        self.request_deadline_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base: Option<String>,
    request_deadline_secs: Option<u64>,
}

/// Defaults, then `gencms.toml` in the working directory, then environment.
pub fn load_settings() -> anyhow::Result<ApiSettings> {
    load_settings_from(Path::new(SETTINGS_FILE), |name| std::env::var(name).ok())
}

pub fn load_settings_from(
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ApiSettings> {
    let mut settings = ApiSettings::default();

    if file.exists() {
        let raw = fs::read_to_string(file)
            .with_context(|| format!("failed to read settings file '{}'", file.display()))?;
        let file_cfg: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("invalid settings file '{}'", file.display()))?;
        if let Some(v) = file_cfg.api_base {
            settings.api_base = v;
        }
        if file_cfg.request_deadline_secs.is_some() {
            settings.request_deadline_secs = file_cfg.request_deadline_secs;
        }
    }

    if let Some(v) = env("GENCMS_API_BASE") {
        settings.api_base = v;
    }
    if let Some(v) = env("APP__API_BASE") {
        settings.api_base = v;
    }

    if let Some(v) = env("APP__REQUEST_DEADLINE_SECS") {
        let parsed = v
            .trim()
            .parse::<u64>()
            .with_context(|| format!("APP__REQUEST_DEADLINE_SECS is not a number: '{v}'"))?;
        settings.request_deadline_secs = Some(parsed);
    }

    settings.api_base = normalize_api_base(&settings.api_base)?;
    Ok(settings)
}

pub fn normalize_api_base(raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(DEFAULT_API_BASE.to_string());
    }

    let parsed = Url::parse(raw).with_context(|| format!("invalid API base address '{raw}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!(
            "API base address '{raw}' must use http or https, not '{}'",
            parsed.scheme()
        );
    }
    if parsed.host_str().is_none() {
        bail!("API base address '{raw}' has no host");
    }

    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
