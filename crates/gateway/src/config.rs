use std::fs;

use anyhow::{bail, Context};
use serde::Deserialize;
use shared::protocol::UPSTREAM_PREDICT_PATH;
use url::Url;

pub const SETTINGS_FILE: &str = "gateway.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: String,
    pub upstream_url: String,
    pub log_filter: String,
    pub max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".into(),
            upstream_url: "http://127.0.0.1:8000".into(),
            log_filter: "info".into(),
            max_body_bytes: 16 * 1024,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    upstream_url: Option<String>,
    log_filter: Option<String>,
    max_body_bytes: Option<usize>,
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file_overrides(&mut settings, &raw)
            .with_context(|| format!("failed to parse {SETTINGS_FILE}"))?;
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    Ok(settings)
}

fn apply_file_overrides(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.bind_addr {
        settings.bind_addr = v;
    }
    if let Some(v) = file_cfg.upstream_url {
        settings.upstream_url = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    if let Some(v) = file_cfg.max_body_bytes {
        settings.max_body_bytes = v;
    }
    Ok(())
}

/// Later keys win, so the `APP__` spelling overrides the short one.
fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("GATEWAY_BIND") {
        settings.bind_addr = v;
    }
    if let Some(v) = lookup("APP__BIND_ADDR") {
        settings.bind_addr = v;
    }

    if let Some(v) = lookup("UPSTREAM_URL") {
        settings.upstream_url = v;
    }
    if let Some(v) = lookup("APP__UPSTREAM_URL") {
        settings.upstream_url = v;
    }

    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    if let Some(v) = lookup("APP__MAX_BODY_BYTES") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.max_body_bytes = parsed;
        }
    }
}

/// Resolves `<upstream base>/predict/` from the configured base URL.
pub fn upstream_predict_url(raw_base: &str) -> anyhow::Result<Url> {
    let raw_base = raw_base.trim();
    let mut base =
        Url::parse(raw_base).with_context(|| format!("invalid upstream url '{raw_base}'"))?;
    if !matches!(base.scheme(), "http" | "https") {
        bail!("upstream url must start with http:// or https://, got '{raw_base}'");
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(UPSTREAM_PREDICT_PATH)
        .with_context(|| format!("failed to derive prediction endpoint from '{raw_base}'"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
