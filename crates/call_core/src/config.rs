use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::Order;
use tracing::warn;

use crate::{
    script::ScriptLocale,
    seed::{load_orders_file, sample_orders},
};

pub const DEFAULT_SETTINGS_FILE: &str = "call_agent.toml";
pub const DEFAULT_LINE_INTERVAL: Duration = Duration::from_millis(2000);
pub const DEFAULT_TEARDOWN_DELAY: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    /// Gap between two revealed agent lines; the first line also waits one gap.
    pub line_interval: Duration,
    /// Delay between a confirm/cancel and the session reset.
    pub teardown_delay: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            line_interval: DEFAULT_LINE_INTERVAL,
            teardown_delay: DEFAULT_TEARDOWN_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Settings {
    pub timing: SessionTiming,
    /// Set only when the settings file or `APP__LOCALE` names one.
    pub locale: Option<ScriptLocale>,
    pub orders_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    line_interval_ms: Option<u64>,
    teardown_delay_ms: Option<u64>,
    locale: Option<ScriptLocale>,
    orders_file: Option<PathBuf>,
}

impl Settings {
    pub fn locale(&self) -> ScriptLocale {
        self.locale.unwrap_or_default()
    }

    pub fn load_orders(&self) -> anyhow::Result<Vec<Order>> {
        match &self.orders_file {
            Some(path) => load_orders_file(path),
            None => Ok(sample_orders()),
        }
    }

    fn apply_file(&mut self, file: SettingsFile) {
        if let Some(ms) = file.line_interval_ms {
            self.timing.line_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = file.teardown_delay_ms {
            self.timing.teardown_delay = Duration::from_millis(ms);
        }
        if file.locale.is_some() {
            self.locale = file.locale;
        }
        if let Some(path) = file.orders_file {
            self.orders_file = Some(path);
        }
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("APP__LINE_INTERVAL_MS") {
            match v.trim().parse::<u64>() {
                Ok(ms) => self.timing.line_interval = Duration::from_millis(ms),
                Err(err) => warn!("ignoring APP__LINE_INTERVAL_MS={v:?}: {err}"),
            }
        }
        if let Some(v) = lookup("APP__TEARDOWN_DELAY_MS") {
            match v.trim().parse::<u64>() {
                Ok(ms) => self.timing.teardown_delay = Duration::from_millis(ms),
                Err(err) => warn!("ignoring APP__TEARDOWN_DELAY_MS={v:?}: {err}"),
            }
        }
        if let Some(v) = lookup("APP__LOCALE") {
            match ScriptLocale::parse(&v) {
                Some(locale) => self.locale = Some(locale),
                None => warn!("ignoring APP__LOCALE={v:?}: expected hi or en"),
            }
        }
        if let Some(v) = lookup("APP__ORDERS_FILE") {
            if !v.trim().is_empty() {
                self.orders_file = Some(PathBuf::from(v));
            }
        }
    }
}

fn parse_settings_file(raw: &str) -> anyhow::Result<SettingsFile> {
    toml::from_str(raw).context("malformed settings file")
}

/// Defaults, then the settings file, then `APP__*` environment overrides.
///
/// An explicit `path` must exist; the default `call_agent.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    load_settings_with_env(path, |name| std::env::var(name).ok())
}

fn load_settings_with_env(
    path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
    };

    match fs::read_to_string(&path) {
        Ok(raw) => {
            let file = parse_settings_file(&raw)
                .with_context(|| format!("invalid settings file {}", path.display()))?;
            settings.apply_file(file);
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file {}", path.display()));
        }
    }

    settings.apply_env(lookup);
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
