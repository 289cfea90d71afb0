// Copyright 2026 The gangway authors
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_VERSION: i64 = 1;
const APP_NAME: &str = "gangway";
const DEFAULT_DEMO_TARGET: &str = "localhost";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Tsh,
    Demo,
}

impl Backend {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tsh => "tsh",
            Self::Demo => "demo",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "tsh" => Some(Self::Tsh),
            "demo" => Some(Self::Demo),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub demo: Demo,
    #[serde(default)]
    pub ui: Ui,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            source: Source::default(),
            demo: Demo::default(),
            ui: Ui::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Source {
    pub backend: Option<String>,
    pub tsh_path: Option<String>,
}

impl Default for Source {
    fn default() -> Self {
        Self {
            backend: Some(Backend::Tsh.as_str().to_owned()),
            tsh_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Demo {
    pub target: Option<String>,
}

impl Default for Demo {
    fn default() -> Self {
        Self {
            target: Some(DEFAULT_DEMO_TARGET.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub page_rows: Option<usize>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            page_rows: Some(gangway_tui::DEFAULT_PAGE_ROWS),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("GANGWAY_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set GANGWAY_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and place values under [source], [demo], and [ui]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(backend) = &self.source.backend
            && Backend::parse(backend).is_none()
        {
            bail!(
                "source.backend in {} must be \"tsh\" or \"demo\", got {backend:?}",
                path.display()
            );
        }

        if let Some(page_rows) = self.ui.page_rows
            && page_rows == 0
        {
            bail!("ui.page_rows in {} must be positive", path.display());
        }

        if let Some(target) = &self.demo.target
            && target.is_empty()
        {
            bail!("demo.target in {} must not be empty", path.display());
        }

        Ok(())
    }

    pub fn backend(&self) -> Result<Backend> {
        let raw = self.source.backend.as_deref().unwrap_or("tsh");
        Backend::parse(raw)
            .ok_or_else(|| anyhow!("source.backend must be \"tsh\" or \"demo\", got {raw:?}"))
    }

    pub fn tsh_path(&self) -> Option<PathBuf> {
        self.source.tsh_path.as_deref().map(PathBuf::from)
    }

    pub fn demo_target(&self) -> &str {
        self.demo.target.as_deref().unwrap_or(DEFAULT_DEMO_TARGET)
    }

    pub fn page_rows(&self) -> usize {
        self.ui.page_rows.unwrap_or(gangway_tui::DEFAULT_PAGE_ROWS)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# gangway config\n# Place this file at: {}\n\nversion = 1\n\n[source]\n# \"tsh\" uses the Teleport CLI; \"demo\" serves a built-in inventory\nbackend = \"tsh\"\n# Optional. Default resolves `tsh` on PATH\n# tsh_path = \"/usr/local/bin/tsh\"\n\n[demo]\ntarget = \"{}\"\n\n[ui]\npage_rows = {}\n",
            path.display(),
            DEFAULT_DEMO_TARGET,
            gangway_tui::DEFAULT_PAGE_ROWS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{Backend, Config};
    use anyhow::Result;
    use std::path::PathBuf;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.backend()?, Backend::Tsh);
        assert_eq!(config.demo_target(), "localhost");
        assert_eq!(config.page_rows(), gangway_tui::DEFAULT_PAGE_ROWS);
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[source]\nbackend = \"tsh\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        assert!(format!("{error:#}").contains("version = 1"));
        Ok(())
    }

    #[test]
    fn wrong_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 7\n")?;
        let error = Config::load(&path).expect_err("wrong version should fail");
        assert!(format!("{error:#}").contains("unsupported config version 7"));
        Ok(())
    }

    #[test]
    fn unknown_backend_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n\n[source]\nbackend = \"teleport\"\n")?;
        let error = Config::load(&path).expect_err("unknown backend should fail");
        assert!(format!("{error:#}").contains("source.backend"));
        Ok(())
    }

    #[test]
    fn zero_page_rows_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n\n[ui]\npage_rows = 0\n")?;
        let error = Config::load(&path).expect_err("zero page rows should fail");
        assert!(format!("{error:#}").contains("ui.page_rows"));
        Ok(())
    }

    #[test]
    fn populated_config_round_trips() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n\n[source]\nbackend = \"demo\"\ntsh_path = \"/opt/teleport/tsh\"\n\n[demo]\ntarget = \"bastion.example.com\"\n\n[ui]\npage_rows = 30\n",
        )?;
        let config = Config::load(&path)?;
        assert_eq!(config.backend()?, Backend::Demo);
        assert_eq!(config.tsh_path(), Some(PathBuf::from("/opt/teleport/tsh")));
        assert_eq!(config.demo_target(), "bastion.example.com");
        assert_eq!(config.page_rows(), 30);
        Ok(())
    }

    #[test]
    fn example_config_parses_under_the_current_version() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, Config::example_config(&path))?;
        let config = Config::load(&path)?;
        assert_eq!(config.backend()?, Backend::Tsh);
        Ok(())
    }
}
