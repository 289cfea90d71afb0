// Copyright 2026 The gangway authors
// Licensed under the Apache License, Version 2.0

mod demo;

pub use demo::DemoSource;

use anyhow::{Context, Result, anyhow, bail};
use gangway_app::Node;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Mutex;

/// Program and argv for the final process hand-off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

/// Where the host inventory comes from. Selected once at startup; the
/// interactive loop only ever talks to this trait.
pub trait InventorySource: Send + Sync {
    /// `refresh = false` may serve a cached inventory; `refresh = true` must
    /// re-fetch from the backend.
    fn fetch_nodes(&self, refresh: bool) -> Result<Vec<Node>>;

    /// Human-readable session identity (cluster/profile name), display only.
    fn profile_name(&self) -> Result<String>;

    fn connect_command(&self, hostname: &str) -> ConnectCommand;
}

/// Inventory backed by the Teleport `tsh` CLI.
pub struct TshSource {
    tsh_path: PathBuf,
    cache: Mutex<Vec<Node>>,
}

impl TshSource {
    pub fn locate() -> Result<Self> {
        let tsh_path =
            which::which("tsh").context("teleport `tsh` command not found on PATH")?;
        Ok(Self::with_path(tsh_path))
    }

    pub fn with_path(tsh_path: PathBuf) -> Self {
        Self {
            tsh_path,
            cache: Mutex::new(Vec::new()),
        }
    }

    fn list_nodes(&self) -> Result<Vec<Node>> {
        let output = Command::new(&self.tsh_path)
            .args(["ls", "--format", "json"])
            .output()
            .with_context(|| format!("run `{} ls`", self.tsh_path.display()))?;
        if !output.status.success() {
            bail!(
                "`tsh ls` failed: {}",
                String::from_utf8_lossy(&output.stderr).trim(),
            );
        }
        decode_node_list(&output.stdout)
    }

    fn cache_lock(&self) -> std::sync::MutexGuard<'_, Vec<Node>> {
        match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl InventorySource for TshSource {
    fn fetch_nodes(&self, refresh: bool) -> Result<Vec<Node>> {
        if !refresh {
            let cache = self.cache_lock();
            if !cache.is_empty() {
                return Ok(cache.clone());
            }
        }

        let nodes = self.list_nodes()?;
        *self.cache_lock() = nodes.clone();
        Ok(nodes)
    }

    fn profile_name(&self) -> Result<String> {
        let output = Command::new(&self.tsh_path)
            .args(["status", "--format=json"])
            .output()
            .with_context(|| format!("run `{} status`", self.tsh_path.display()))?;

        if !output.status.success() {
            let mut combined = output.stdout;
            combined.extend_from_slice(&output.stderr);
            let text = String::from_utf8_lossy(&combined);
            if text.contains("Not logged in") {
                bail!("{}. Run `tsh login` first", text.trim());
            }
            bail!("`tsh status` failed: {}", text.trim());
        }

        active_cluster(&output.stdout)
    }

    fn connect_command(&self, hostname: &str) -> ConnectCommand {
        ConnectCommand {
            program: self.tsh_path.clone(),
            args: vec!["ssh".to_owned(), hostname.to_owned()],
        }
    }
}

#[derive(Debug, Deserialize)]
struct TshItem {
    #[serde(default)]
    kind: String,
    #[serde(default)]
    metadata: TshMetadata,
    #[serde(default)]
    spec: TshSpec,
}

#[derive(Debug, Default, Deserialize)]
struct TshMetadata {
    #[serde(default)]
    labels: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct TshSpec {
    #[serde(default)]
    hostname: String,
    #[serde(default)]
    cmd_labels: TshCmdLabels,
}

#[derive(Debug, Default, Deserialize)]
struct TshCmdLabels {
    #[serde(default)]
    ip: TshCmdLabel,
    #[serde(default)]
    os: TshCmdLabel,
}

#[derive(Debug, Default, Deserialize)]
struct TshCmdLabel {
    #[serde(default)]
    result: String,
}

fn decode_node_list(data: &[u8]) -> Result<Vec<Node>> {
    let items: Vec<TshItem> =
        serde_json::from_slice(strip_json_prefix(data)).context("decode `tsh ls` output")?;
    Ok(items
        .into_iter()
        .filter(|item| item.kind == "node")
        .map(|item| Node {
            hostname: item.spec.hostname,
            ip: item.spec.cmd_labels.ip.result,
            os: item.spec.cmd_labels.os.result,
            labels: item.metadata.labels,
        })
        .collect())
}

fn active_cluster(data: &[u8]) -> Result<String> {
    let status: serde_json::Value = serde_json::from_slice(strip_json_prefix(data))
        .context("`tsh status` returned invalid data, cannot check login")?;
    status
        .get("active")
        .and_then(|active| active.get("cluster"))
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| anyhow!("no active cluster found, `tsh login` and try again"))
}

// When the session expired, `tsh` prints a relogin banner ahead of the JSON;
// drop bytes until the remainder parses.
fn strip_json_prefix(mut data: &[u8]) -> &[u8] {
    while !data.is_empty() && serde_json::from_slice::<serde_json::Value>(data).is_err() {
        data = &data[1..];
    }
    data
}
