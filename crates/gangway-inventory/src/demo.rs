// Copyright 2026 The gangway authors
// Licensed under the Apache License, Version 2.0

use crate::{ConnectCommand, InventorySource};
use anyhow::{Context, Result};
use gangway_app::Node;
use std::path::PathBuf;

pub const DEMO_PROFILE: &str = "demo-cluster";

/// In-memory inventory for trying the picker without a Teleport cluster.
/// Confirming a host connects to the configured target over plain ssh.
pub struct DemoSource {
    ssh_path: PathBuf,
    target: String,
}

impl DemoSource {
    pub fn new(target: impl Into<String>) -> Result<Self> {
        let ssh_path = which::which("ssh").context("`ssh` command not found on PATH")?;
        Ok(Self {
            ssh_path,
            target: target.into(),
        })
    }
}

impl InventorySource for DemoSource {
    fn fetch_nodes(&self, _refresh: bool) -> Result<Vec<Node>> {
        Ok(demo_nodes())
    }

    fn profile_name(&self) -> Result<String> {
        Ok(DEMO_PROFILE.to_owned())
    }

    fn connect_command(&self, _hostname: &str) -> ConnectCommand {
        ConnectCommand {
            program: self.ssh_path.clone(),
            args: vec![self.target.clone()],
        }
    }
}

fn demo_nodes() -> Vec<Node> {
    const HOSTS: [(&str, &str, &str, &str, &str); 8] = [
        ("host1.example.com", "192.168.1.1", "Ubuntu 22.04", "dev", "us-east-1a"),
        ("host2.example.com", "192.168.1.2", "Ubuntu 22.04", "dev", "us-east-1b"),
        ("host3.example.com", "192.168.1.3", "Ubuntu 22.04", "dev", "us-east-1b"),
        ("host4.example.com", "192.168.1.4", "CentOS Stream", "infra", "us-east-1b"),
        ("host5.example.com", "192.168.1.5", "CentOS Stream", "infra", "us-east-1a"),
        ("host6.example.com", "192.168.1.6", "NixOS 23.11", "infra", "us-east-1c"),
        ("host7.example.com", "192.168.1.7", "NixOS 23.11", "infra", "us-east-1c"),
        ("host8.example.com", "192.168.1.8", "Rocky Linux 9", "dev", "us-east-1a"),
    ];

    HOSTS
        .iter()
        .map(|(hostname, ip, os, team, zone)| Node {
            hostname: (*hostname).to_owned(),
            ip: (*ip).to_owned(),
            os: (*os).to_owned(),
            labels: [
                ("Team".to_owned(), (*team).to_owned()),
                ("AZ".to_owned(), (*zone).to_owned()),
            ]
            .into_iter()
            .collect(),
        })
        .collect()
}
