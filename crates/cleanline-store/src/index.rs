//! Per-artifact version index stored at `artifacts/{name}/index.json`

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::artifact::{ArtifactHandle, VersionSpec};

pub const INDEX_FILE: &str = "index.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionEntry {
    pub version: u32,
    pub content_hash: String,
    pub description: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub run_id: Option<String>,
}

/// All versions of one artifact, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactIndex {
    pub name: String,
    pub artifact_type: String,
    pub versions: Vec<VersionEntry>,
}

impl ArtifactIndex {
    pub fn new(name: &str, artifact_type: &str) -> Self {
        Self {
            name: name.to_string(),
            artifact_type: artifact_type.to_string(),
            versions: Vec::new(),
        }
    }

    pub fn latest(&self) -> Option<&VersionEntry> {
        self.versions.last()
    }

    pub fn get(&self, spec: VersionSpec) -> Option<&VersionEntry> {
        match spec {
            VersionSpec::Latest => self.latest(),
            VersionSpec::Version(v) => self.versions.iter().find(|e| e.version == v),
        }
    }

    pub fn next_version(&self) -> u32 {
        self.latest().map_or(0, |e| e.version + 1)
    }

    /// Append a new version and return it.
    pub fn push(
        &mut self,
        content_hash: &str,
        description: &str,
        run_id: Option<&str>,
    ) -> &VersionEntry {
        let entry = VersionEntry {
            version: self.next_version(),
            content_hash: content_hash.to_string(),
            description: description.to_string(),
            created_at: chrono::Utc::now(),
            run_id: run_id.map(str::to_string),
        };
        self.versions.push(entry);
        &self.versions[self.versions.len() - 1]
    }

    pub fn handle(&self, entry: &VersionEntry) -> ArtifactHandle {
        ArtifactHandle {
            name: self.name.clone(),
            version: entry.version,
            artifact_type: self.artifact_type.clone(),
            description: entry.description.clone(),
            content_hash: entry.content_hash.clone(),
            created_at: entry.created_at,
            run_id: entry.run_id.clone(),
        }
    }

    pub fn write_to(&self, dir: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize index")?;
        crate::fsutil::write_durable(&dir.join(INDEX_FILE), json.as_bytes())
    }

    pub fn read_from(dir: &Path) -> Result<Self> {
        let path = dir.join(INDEX_FILE);
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("failed to parse {}", path.display()))
    }
}
