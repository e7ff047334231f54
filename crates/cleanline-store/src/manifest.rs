//! Object manifest: per-file digests of a stored artifact version

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::hash;

pub const MANIFEST_FILE: &str = "manifest.json";

/// Bumped when the on-disk object layout changes.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// Manifest stored alongside the files of an object directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectManifest {
    pub format_version: u32,
    /// Per-file blake3 digests (filename → full hex hash).
    pub file_hashes: BTreeMap<String, String>,
    /// Combined digest over file names and file digests.
    pub content_hash: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ObjectManifest {
    /// Hash every regular file directly inside `dir`, skipping the manifest.
    ///
    /// Returns (file_hashes, combined content hash).
    pub fn compute_content_hashes(dir: &Path) -> Result<(BTreeMap<String, String>, blake3::Hash)> {
        let pattern = dir.join("*");
        let pattern_str = pattern.to_string_lossy();

        let mut entries: Vec<_> = glob::glob(&pattern_str)
            .context("invalid glob pattern")?
            .filter_map(|e| e.ok())
            .filter(|p| p.is_file() && p.file_name().is_none_or(|n| n != MANIFEST_FILE))
            .collect();
        entries.sort();

        let mut digests = Vec::with_capacity(entries.len());
        for path in &entries {
            let h = hash::hash_file(path)
                .with_context(|| format!("failed to hash {}", path.display()))?;
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .with_context(|| format!("no file name: {}", path.display()))?;
            digests.push((filename, h));
        }

        let content_hash = hash::combine_named(digests.iter().map(|(n, h)| (n.as_str(), h)));
        let file_hashes = digests
            .into_iter()
            .map(|(n, h)| (n, h.to_hex().to_string()))
            .collect();

        Ok((file_hashes, content_hash))
    }

    /// Build a manifest for the files currently in `dir`.
    pub fn for_dir(dir: &Path) -> Result<Self> {
        let (file_hashes, content_hash) = Self::compute_content_hashes(dir)?;
        Ok(Self {
            format_version: CURRENT_FORMAT_VERSION,
            file_hashes,
            content_hash: content_hash.to_hex().to_string(),
            created_at: chrono::Utc::now(),
        })
    }

    pub fn short_hash(&self) -> String {
        hash::short_hex(&self.content_hash)
    }

    pub fn write_to(&self, dir: &Path) -> Result<()> {
        let path = dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self).context("failed to serialize manifest")?;
        crate::fsutil::write_durable(&path, json.as_bytes())
    }

    pub fn read_from(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let manifest: Self = serde_json::from_str(&json)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(manifest)
    }
}
