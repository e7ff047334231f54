//! Artifact names, references, and the publish-side builder

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Which version of an artifact a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSpec {
    Latest,
    Version(u32),
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Version(v) => write!(f, "v{v}"),
        }
    }
}

/// `name`, `name:latest`, or `name:vN`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    pub name: String,
    pub version: VersionSpec,
}

impl FromStr for ArtifactRef {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, version) = match s.rsplit_once(':') {
            None => (s, VersionSpec::Latest),
            Some((name, "latest")) => (name, VersionSpec::Latest),
            Some((name, tag)) => {
                let v = tag
                    .strip_prefix('v')
                    .and_then(|n| n.parse::<u32>().ok())
                    .with_context(|| {
                        format!("invalid version '{tag}' in '{s}' (expected 'latest' or 'vN')")
                    })?;
                (name, VersionSpec::Version(v))
            }
        };
        validate_name(name)?;
        Ok(Self {
            name: name.to_string(),
            version,
        })
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.version)
    }
}

/// Names become directory names, so only `[A-Za-z0-9._-]` is allowed.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        anyhow::bail!("artifact name is empty");
    }
    if name == "." || name == ".." {
        anyhow::bail!("invalid artifact name '{name}'");
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        anyhow::bail!("invalid character '{c}' in artifact name '{name}'");
    }
    Ok(())
}

/// An artifact being assembled for publication.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub name: String,
    pub artifact_type: String,
    pub description: String,
    files: Vec<PathBuf>,
}

impl Artifact {
    pub fn new(
        name: impl Into<String>,
        artifact_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            artifact_type: artifact_type.into(),
            description: description.into(),
            files: Vec::new(),
        }
    }

    /// Stage a local file; it is stored under its own file name.
    pub fn add_file(&mut self, path: &Path) -> &mut Self {
        self.files.push(path.to_path_buf());
        self
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

/// A resolved, published artifact version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactHandle {
    pub name: String,
    pub version: u32,
    pub artifact_type: String,
    pub description: String,
    /// Full hex content hash of the backing object.
    pub content_hash: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Run that logged this version, if any.
    pub run_id: Option<String>,
}

impl ArtifactHandle {
    pub fn object_hash(&self) -> String {
        crate::hash::short_hex(&self.content_hash)
    }
}

impl fmt::Display for ArtifactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:v{}", self.name, self.version)
    }
}
