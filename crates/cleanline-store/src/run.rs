//! Runs: one execution of a pipeline step, with its config and the
//! artifact versions it consumed and produced.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::artifact::{Artifact, ArtifactHandle};
use crate::hash;
use crate::store::Store;

pub const RUN_FILE: &str = "run.json";

/// Reference to an artifact version recorded on a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunArtifact {
    pub name: String,
    pub version: u32,
    pub content_hash: String,
}

impl From<&ArtifactHandle> for RunArtifact {
    fn from(h: &ArtifactHandle) -> Self {
        Self {
            name: h.name.clone(),
            version: h.version,
            content_hash: h.content_hash.clone(),
        }
    }
}

/// Persisted as `runs/{run_id}/run.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: String,
    pub job_type: String,
    pub config: serde_json::Map<String, serde_json::Value>,
    pub used: Vec<RunArtifact>,
    pub logged: Vec<RunArtifact>,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub finished_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl RunRecord {
    pub fn read_from(store: &Store, run_id: &str) -> Result<Self> {
        let path = store.runs_dir().join(run_id).join(RUN_FILE);
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("failed to parse {}", path.display()))
    }
}

/// An in-progress run against a store.
pub struct Run<'a> {
    store: &'a Store,
    record: RunRecord,
}

impl<'a> Run<'a> {
    pub fn init(store: &'a Store, job_type: &str) -> Self {
        let started_at = chrono::Utc::now();
        let seed = format!(
            "{job_type}\0{}\0{}",
            started_at.timestamp_nanos_opt().unwrap_or_default(),
            std::process::id()
        );
        let run_id = hash::short_hash(&hash::hash_bytes(seed.as_bytes()));
        log::info!("run {run_id} started ({job_type})");

        Self {
            store,
            record: RunRecord {
                run_id,
                job_type: job_type.to_string(),
                config: serde_json::Map::new(),
                used: Vec::new(),
                logged: Vec::new(),
                started_at,
                finished_at: None,
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.record.run_id
    }

    pub fn record(&self) -> &RunRecord {
        &self.record
    }

    /// Merge the serialized fields of `config` into the run config.
    pub fn update_config<T: Serialize>(&mut self, config: &T) -> Result<()> {
        match serde_json::to_value(config).context("failed to serialize run config")? {
            serde_json::Value::Object(map) => {
                self.record.config.extend(map);
                Ok(())
            }
            other => anyhow::bail!("run config must serialize to an object, got {other}"),
        }
    }

    /// Fetch an input artifact and record the resolved version.
    pub fn use_artifact(&mut self, reference: &str) -> Result<PathBuf> {
        let handle = self.store.resolve(reference)?;
        let path = self.store.fetch_version(&handle)?;
        log::info!("run {}: using {handle}", self.record.run_id);
        self.record.used.push(RunArtifact::from(&handle));
        Ok(path)
    }

    /// Publish an output artifact and record it.
    pub fn log_artifact(&mut self, artifact: &Artifact) -> Result<ArtifactHandle> {
        let handle = self.store.publish(artifact, Some(&self.record.run_id))?;
        self.record.logged.push(RunArtifact::from(&handle));
        Ok(handle)
    }

    /// Write `run.json` and end the run.
    pub fn finish(mut self) -> Result<RunRecord> {
        self.record.finished_at = Some(chrono::Utc::now());
        let dir = self.store.runs_dir().join(&self.record.run_id);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let json =
            serde_json::to_string_pretty(&self.record).context("failed to serialize run record")?;
        crate::fsutil::write_durable(&dir.join(RUN_FILE), json.as_bytes())?;
        log::info!("run {} finished", self.record.run_id);
        Ok(self.record)
    }
}
