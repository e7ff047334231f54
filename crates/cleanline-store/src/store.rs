//! Filesystem-backed artifact store
//!
//! Directory layout:
//! ```text
//! {base}/
//! ├── objects/
//! │   └── {content-hash}/      # 8 char hex, immutable once renamed into place
//! │       ├── manifest.json
//! │       └── <artifact files>
//! ├── artifacts/
//! │   └── {name}/
//! │       └── index.json       # versions v0, v1, ... → object hash
//! └── runs/
//!     └── {run-id}/
//!         └── run.json
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::artifact::{validate_name, Artifact, ArtifactHandle, ArtifactRef};
use crate::fsutil;
use crate::hash;
use crate::index::{ArtifactIndex, INDEX_FILE};
use crate::manifest::{ObjectManifest, CURRENT_FORMAT_VERSION};

/// One artifact version, for listing.
#[derive(Debug, Serialize)]
pub struct StoreEntry {
    pub name: String,
    pub version: u32,
    pub artifact_type: String,
    pub object: String,
    pub file_count: usize,
    pub created_at: String,
    pub description: String,
}

/// Verification result for a single file.
#[derive(Debug)]
pub struct VerifyResult {
    pub path: String,
    pub expected: String,
    pub actual: String,
    pub ok: bool,
}

pub struct Store {
    base: PathBuf,
}

impl Store {
    /// Open (creating if needed) a store rooted at `base`.
    pub fn open(base: &Path) -> Result<Self> {
        for dir in ["objects", "artifacts", "runs"] {
            let path = base.join(dir);
            fs::create_dir_all(&path)
                .with_context(|| format!("failed to create store dir: {}", path.display()))?;
        }
        Ok(Self {
            base: base.to_path_buf(),
        })
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn objects_dir(&self) -> PathBuf {
        self.base.join("objects")
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.base.join("artifacts")
    }

    pub fn runs_dir(&self) -> PathBuf {
        self.base.join("runs")
    }

    pub fn object_dir(&self, short: &str) -> PathBuf {
        self.objects_dir().join(short)
    }

    fn artifact_dir(&self, name: &str) -> PathBuf {
        self.artifacts_dir().join(name)
    }

    /// Load the version index for `name`, if the artifact exists.
    pub fn index(&self, name: &str) -> Result<Option<ArtifactIndex>> {
        let dir = self.artifact_dir(name);
        if !dir.join(INDEX_FILE).exists() {
            return Ok(None);
        }
        ArtifactIndex::read_from(&dir).map(Some)
    }

    /// Resolve a reference such as `sample.csv:latest` to a concrete version.
    pub fn resolve(&self, reference: &str) -> Result<ArtifactHandle> {
        let reference: ArtifactRef = reference.parse()?;
        self.resolve_ref(&reference)
    }

    pub fn resolve_ref(&self, reference: &ArtifactRef) -> Result<ArtifactHandle> {
        let index = self
            .index(&reference.name)?
            .with_context(|| format!("artifact '{}' not found", reference.name))?;
        let entry = index
            .get(reference.version)
            .with_context(|| format!("artifact '{reference}' not found"))?;
        Ok(index.handle(entry))
    }

    /// Fetch an artifact by reference and return the path of its single file.
    pub fn fetch(&self, reference: &str) -> Result<PathBuf> {
        let handle = self.resolve(reference)?;
        self.fetch_version(&handle)
    }

    /// Return the local path of a resolved version's single file, after
    /// checking its digest against the object manifest.
    pub fn fetch_version(&self, handle: &ArtifactHandle) -> Result<PathBuf> {
        let dir = self.object_dir(&handle.object_hash());
        let manifest = ObjectManifest::read_from(&dir)
            .with_context(|| format!("object for {handle} is missing or corrupt"))?;
        if manifest.format_version != CURRENT_FORMAT_VERSION {
            anyhow::bail!(
                "object {} has format_version {} (expected {CURRENT_FORMAT_VERSION})",
                manifest.short_hash(),
                manifest.format_version
            );
        }
        if manifest.content_hash != handle.content_hash {
            anyhow::bail!(
                "object {} does not match {handle} (content hash collision)",
                manifest.short_hash()
            );
        }

        let mut files = manifest.file_hashes.iter();
        let (filename, expected) = match (files.next(), files.next()) {
            (Some(only), None) => only,
            (None, _) => anyhow::bail!("{handle} contains no files"),
            (Some(_), Some(_)) => anyhow::bail!(
                "{handle} contains {} files, expected exactly one",
                manifest.file_hashes.len()
            ),
        };

        let path = dir.join(filename);
        let actual = hash::hash_file(&path)
            .with_context(|| format!("failed to read {}", path.display()))?
            .to_hex()
            .to_string();
        if actual != *expected {
            anyhow::bail!(
                "integrity check failed for {handle}: {filename} expected {} got {}",
                hash::short_hex(expected),
                hash::short_hex(&actual)
            );
        }

        log::debug!("fetched {handle} → {}", path.display());
        Ok(path)
    }

    /// Publish an artifact and return its version.
    ///
    /// Returns once the object files and the updated index are on disk.
    /// If the latest version already holds identical content, that version
    /// is returned and no new one is created.
    pub fn publish(&self, artifact: &Artifact, run_id: Option<&str>) -> Result<ArtifactHandle> {
        validate_name(&artifact.name)?;
        if artifact.artifact_type.is_empty() {
            anyhow::bail!("artifact '{}' has an empty type", artifact.name);
        }

        let mut index = match self.index(&artifact.name)? {
            Some(index) => {
                if index.artifact_type != artifact.artifact_type {
                    anyhow::bail!(
                        "artifact '{}' has type '{}', cannot publish as '{}'",
                        artifact.name,
                        index.artifact_type,
                        artifact.artifact_type
                    );
                }
                index
            }
            None => ArtifactIndex::new(&artifact.name, &artifact.artifact_type),
        };

        let manifest = self.commit_object(artifact)?;

        if let Some(latest) = index.latest() {
            if latest.content_hash == manifest.content_hash {
                let handle = index.handle(latest);
                log::info!("{handle} unchanged (content {}), not creating a new version", manifest.short_hash());
                return Ok(handle);
            }
        }

        let entry = index
            .push(&manifest.content_hash, &artifact.description, run_id)
            .clone();

        let dir = self.artifact_dir(&artifact.name);
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        index.write_to(&dir)?;

        let handle = index.handle(&entry);
        log::info!("published {handle} (content {})", manifest.short_hash());
        Ok(handle)
    }

    /// Copy the artifact's files into a content-addressed object directory.
    fn commit_object(&self, artifact: &Artifact) -> Result<ObjectManifest> {
        if artifact.files().is_empty() {
            anyhow::bail!("artifact '{}' has no files", artifact.name);
        }

        // Digest the sources first so the staging dir can be named after them.
        let mut sources = BTreeMap::new();
        for path in artifact.files() {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .with_context(|| format!("not a file path: {}", path.display()))?;
            if sources.insert(filename.clone(), path).is_some() {
                anyhow::bail!(
                    "artifact '{}' has two files named '{filename}'",
                    artifact.name
                );
            }
        }
        let mut digests = Vec::with_capacity(sources.len());
        for (filename, path) in &sources {
            let h = hash::hash_file(path)
                .with_context(|| format!("failed to hash {}", path.display()))?;
            digests.push((filename.as_str(), h));
        }
        let expected = hash::combine_named(digests.iter().map(|(n, h)| (*n, h)));
        let short = hash::short_hash(&expected);

        let final_dir = self.object_dir(&short);
        if final_dir.exists() {
            let existing = ObjectManifest::read_from(&final_dir)
                .with_context(|| format!("existing object {short} is corrupt"))?;
            if existing.content_hash != expected.to_hex().as_str() {
                anyhow::bail!("object hash collision on {short}");
            }
            log::debug!("object {short} already stored");
            return Ok(existing);
        }

        let tmp_dir = self.objects_dir().join(format!("{short}.tmp"));
        if tmp_dir.exists() {
            fs::remove_dir_all(&tmp_dir)
                .with_context(|| format!("failed to remove stale {}", tmp_dir.display()))?;
        }
        fs::create_dir_all(&tmp_dir)
            .with_context(|| format!("failed to create {}", tmp_dir.display()))?;

        for (filename, path) in &sources {
            fsutil::copy_durable(path, &tmp_dir.join(filename))?;
        }

        let manifest = ObjectManifest::for_dir(&tmp_dir)?;
        if manifest.content_hash != expected.to_hex().as_str() {
            fs::remove_dir_all(&tmp_dir).ok();
            anyhow::bail!(
                "files of '{}' changed while being stored",
                artifact.name
            );
        }
        manifest.write_to(&tmp_dir)?;

        if final_dir.exists() {
            // Same hash = same content, written by a concurrent publish.
            log::info!("object {short} appeared concurrently, removing tmp");
            fs::remove_dir_all(&tmp_dir)
                .with_context(|| format!("failed to remove tmp {}", tmp_dir.display()))?;
        } else {
            fs::rename(&tmp_dir, &final_dir).with_context(|| {
                format!(
                    "failed to rename {} → {}",
                    tmp_dir.display(),
                    final_dir.display()
                )
            })?;
            fsutil::sync_dir(&self.objects_dir());
        }

        Ok(manifest)
    }

    /// Names of artifact directories, sorted.
    fn artifact_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(self.artifacts_dir())? {
            let entry = entry?;
            if entry.path().is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// All artifact indexes, sorted by name.
    ///
    /// Fails on the first index that cannot be read. Directories without an
    /// index (an interrupted first publish) are skipped.
    pub fn indexes(&self) -> Result<Vec<ArtifactIndex>> {
        let mut indexes = Vec::new();
        for name in self.artifact_names()? {
            if let Some(index) = self
                .index(&name)
                .with_context(|| format!("unreadable index for artifact '{name}'"))?
            {
                indexes.push(index);
            }
        }
        Ok(indexes)
    }

    /// List every artifact version. Unreadable indexes are logged and skipped.
    pub fn list(&self) -> Result<Vec<StoreEntry>> {
        let mut readable = Vec::new();
        for name in self.artifact_names()? {
            match self.index(&name) {
                Ok(Some(index)) => readable.push(index),
                Ok(None) => {}
                Err(e) => log::warn!("skipping artifact {name}: {e:#}"),
            }
        }

        let mut entries = Vec::new();
        for index in readable {
            for version in &index.versions {
                let object = hash::short_hex(&version.content_hash);
                let file_count = match ObjectManifest::read_from(&self.object_dir(&object)) {
                    Ok(m) => m.file_hashes.len(),
                    Err(e) => {
                        log::warn!("{}:v{}: {e}", index.name, version.version);
                        0
                    }
                };
                entries.push(StoreEntry {
                    name: index.name.clone(),
                    version: version.version,
                    artifact_type: index.artifact_type.clone(),
                    object,
                    file_count,
                    created_at: version.created_at.format("%Y-%m-%d %H:%M").to_string(),
                    description: version.description.clone(),
                });
            }
        }
        Ok(entries)
    }

    /// Object hashes referenced by any artifact version. Any unreadable
    /// index is an error, so `gc` never mistakes its objects for garbage.
    fn referenced_objects(&self) -> Result<HashSet<String>> {
        Ok(self
            .indexes()?
            .iter()
            .flat_map(|index| index.versions.iter())
            .map(|v| hash::short_hex(&v.content_hash))
            .collect())
    }

    /// Remove objects no artifact version points at, plus stale `.tmp` dirs.
    /// Returns the removed directory names.
    pub fn gc(&self) -> Result<Vec<String>> {
        let referenced = self.referenced_objects()?;
        let mut removed = Vec::new();

        for entry in fs::read_dir(self.objects_dir())? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            if name.ends_with(".tmp") {
                log::info!("gc: removing stale tmp {name}");
                fs::remove_dir_all(&path)?;
                removed.push(name);
            } else if !referenced.contains(&name) {
                log::info!("gc: removing unreferenced {name}");
                fs::remove_dir_all(&path)?;
                removed.push(name);
            }
        }

        removed.sort();
        Ok(removed)
    }

    /// Objects `gc` would remove, without touching anything.
    pub fn unreferenced(&self) -> Result<Vec<String>> {
        let referenced = self.referenced_objects()?;
        let mut names = Vec::new();
        for entry in fs::read_dir(self.objects_dir())? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if entry.path().is_dir() && (name.ends_with(".tmp") || !referenced.contains(&name)) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Recompute file digests of one object.
    pub fn verify(&self, object: &str) -> Result<Vec<VerifyResult>> {
        let dir = self.object_dir(object);
        let manifest =
            ObjectManifest::read_from(&dir).with_context(|| format!("no manifest for {object}"))?;

        let mut results = Vec::new();
        for (filename, expected) in &manifest.file_hashes {
            let path = dir.join(filename);
            let (actual, ok) = if path.exists() {
                match hash::hash_file(&path) {
                    Ok(h) => {
                        let hex = h.to_hex().to_string();
                        let ok = hex == *expected;
                        (hex, ok)
                    }
                    Err(e) => (format!("error: {e}"), false),
                }
            } else {
                ("MISSING".to_string(), false)
            };
            results.push(VerifyResult {
                path: filename.clone(),
                expected: expected.clone(),
                actual,
                ok,
            });
        }
        Ok(results)
    }

    pub fn verify_all(&self) -> Result<BTreeMap<String, Vec<VerifyResult>>> {
        let mut all = BTreeMap::new();
        for entry in fs::read_dir(self.objects_dir())? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".tmp") || !entry.path().is_dir() {
                continue;
            }
            match self.verify(&name) {
                Ok(results) => {
                    all.insert(name, results);
                }
                Err(e) => log::warn!("verify {name}: {e}"),
            }
        }
        Ok(all)
    }

    /// Remove `.tmp` object directories left by interrupted publishes.
    ///
    /// Only directories last modified at least `older_than` ago are removed,
    /// so a publish still staging its files is left alone.
    pub fn cleanup_tmp(&self, older_than: Duration) -> Result<usize> {
        let mut count = 0;
        for entry in fs::read_dir(self.objects_dir())? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(".tmp") || !entry.path().is_dir() {
                continue;
            }
            let age = entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .and_then(|t| t.elapsed().ok());
            if age.is_some_and(|age| age >= older_than) {
                log::info!("cleaning stale tmp: {name}");
                fs::remove_dir_all(entry.path())?;
                count += 1;
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, data).unwrap();
        path
    }

    fn publish_bytes(store: &Store, scratch: &Path, name: &str, data: &[u8]) -> ArtifactHandle {
        let path = write_file(scratch, name, data);
        let mut artifact = Artifact::new(name, "raw_data", "test data");
        artifact.add_file(&path);
        store.publish(&artifact, None).unwrap()
    }

    #[test]
    fn open_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        assert_eq!(store.base(), dir.path());
        assert!(store.objects_dir().exists());
        assert!(store.artifacts_dir().exists());
        assert!(store.runs_dir().exists());
    }

    #[test]
    fn publish_then_fetch_returns_same_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();

        let handle = publish_bytes(&store, scratch.path(), "sample.csv", b"id,price\n1,50\n");
        assert_eq!(handle.version, 0);

        let path = store.fetch("sample.csv:latest").unwrap();
        assert_eq!(path.file_name().unwrap(), "sample.csv");
        assert_eq!(fs::read(&path).unwrap(), b"id,price\n1,50\n");
        assert_eq!(store.fetch("sample.csv").unwrap(), path);
        assert_eq!(store.fetch("sample.csv:v0").unwrap(), path);
    }

    #[test]
    fn new_content_bumps_version() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();

        publish_bytes(&store, scratch.path(), "sample.csv", b"one");
        let v1 = publish_bytes(&store, scratch.path(), "sample.csv", b"two");
        assert_eq!(v1.version, 1);

        assert_eq!(fs::read(store.fetch("sample.csv:v0").unwrap()).unwrap(), b"one");
        assert_eq!(fs::read(store.fetch("sample.csv").unwrap()).unwrap(), b"two");
    }

    #[test]
    fn identical_content_reuses_latest_version() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();

        let first = publish_bytes(&store, scratch.path(), "sample.csv", b"same");
        let again = publish_bytes(&store, scratch.path(), "sample.csv", b"same");
        assert_eq!(first, again);
        assert_eq!(store.index("sample.csv").unwrap().unwrap().versions.len(), 1);
    }

    #[test]
    fn type_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        publish_bytes(&store, scratch.path(), "sample.csv", b"raw");

        let path = write_file(scratch.path(), "sample.csv", b"other");
        let mut artifact = Artifact::new("sample.csv", "clean_sample", "");
        artifact.add_file(&path);
        let err = store.publish(&artifact, None).unwrap_err();
        assert!(err.to_string().contains("has type 'raw_data'"));
    }

    #[test]
    fn publish_without_files_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let artifact = Artifact::new("empty.csv", "raw_data", "");
        assert!(store.publish(&artifact, None).is_err());
        assert!(store.index("empty.csv").unwrap().is_none());
    }

    #[test]
    fn fetch_unknown_artifact_or_version() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        publish_bytes(&store, scratch.path(), "sample.csv", b"data");

        let err = store.fetch("missing.csv").unwrap_err();
        assert!(err.to_string().contains("not found"));
        let err = store.fetch("sample.csv:v3").unwrap_err();
        assert!(err.to_string().contains("sample.csv:v3"));
    }

    #[test]
    fn fetch_multi_file_artifact_fails() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();

        let a = write_file(scratch.path(), "a.csv", b"a");
        let b = write_file(scratch.path(), "b.csv", b"b");
        let mut artifact = Artifact::new("bundle", "raw_data", "");
        artifact.add_file(&a).add_file(&b);
        store.publish(&artifact, None).unwrap();

        let err = store.fetch("bundle").unwrap_err();
        assert!(err.to_string().contains("expected exactly one"));
    }

    #[test]
    fn duplicate_file_names_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();

        let sub = scratch.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        let a = write_file(scratch.path(), "a.csv", b"1");
        let b = write_file(&sub, "a.csv", b"2");
        let mut artifact = Artifact::new("dup", "raw_data", "");
        artifact.add_file(&a).add_file(&b);
        assert!(store.publish(&artifact, None).is_err());
    }

    #[test]
    fn corrupted_object_fails_fetch_and_verify() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let handle = publish_bytes(&store, scratch.path(), "sample.csv", b"original");

        let stored = store.object_dir(&handle.object_hash()).join("sample.csv");
        fs::write(&stored, b"tampered").unwrap();

        let err = store.fetch("sample.csv").unwrap_err();
        assert!(err.to_string().contains("integrity check failed"));

        let results = store.verify(&handle.object_hash()).unwrap();
        assert_eq!(results.len(), 1);
        assert!(!results[0].ok);
    }

    #[test]
    fn verify_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let handle = publish_bytes(&store, scratch.path(), "sample.csv", b"data");

        fs::remove_file(store.object_dir(&handle.object_hash()).join("sample.csv")).unwrap();
        let results = store.verify(&handle.object_hash()).unwrap();
        assert_eq!(results[0].actual, "MISSING");
    }

    #[test]
    fn verify_all_skips_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        publish_bytes(&store, scratch.path(), "sample.csv", b"data");
        fs::create_dir_all(store.objects_dir().join("deadbeef.tmp")).unwrap();

        let all = store.verify_all().unwrap();
        assert_eq!(all.len(), 1);
        assert!(all.values().all(|rs| rs.iter().all(|r| r.ok)));
    }

    #[test]
    fn list_returns_every_version() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();

        publish_bytes(&store, scratch.path(), "sample.csv", b"one");
        publish_bytes(&store, scratch.path(), "sample.csv", b"two");
        publish_bytes(&store, scratch.path(), "other.csv", b"three");

        let entries = store.list().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].name, "other.csv");
        assert!(entries.iter().all(|e| e.file_count == 1));
    }

    #[test]
    fn gc_keeps_referenced_and_cleans_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let handle = publish_bytes(&store, scratch.path(), "sample.csv", b"keep");

        fs::create_dir_all(store.objects_dir().join("deadbeef.tmp")).unwrap();
        fs::create_dir_all(store.objects_dir().join("0badf00d")).unwrap();

        assert_eq!(store.unreferenced().unwrap(), vec!["0badf00d", "deadbeef.tmp"]);
        let removed = store.gc().unwrap();
        assert_eq!(removed, vec!["0badf00d", "deadbeef.tmp"]);
        assert!(store.object_dir(&handle.object_hash()).exists());
    }

    #[test]
    fn cleanup_tmp_ignores_real_objects() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let handle = publish_bytes(&store, scratch.path(), "sample.csv", b"real");
        fs::create_dir_all(store.objects_dir().join("aaa.tmp")).unwrap();

        assert_eq!(store.cleanup_tmp(Duration::ZERO).unwrap(), 1);
        assert!(store.object_dir(&handle.object_hash()).exists());
    }

    #[test]
    fn cleanup_tmp_leaves_fresh_staging_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let staging = store.objects_dir().join("cafebabe.tmp");
        fs::create_dir_all(&staging).unwrap();

        assert_eq!(store.cleanup_tmp(Duration::from_secs(3600)).unwrap(), 0);
        assert!(staging.exists());
        assert_eq!(store.cleanup_tmp(Duration::ZERO).unwrap(), 1);
        assert!(!staging.exists());
    }

    #[test]
    fn gc_refuses_to_run_over_unreadable_index() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let handle = publish_bytes(&store, scratch.path(), "sample.csv", b"keep me");
        publish_bytes(&store, scratch.path(), "other.csv", b"other");

        let index_path = store.artifacts_dir().join("sample.csv").join(INDEX_FILE);
        let good = fs::read(&index_path).unwrap();
        fs::write(&index_path, &good[..good.len() / 2]).unwrap();

        assert!(store.gc().is_err());
        assert!(store.unreferenced().is_err());
        assert!(store.object_dir(&handle.object_hash()).exists());

        // list still shows what it can read
        let entries = store.list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "other.csv");

        fs::write(&index_path, good).unwrap();
        assert_eq!(fs::read(store.fetch("sample.csv").unwrap()).unwrap(), b"keep me");
    }

    #[test]
    fn gc_skips_artifact_dir_without_index() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let handle = publish_bytes(&store, scratch.path(), "sample.csv", b"data");
        fs::create_dir_all(store.artifacts_dir().join("half-published.csv")).unwrap();

        assert!(store.gc().unwrap().is_empty());
        assert!(store.object_dir(&handle.object_hash()).exists());
    }

    #[test]
    fn same_content_under_two_names_shares_object() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();

        let path = write_file(scratch.path(), "data.csv", b"shared");
        let mut a = Artifact::new("first", "raw_data", "");
        a.add_file(&path);
        let mut b = Artifact::new("second", "clean_sample", "");
        b.add_file(&path);

        let ha = store.publish(&a, None).unwrap();
        let hb = store.publish(&b, None).unwrap();
        assert_eq!(ha.content_hash, hb.content_hash);
        assert_eq!(fs::read_dir(store.objects_dir()).unwrap().count(), 1);
    }
}
