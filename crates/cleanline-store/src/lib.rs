//! cleanline-store: Versioned artifact store for pipeline steps
//!
//! Artifacts are named, versioned, immutable snapshots of files. File
//! contents live in content-addressed object directories (blake3), and each
//! artifact name keeps an index of its versions. Runs record which versions
//! a step consumed and produced.

pub mod artifact;
pub mod fsutil;
pub mod hash;
pub mod index;
pub mod manifest;
pub mod run;
pub mod store;

pub use artifact::{Artifact, ArtifactHandle, ArtifactRef, VersionSpec};
pub use index::ArtifactIndex;
pub use manifest::ObjectManifest;
pub use run::{Run, RunRecord};
pub use store::Store;
