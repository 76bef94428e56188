//! Zip container for trained forecast pipelines
//!
//! Layout:
//! - `manifest.json`: format version, producer, timestamp, pipeline hash
//! - `schema.json`: input schema the pipeline expects
//! - `pipeline.json`: canonical JSON of the fitted transforms and ensemble
//!
//! The manifest hash is the Blake3 hex digest of the exact `pipeline.json`
//! bytes; [`load_artifact`] refuses containers where it does not match.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::errors::{ForecastError, Result};
use crate::pipeline::TrainedPipeline;
use crate::schema::Schema;
use crate::serde_canon::{hash_bytes_hex, to_canonical_json};

/// Container format version written by this crate
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

pub const MANIFEST_ENTRY: &str = "manifest.json";
pub const SCHEMA_ENTRY: &str = "schema.json";
pub const PIPELINE_ENTRY: &str = "pipeline.json";

/// Descriptive header stored alongside the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub format_version: u32,
    /// `name/version` of the producing crate
    pub producer: String,
    pub created_at: DateTime<Utc>,
    /// Blake3 hex digest of `pipeline.json`
    pub pipeline_hash: String,
    pub training_rows: usize,
    pub tree_count: usize,
}

/// A loaded (and verified) artifact
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifact {
    pub manifest: ArtifactManifest,
    pub schema: Schema,
    pub pipeline: TrainedPipeline,
}

/// Write a trained pipeline and its input schema to `path`
pub fn save_artifact<P: AsRef<Path>>(
    path: P,
    pipeline: &TrainedPipeline,
    schema: &Schema,
    training_rows: usize,
) -> Result<ArtifactManifest> {
    let path = path.as_ref();
    pipeline.validate()?;

    let pipeline_json = to_canonical_json(pipeline)?;
    let manifest = ArtifactManifest {
        format_version: ARTIFACT_FORMAT_VERSION,
        producer: format!("{}/{}", env!("CARGO_PKG_NAME"), crate::VERSION),
        created_at: Utc::now(),
        pipeline_hash: hash_bytes_hex(pipeline_json.as_bytes()),
        training_rows,
        tree_count: pipeline.model.num_trees(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    let entries = [
        (MANIFEST_ENTRY, serde_json::to_vec_pretty(&manifest)?),
        (SCHEMA_ENTRY, serde_json::to_vec_pretty(schema)?),
        (PIPELINE_ENTRY, pipeline_json.into_bytes()),
    ];
    for (name, bytes) in &entries {
        zip.start_file(*name, options)?;
        zip.write_all(bytes)?;
        debug!("Wrote {} ({} bytes)", name, bytes.len());
    }
    zip.finish()?;

    info!(
        "Saved model artifact to {} (hash {})",
        path.display(),
        manifest.pipeline_hash
    );
    Ok(manifest)
}

/// Read an artifact back, verifying its format version and pipeline hash
pub fn load_artifact<P: AsRef<Path>>(path: P) -> Result<ModelArtifact> {
    let file = File::open(path.as_ref())?;
    let mut archive = zip::ZipArchive::new(file)?;

    let manifest: ArtifactManifest =
        serde_json::from_str(&read_entry(&mut archive, MANIFEST_ENTRY)?)?;
    if manifest.format_version != ARTIFACT_FORMAT_VERSION {
        return Err(ForecastError::InvalidArtifact(format!(
            "unsupported format version {}",
            manifest.format_version
        )));
    }

    let pipeline_json = read_entry(&mut archive, PIPELINE_ENTRY)?;
    let actual_hash = hash_bytes_hex(pipeline_json.as_bytes());
    if actual_hash != manifest.pipeline_hash {
        return Err(ForecastError::InvalidArtifact(format!(
            "pipeline hash mismatch: manifest {}, computed {}",
            manifest.pipeline_hash, actual_hash
        )));
    }

    let schema: Schema = serde_json::from_str(&read_entry(&mut archive, SCHEMA_ENTRY)?)?;
    let pipeline: TrainedPipeline = serde_json::from_str(&pipeline_json)?;
    pipeline.validate()?;

    Ok(ModelArtifact {
        manifest,
        schema,
        pipeline,
    })
}

fn read_entry(archive: &mut zip::ZipArchive<File>, name: &str) -> Result<String> {
    let mut entry = archive.by_name(name).map_err(|err| {
        ForecastError::InvalidArtifact(format!("missing entry '{name}': {err}"))
    })?;
    let mut content = String::new();
    entry.read_to_string(&mut content)?;
    Ok(content)
}
