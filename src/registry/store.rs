use super::{ModelUri, RunRecord, VersionInfo};
use crate::model::PricingPipeline;
use crate::{Error, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Filesystem-backed model registry.
///
/// Layout under the root:
///
/// ```text
/// models/<name>/versions/<N>/model.json   serialized pipeline
/// models/<name>/versions/<N>/meta.json    version record
/// models/<name>/aliases/<stage>           text file holding a version number
/// experiments/<experiment>/<run_id>.json  run record
/// ```
///
/// Version numbering assumes a single writer, which the offline trainer is.
pub struct FsModelRegistry {
    root: PathBuf,
}

impl FsModelRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn versions_dir(&self, name: &str) -> PathBuf {
        self.root.join("models").join(name).join("versions")
    }

    fn version_dir(&self, name: &str, version: u32) -> PathBuf {
        self.versions_dir(name).join(version.to_string())
    }

    fn alias_path(&self, name: &str, stage: &str) -> PathBuf {
        self.root.join("models").join(name).join("aliases").join(stage)
    }

    /// Resolves a stage alias to the version number it currently points at.
    pub async fn resolve(&self, uri: &ModelUri) -> Result<u32> {
        let path = self.alias_path(&uri.name, &uri.stage);
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|_| Error::registry(format!("no model registered under {uri}")))?;
        raw.trim()
            .parse()
            .map_err(|_| Error::registry(format!("alias file for {uri} does not hold a version number")))
    }

    /// Loads the pipeline the given URI resolves to.
    pub async fn load_model(&self, uri: &ModelUri) -> Result<PricingPipeline> {
        let version = self.resolve(uri).await?;
        let artifact = self.version_dir(&uri.name, version).join("model.json");

        let raw = tokio::fs::read_to_string(&artifact).await.map_err(|e| {
            Error::registry(format!("failed to read artifact for {uri} version {version}: {e}"))
        })?;
        let pipeline = serde_json::from_str(&raw)
            .map_err(|e| Error::registry(format!("corrupt artifact for {uri} version {version}: {e}")))?;

        info!("Loaded model {} (version {})", uri, version);
        Ok(pipeline)
    }

    /// Stores the pipeline as the next version of `name` and returns the
    /// version record. The new version is not served until an alias points
    /// at it.
    pub async fn register_model(
        &self,
        name: &str,
        pipeline: &PricingPipeline,
        run_id: &str,
    ) -> Result<VersionInfo> {
        let version = self.next_version(name).await?;
        let dir = self.version_dir(name, version);
        tokio::fs::create_dir_all(&dir).await?;

        tokio::fs::write(dir.join("model.json"), serde_json::to_string(pipeline)?).await?;

        let record = VersionInfo {
            name: name.to_string(),
            version,
            run_id: run_id.to_string(),
            created_at: Utc::now(),
        };
        tokio::fs::write(dir.join("meta.json"), serde_json::to_string_pretty(&record)?).await?;

        info!("Registered model '{}' as version {}", name, version);
        Ok(record)
    }

    async fn next_version(&self, name: &str) -> Result<u32> {
        let dir = self.versions_dir(name);
        let mut highest = 0;

        match tokio::fs::read_dir(&dir).await {
            Ok(mut entries) => {
                while let Some(entry) = entries.next_entry().await? {
                    if let Some(version) = entry
                        .file_name()
                        .to_str()
                        .and_then(|n| n.parse::<u32>().ok())
                    {
                        highest = highest.max(version);
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        Ok(highest + 1)
    }

    /// Points the stage alias at an already registered version.
    pub async fn set_alias(&self, name: &str, stage: &str, version: u32) -> Result<()> {
        let dir = self.version_dir(name, version);
        if tokio::fs::metadata(&dir).await.is_err() {
            return Err(Error::registry(format!(
                "cannot alias '{name}@{stage}' to unregistered version {version}"
            )));
        }

        let path = self.alias_path(name, stage);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, version.to_string()).await?;

        debug!("Alias '{}@{}' now points at version {}", name, stage, version);
        Ok(())
    }

    /// Writes the run record under its experiment directory.
    pub async fn log_run(&self, run: &RunRecord) -> Result<()> {
        let dir = self.root.join("experiments").join(&run.experiment);
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(format!("{}.json", run.run_id));
        tokio::fs::write(&path, serde_json::to_string_pretty(run)?).await?;

        debug!("Logged run {} to {}", run.run_id, path.display());
        Ok(())
    }
}
