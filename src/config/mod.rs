//! Deployment configuration
//!
//! A project describes its deployment in a JSON document: where the built
//! artifact, the changelog and the version file live, plus one optional block
//! per hosting platform. A present block is what enables that platform.
//!
//! The three file-backed values are read lazily, relative to the base path the
//! config was loaded with, and memoized for the lifetime of the config value.

mod platforms;

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::error::{Error, Result};

pub use platforms::{
    CurseForgeConfig, CurseForgeRelation, CurseForgeRelations, FancySpacesConfig, GameVersion,
    HangarConfig, HangarServer, HytahubConfig, ModrinthConfig, ModtaleConfig, OrbisConfig,
    ProjectKind, UnifiedHytaleConfig,
};

/// Placeholder in `plugin_jar_path` replaced with the resolved version
pub const VERSION_PLACEHOLDER: &str = "%VERSION%";

/// Parsed deployment configuration
#[derive(Debug, Deserialize)]
pub struct DeploymentConfig {
    pub project_name: String,
    /// Path of the built artifact, may contain `%VERSION%`
    pub plugin_jar_path: String,
    pub changelog_path: String,
    pub version_path: String,

    pub fancyspaces: Option<FancySpacesConfig>,
    pub modrinth: Option<ModrinthConfig>,
    pub hangar: Option<HangarConfig>,
    pub orbis: Option<OrbisConfig>,
    pub modtale: Option<ModtaleConfig>,
    pub curseforge: Option<CurseForgeConfig>,
    pub unifiedhytale: Option<UnifiedHytaleConfig>,
    pub hytahub: Option<HytahubConfig>,

    #[serde(skip)]
    base_path: PathBuf,
    #[serde(skip)]
    plugin_artifact: OnceCell<Vec<u8>>,
    #[serde(skip)]
    version: OnceCell<String>,
    #[serde(skip)]
    changelog: OnceCell<String>,
}

impl DeploymentConfig {
    /// Read and parse the config file at `base_path/path`
    ///
    /// # Errors
    /// `ErrorCode::Config` if the file cannot be read or is not valid config JSON
    pub async fn read_from_path(base_path: impl Into<PathBuf>, path: impl AsRef<Path>) -> Result<Self> {
        let base_path = base_path.into();
        let full_path = base_path.join(path.as_ref());

        let data = tokio::fs::read_to_string(&full_path).await.map_err(|e| {
            Error::config(format!(
                "Failed to read config file {}: {e}",
                full_path.display()
            ))
        })?;

        Self::from_json(base_path, &data)
    }

    /// Parse a config document; referenced files resolve against `base_path`
    pub fn from_json(base_path: impl Into<PathBuf>, json: &str) -> Result<Self> {
        let mut config: DeploymentConfig = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Malformed config: {e}")))?;
        config.base_path = base_path.into();
        Ok(config)
    }

    /// Directory every relative path in the config resolves against
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn resolve(&self, relative: &str) -> PathBuf {
        self.base_path.join(relative)
    }

    /// Version string, read from `version_path` on first access
    ///
    /// Surrounding whitespace (usually a trailing newline) is trimmed.
    pub async fn version(&self) -> Result<&str> {
        let version = self
            .version
            .get_or_try_init(|| async {
                let path = self.resolve(&self.version_path);
                tokio::fs::read_to_string(&path)
                    .await
                    .map(|v| v.trim().to_string())
                    .map_err(|e| {
                        Error::io(format!("Failed to read version file {}: {e}", path.display()))
                    })
            })
            .await?;
        Ok(version.as_str())
    }

    /// Raw changelog text, read from `changelog_path` on first access
    pub async fn changelog(&self) -> Result<&str> {
        let changelog = self
            .changelog
            .get_or_try_init(|| async {
                let path = self.resolve(&self.changelog_path);
                tokio::fs::read_to_string(&path).await.map_err(|e| {
                    Error::io(format!("Failed to read changelog {}: {e}", path.display()))
                })
            })
            .await?;
        Ok(changelog.as_str())
    }

    /// Artifact path with `%VERSION%` substituted
    pub async fn artifact_path(&self) -> Result<PathBuf> {
        let version = self.version().await?;
        Ok(self.resolve(&self.plugin_jar_path.replace(VERSION_PLACEHOLDER, version)))
    }

    /// File name of the resolved artifact, as sent to the platforms
    pub async fn artifact_file_name(&self) -> Result<String> {
        let path = self.artifact_path().await?;
        path.file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| Error::io(format!("Invalid artifact path: {}", path.display())))
    }

    /// Artifact bytes, read from the resolved artifact path on first access
    pub async fn plugin_artifact(&self) -> Result<&[u8]> {
        let path = self.artifact_path().await?;
        let data = self
            .plugin_artifact
            .get_or_try_init(|| async {
                tokio::fs::read(&path).await.map_err(|e| {
                    Error::io(format!("Failed to read artifact {}: {e}", path.display()))
                })
            })
            .await?;
        Ok(data.as_slice())
    }
}
