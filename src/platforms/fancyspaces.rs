//! FancySpaces adapter
//!
//! Two steps: create the version record from JSON, then upload the artifact as
//! the raw request body to a per-version file endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::debug;

use crate::config::{DeploymentConfig, FancySpacesConfig};
use crate::context::CommitContext;
use crate::error::Result;

use super::client::{ApiAuth, PlatformClient};
use super::platform_trait::{Platform, PlatformKind};

const DEFAULT_BASE_URL: &str = "https://fancyspaces.net/api/v1";

#[derive(Debug, Serialize)]
struct CreateVersionRequest<'a> {
    name: &'a str,
    platform: &'a str,
    channel: &'a str,
    changelog: String,
    supported_platform_versions: &'a [String],
}

pub struct FancySpacesPlatform {
    client: PlatformClient,
    commit: Arc<CommitContext>,
}

impl FancySpacesPlatform {
    pub fn new(api_key: &str, commit: Arc<CommitContext>) -> Result<Self> {
        Self::with_base_url(api_key, commit, DEFAULT_BASE_URL)
    }

    /// Target a different API root, e.g. a staging instance
    pub fn with_base_url(api_key: &str, commit: Arc<CommitContext>, base_url: &str) -> Result<Self> {
        let client = PlatformClient::new(base_url)?
            .with_auth(ApiAuth::Authorization(api_key.to_string()));
        Ok(Self { client, commit })
    }

    async fn create_version(&self, config: &DeploymentConfig, fs: &FancySpacesConfig) -> Result<()> {
        let version = config.version().await?;
        let changelog = self.commit.render_changelog(config.changelog().await?);

        let request = CreateVersionRequest {
            name: version,
            platform: &fs.platform,
            channel: &fs.channel,
            changelog,
            supported_platform_versions: &fs.supported_versions,
        };

        let endpoint = format!("/spaces/{}/versions", fs.space_id);
        let response = self.client.post_json(&endpoint, &request).await?;
        self.client.expect_status(response, StatusCode::CREATED).await?;
        Ok(())
    }

    async fn upload_file(&self, config: &DeploymentConfig, fs: &FancySpacesConfig) -> Result<()> {
        let version = config.version().await?;
        let file_name = config.artifact_file_name().await?;
        let data = config.plugin_artifact().await?.to_vec();
        debug!(file = %file_name, bytes = data.len(), "uploading artifact to FancySpaces");

        let endpoint = format!("/spaces/{}/versions/{version}/files/{file_name}", fs.space_id);
        let response = self.client.post_bytes(&endpoint, data).await?;
        self.client.expect_status(response, StatusCode::CREATED).await?;
        Ok(())
    }
}

#[async_trait]
impl Platform for FancySpacesPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::FancySpaces
    }

    async fn deploy(&self, config: &DeploymentConfig) -> Result<()> {
        let fs = config
            .fancyspaces
            .as_ref()
            .ok_or_else(|| super::missing_block(self.kind()))?;

        self.create_version(config, fs)
            .await
            .map_err(|e| e.context("failed to create version"))?;
        self.upload_file(config, fs)
            .await
            .map_err(|e| e.context("failed to upload file"))?;

        Ok(())
    }
}
