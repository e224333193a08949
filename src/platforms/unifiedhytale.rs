//! UnifiedHytale adapter
//!
//! Version metadata and the file travel in one multipart request. Game
//! versions are sent as a JSON array field.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{multipart, StatusCode};

use crate::config::{DeploymentConfig, UnifiedHytaleConfig};
use crate::context::CommitContext;
use crate::error::Result;

use super::client::{artifact_part, json_field, ApiAuth, PlatformClient};
use super::platform_trait::{Platform, PlatformKind};

const DEFAULT_BASE_URL: &str = "https://api.unifiedhytale.com/v1";

pub struct UnifiedHytalePlatform {
    client: PlatformClient,
    commit: Arc<CommitContext>,
}

impl UnifiedHytalePlatform {
    pub fn new(api_key: &str, commit: Arc<CommitContext>) -> Result<Self> {
        Self::with_base_url(api_key, commit, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: &str, commit: Arc<CommitContext>, base_url: &str) -> Result<Self> {
        let client = PlatformClient::new(base_url)?.with_auth(ApiAuth::Bearer(api_key.to_string()));
        Ok(Self { client, commit })
    }

    async fn create_version(&self, config: &DeploymentConfig, uh: &UnifiedHytaleConfig) -> Result<()> {
        let form = multipart::Form::new()
            .text("version_number", config.version().await?.to_string())
            .text("changelog", self.commit.render_changelog(config.changelog().await?))
            .text("release_channel", uh.release_channel.clone())
            .text("game_versions", json_field(&uh.game_versions)?)
            .part("file", artifact_part(config).await?);

        let endpoint = format!("/projects/{}/versions", uh.project_id);
        let response = self.client.post_multipart(&endpoint, form).await?;
        self.client.expect_status(response, StatusCode::CREATED).await?;
        Ok(())
    }
}

#[async_trait]
impl Platform for UnifiedHytalePlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::UnifiedHytale
    }

    async fn deploy(&self, config: &DeploymentConfig) -> Result<()> {
        let uh = config
            .unifiedhytale
            .as_ref()
            .ok_or_else(|| super::missing_block(self.kind()))?;

        self.create_version(config, uh)
            .await
            .map_err(|e| e.context("failed to create version"))
    }
}
