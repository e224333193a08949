//! Hytahub adapter

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{multipart, StatusCode};

use crate::config::{DeploymentConfig, HytahubConfig};
use crate::context::CommitContext;
use crate::error::Result;

use super::client::{artifact_part, ApiAuth, PlatformClient};
use super::platform_trait::{Platform, PlatformKind};

const DEFAULT_BASE_URL: &str = "https://hytahubbackend-production.up.railway.app/api";

pub struct HytahubPlatform {
    client: PlatformClient,
    commit: Arc<CommitContext>,
}

impl HytahubPlatform {
    pub fn new(api_key: &str, commit: Arc<CommitContext>) -> Result<Self> {
        Self::with_base_url(api_key, commit, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: &str, commit: Arc<CommitContext>, base_url: &str) -> Result<Self> {
        let client = PlatformClient::new(base_url)?
            .with_auth(ApiAuth::Header("X-API-Token", api_key.to_string()));
        Ok(Self { client, commit })
    }

    async fn create_version(&self, config: &DeploymentConfig, hytahub: &HytahubConfig) -> Result<()> {
        let form = multipart::Form::new()
            .text("version_number", config.version().await?.to_string())
            .text("changelog", self.commit.render_changelog(config.changelog().await?))
            .text("channel", hytahub.channel.clone())
            .part("main_file", artifact_part(config).await?);

        // trailing slash is part of the route
        let endpoint = format!("/mods/{}/versions/", hytahub.slug);
        let response = self.client.post_multipart(&endpoint, form).await?;
        self.client.expect_status(response, StatusCode::CREATED).await?;
        Ok(())
    }
}

#[async_trait]
impl Platform for HytahubPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Hytahub
    }

    async fn deploy(&self, config: &DeploymentConfig) -> Result<()> {
        let hytahub = config
            .hytahub
            .as_ref()
            .ok_or_else(|| super::missing_block(self.kind()))?;

        self.create_version(config, hytahub)
            .await
            .map_err(|e| e.context("failed to create version"))
    }
}
