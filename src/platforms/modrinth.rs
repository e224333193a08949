//! Modrinth adapter
//!
//! Modrinth creates the version and takes the file in one multipart request:
//! a `data` part with the version JSON and one file part it names.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{multipart, StatusCode};
use serde::Serialize;

use crate::config::{DeploymentConfig, ModrinthConfig};
use crate::context::CommitContext;
use crate::error::Result;

use super::client::{artifact_part, json_field, ApiAuth, PlatformClient};
use super::platform_trait::{Platform, PlatformKind};

const DEFAULT_BASE_URL: &str = "https://api.modrinth.com/v2";

/// Name of the multipart part carrying the artifact
const FILE_PART: &str = "pluginFile";

#[derive(Debug, Serialize)]
struct CreateVersionRequest<'a> {
    name: &'a str,
    version_number: &'a str,
    changelog: String,
    dependencies: Vec<serde_json::Value>,
    game_versions: &'a [String],
    version_type: &'a str,
    loaders: &'a [String],
    featured: bool,
    status: &'static str,
    project_id: &'a str,
    file_parts: [&'static str; 1],
    primary_file: &'static str,
}

pub struct ModrinthPlatform {
    client: PlatformClient,
    commit: Arc<CommitContext>,
}

impl ModrinthPlatform {
    pub fn new(api_key: &str, commit: Arc<CommitContext>) -> Result<Self> {
        Self::with_base_url(api_key, commit, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: &str, commit: Arc<CommitContext>, base_url: &str) -> Result<Self> {
        let client = PlatformClient::new(base_url)?
            .with_auth(ApiAuth::Authorization(api_key.to_string()));
        Ok(Self { client, commit })
    }

    async fn version_data(&self, config: &DeploymentConfig, modrinth: &ModrinthConfig) -> Result<String> {
        let version = config.version().await?;

        let request = CreateVersionRequest {
            name: version,
            version_number: version,
            changelog: self.commit.render_changelog(config.changelog().await?),
            dependencies: Vec::new(),
            game_versions: &modrinth.supported_versions,
            version_type: &modrinth.channel,
            loaders: &modrinth.loaders,
            featured: modrinth.featured,
            status: "listed",
            project_id: &modrinth.project_id,
            file_parts: [FILE_PART],
            primary_file: FILE_PART,
        };
        json_field(&request)
    }

    async fn create_version(&self, config: &DeploymentConfig, modrinth: &ModrinthConfig) -> Result<()> {
        let form = multipart::Form::new()
            .text("data", self.version_data(config, modrinth).await?)
            .part(FILE_PART, artifact_part(config).await?);

        let response = self.client.post_multipart("/version", form).await?;
        self.client.expect_status(response, StatusCode::OK).await?;
        Ok(())
    }
}

#[async_trait]
impl Platform for ModrinthPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Modrinth
    }

    async fn deploy(&self, config: &DeploymentConfig) -> Result<()> {
        let modrinth = config
            .modrinth
            .as_ref()
            .ok_or_else(|| super::missing_block(self.kind()))?;

        self.create_version(config, modrinth)
            .await
            .map_err(|e| e.context("failed to create version"))
    }
}
