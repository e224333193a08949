//! Hangar (PaperMC) adapter
//!
//! Hangar does not accept the API key on uploads. The key is first exchanged
//! for a short-lived JWT, which then authorizes a multipart upload carrying the
//! `versionUpload` JSON and the artifact.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{multipart, Method, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{DeploymentConfig, HangarConfig, HangarServer};
use crate::context::CommitContext;
use crate::error::{Error, ErrorCode, Result};

use super::client::{artifact_part, json_field, ApiAuth, PlatformClient};
use super::platform_trait::{Platform, PlatformKind};

const DEFAULT_BASE_URL: &str = "https://hangar.papermc.io/api/v1";

#[derive(Debug, Deserialize)]
struct AuthenticateResponse {
    token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MultipartFileOrUrl {
    platforms: Vec<HangarServer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VersionUpload<'a> {
    version: &'a str,
    plugin_dependencies: HashMap<HangarServer, Vec<serde_json::Value>>,
    platform_dependencies: HashMap<HangarServer, &'a [String]>,
    description: String,
    files: Vec<MultipartFileOrUrl>,
    channel: &'a str,
}

fn auth_failure(mut e: Error) -> Error {
    e.code = ErrorCode::Auth;
    e.context("failed to authenticate")
}

pub struct HangarPlatform {
    client: PlatformClient,
    api_key: String,
    commit: Arc<CommitContext>,
}

impl HangarPlatform {
    pub fn new(api_key: &str, commit: Arc<CommitContext>) -> Result<Self> {
        Self::with_base_url(api_key, commit, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: &str, commit: Arc<CommitContext>, base_url: &str) -> Result<Self> {
        Ok(Self {
            client: PlatformClient::new(base_url)?,
            api_key: api_key.to_string(),
            commit,
        })
    }

    /// Exchange the API key for a session JWT
    pub async fn authenticate(&self) -> Result<String> {
        let request = self
            .client
            .request(Method::POST, "/authenticate")
            .await
            .query(&[("apiKey", self.api_key.as_str())]);

        let response = self.client.send(request).await.map_err(auth_failure)?;
        let auth: AuthenticateResponse = self
            .client
            .handle_response(response, StatusCode::OK)
            .await
            .map_err(auth_failure)?;

        if auth.token.is_empty() {
            return Err(Error::new(ErrorCode::Auth, "Hangar returned an empty session token"));
        }
        Ok(auth.token)
    }

    async fn version_upload(&self, config: &DeploymentConfig, hangar: &HangarConfig) -> Result<String> {
        let request = VersionUpload {
            version: config.version().await?,
            plugin_dependencies: HashMap::from([(hangar.platform, Vec::new())]),
            platform_dependencies: HashMap::from([(hangar.platform, hangar.supported_versions.as_slice())]),
            description: self.commit.render_changelog(config.changelog().await?),
            files: vec![MultipartFileOrUrl {
                platforms: vec![hangar.platform],
                external_url: None,
            }],
            channel: &hangar.channel,
        };
        json_field(&request)
    }

    async fn upload(&self, config: &DeploymentConfig, hangar: &HangarConfig) -> Result<()> {
        let version_upload = multipart::Part::text(self.version_upload(config, hangar).await?)
            .mime_str("application/json")
            .map_err(|e| Error::new(ErrorCode::Serialization, format!("Invalid MIME type: {e}")))?;
        let form = multipart::Form::new()
            .part("versionUpload", version_upload)
            .part("files", artifact_part(config).await?);

        let endpoint = format!("/projects/{}/upload", hangar.project_id);
        let response = self.client.post_multipart(&endpoint, form).await?;
        self.client.expect_status(response, StatusCode::OK).await?;
        Ok(())
    }
}

#[async_trait]
impl Platform for HangarPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Hangar
    }

    async fn deploy(&self, config: &DeploymentConfig) -> Result<()> {
        let hangar = config
            .hangar
            .as_ref()
            .ok_or_else(|| super::missing_block(self.kind()))?;

        let jwt = self.authenticate().await?;
        debug!("obtained Hangar session token");
        self.client.set_auth(ApiAuth::Authorization(format!("HangarAuth {jwt}"))).await;

        self.upload(config, hangar)
            .await
            .map_err(|e| e.context("failed to upload version"))
    }
}
