//! CurseForge adapter
//!
//! One multipart upload: a `metadata` JSON part describing the file and the
//! artifact itself. Game versions are resolved to numeric ids before anything
//! is sent, so an unmapped version never reaches the network.

mod versions;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{multipart, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{CurseForgeConfig, CurseForgeRelation, DeploymentConfig};
use crate::context::CommitContext;
use crate::error::Result;

use super::client::{artifact_part, json_field, ApiAuth, PlatformClient};
use super::platform_trait::{Platform, PlatformKind};

pub use versions::{loader_id, resolve_game_versions, version_id, PLUGIN_LOADER_ID};

const DEFAULT_BASE_URL: &str = "https://minecraft.curseforge.com/api";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadMetadata<'a> {
    changelog: String,
    changelog_type: &'static str,
    display_name: &'a str,
    game_versions: Vec<u32>,
    release_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    relations: Option<Relations<'a>>,
}

#[derive(Debug, Serialize)]
struct Relations<'a> {
    projects: &'a [CurseForgeRelation],
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: u64,
}

pub struct CurseForgePlatform {
    client: PlatformClient,
    commit: Arc<CommitContext>,
}

impl CurseForgePlatform {
    pub fn new(api_key: &str, commit: Arc<CommitContext>) -> Result<Self> {
        Self::with_base_url(api_key, commit, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: &str, commit: Arc<CommitContext>, base_url: &str) -> Result<Self> {
        let client = PlatformClient::new(base_url)?
            .with_auth(ApiAuth::Header("X-Api-Token", api_key.to_string()));
        Ok(Self { client, commit })
    }

    async fn metadata(&self, config: &DeploymentConfig, cf: &CurseForgeConfig) -> Result<String> {
        let game_versions = resolve_game_versions(cf)?;
        // empty relation lists are left out entirely
        let relations = cf
            .relations
            .as_ref()
            .filter(|r| !r.projects.is_empty())
            .map(|r| Relations { projects: &r.projects });

        let metadata = UploadMetadata {
            changelog: self.commit.render_changelog(config.changelog().await?),
            changelog_type: "markdown",
            display_name: config.version().await?,
            game_versions,
            release_type: &cf.release_type,
            relations,
        };
        json_field(&metadata)
    }

    async fn upload_file(&self, config: &DeploymentConfig, cf: &CurseForgeConfig) -> Result<u64> {
        let form = multipart::Form::new()
            .text("metadata", self.metadata(config, cf).await?)
            .part("file", artifact_part(config).await?);

        let endpoint = format!("/projects/{}/upload-file", cf.project_id);
        let response = self.client.post_multipart(&endpoint, form).await?;
        let uploaded: UploadResponse = self.client.handle_response(response, StatusCode::OK).await?;
        Ok(uploaded.id)
    }
}

#[async_trait]
impl Platform for CurseForgePlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::CurseForge
    }

    async fn deploy(&self, config: &DeploymentConfig) -> Result<()> {
        let cf = config
            .curseforge
            .as_ref()
            .ok_or_else(|| super::missing_block(self.kind()))?;

        let file_id = self
            .upload_file(config, cf)
            .await
            .map_err(|e| e.context("failed to upload file"))?;
        debug!(file_id, "CurseForge accepted file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::platforms::test_support::{body_text, commit, project, requests};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn accepting_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/123456/upload-file"))
            .and(header("x-api-token", "cf-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 5551234})))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_plugin_upload_metadata() {
        let server = accepting_server().await;
        let (_dir, config) = project(
            r#""curseforge": {
                "project_id": "123456",
                "game_versions": ["1.21", 9990],
                "release_type": "beta",
                "relations": {"projects": [{"slug": "vault", "type": "requiredDependency"}]}
            }"#,
        );
        let platform = CurseForgePlatform::with_base_url("cf-key", commit(), &server.uri()).unwrap();
        platform.deploy(&config).await.unwrap();

        let requests = requests(&server).await;
        assert_eq!(requests.len(), 1);
        let body = body_text(&requests[0]);
        assert!(body.contains(r#""changelogType":"markdown""#));
        assert!(body.contains(r#""displayName":"1.2.3""#));
        assert!(body.contains(&format!(r#""gameVersions":[{PLUGIN_LOADER_ID},10407,9990]"#)));
        assert!(body.contains(r#""releaseType":"beta""#));
        assert!(body.contains(r#""relations":{"projects":[{"slug":"vault","type":"requiredDependency"}]}"#));
        assert!(body.contains(r#"name="file"; filename="widget-1.2.3.jar""#));
    }

    #[tokio::test]
    async fn test_empty_relations_are_omitted() {
        let server = accepting_server().await;
        let (_dir, config) = project(
            r#""curseforge": {
                "project_id": "123456",
                "game_versions": ["1.20.4"],
                "release_type": "release",
                "type": "mod",
                "loader": "fabric",
                "relations": {"projects": []}
            }"#,
        );
        let platform = CurseForgePlatform::with_base_url("cf-key", commit(), &server.uri()).unwrap();
        platform.deploy(&config).await.unwrap();

        let body = body_text(&requests(&server).await[0]);
        assert!(body.contains(r#""gameVersions":[7499,9971]"#));
        assert!(!body.contains("relations"));
    }

    #[tokio::test]
    async fn test_unknown_version_sends_nothing() {
        let server = accepting_server().await;
        let (_dir, config) = project(
            r#""curseforge": {"project_id": "123456", "game_versions": ["2.0"], "release_type": "release"}"#,
        );
        let platform = CurseForgePlatform::with_base_url("cf-key", commit(), &server.uri()).unwrap();
        let err = platform.deploy(&config).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::UnknownVersion);
        assert!(err.message.starts_with("failed to upload file: "));
        assert!(requests(&server).await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_loader_sends_nothing() {
        let server = accepting_server().await;
        let (_dir, config) = project(
            r#""curseforge": {"project_id": "123456", "game_versions": [], "release_type": "release",
                "type": "mod", "loader": "rift"}"#,
        );
        let platform = CurseForgePlatform::with_base_url("cf-key", commit(), &server.uri()).unwrap();
        let err = platform.deploy(&config).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::UnknownLoader);
        assert!(requests(&server).await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_host_names_the_step() {
        let (_dir, config) = project(
            r#""curseforge": {"project_id": "123456", "game_versions": ["1.21"], "release_type": "release"}"#,
        );
        let platform = CurseForgePlatform::with_base_url("cf-key", commit(), "http://127.0.0.1:1/api").unwrap();
        let err = platform.deploy(&config).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::Network);
        assert!(err.message.starts_with("failed to upload file: Request failed"));
    }
}
