//! Modtale adapter

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{multipart, StatusCode};

use crate::config::{DeploymentConfig, ModtaleConfig};
use crate::context::CommitContext;
use crate::error::Result;

use super::client::{artifact_part, ApiAuth, PlatformClient};
use super::platform_trait::{Platform, PlatformKind};

const DEFAULT_BASE_URL: &str = "https://modtale.net/api/v1";

pub struct ModtalePlatform {
    client: PlatformClient,
    commit: Arc<CommitContext>,
}

impl ModtalePlatform {
    pub fn new(api_key: &str, commit: Arc<CommitContext>) -> Result<Self> {
        Self::with_base_url(api_key, commit, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: &str, commit: Arc<CommitContext>, base_url: &str) -> Result<Self> {
        let client = PlatformClient::new(base_url)?
            .with_auth(ApiAuth::Header("X-Api-Key", api_key.to_string()));
        Ok(Self { client, commit })
    }

    async fn publish(&self, config: &DeploymentConfig, modtale: &ModtaleConfig) -> Result<()> {
        // Modtale takes the game versions as one comma separated field
        let form = multipart::Form::new()
            .text("versionNumber", config.version().await?.to_string())
            .text("gameVersions", modtale.game_versions.join(","))
            .text("changelog", self.commit.render_changelog(config.changelog().await?))
            .part("file", artifact_part(config).await?);

        let endpoint = format!("/publish/{}", modtale.project_id);
        let response = self.client.post_multipart(&endpoint, form).await?;
        self.client.expect_status(response, StatusCode::OK).await?;
        Ok(())
    }
}

#[async_trait]
impl Platform for ModtalePlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Modtale
    }

    async fn deploy(&self, config: &DeploymentConfig) -> Result<()> {
        let modtale = config
            .modtale
            .as_ref()
            .ok_or_else(|| super::missing_block(self.kind()))?;

        self.publish(config, modtale)
            .await
            .map_err(|e| e.context("failed to publish version"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::platforms::test_support::{body_text, commit, project, requests};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BLOCK: &str = r#""modtale": {
        "project_id": "mt-5",
        "game_versions": ["2026.01", "2026.02"]
    }"#;

    #[tokio::test]
    async fn test_deploy_publishes_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/publish/mt-5"))
            .and(header("x-api-key", "mt-key"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let (_dir, config) = project(BLOCK);
        let platform = ModtalePlatform::with_base_url("mt-key", commit(), &server.uri()).unwrap();
        platform.deploy(&config).await.unwrap();

        let body = body_text(&requests(&server).await[0]);
        assert!(body.contains("name=\"versionNumber\"\r\n\r\n1.2.3\r\n"));
        assert!(body.contains("name=\"gameVersions\"\r\n\r\n2026.01,2026.02\r\n"));
        assert!(body.contains("Fixed 9f2c1e7 bug (Bump dependencies)"));
        assert!(body.contains(r#"name="file"; filename="widget-1.2.3.jar""#));
    }

    #[tokio::test]
    async fn test_unexpected_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("not a project member"))
            .mount(&server)
            .await;

        let (_dir, config) = project(BLOCK);
        let platform = ModtalePlatform::with_base_url("mt-key", commit(), &server.uri()).unwrap();
        let err = platform.deploy(&config).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::Http);
        assert_eq!(err.http_status(), Some(403));
        assert!(err.message.starts_with("failed to publish version: "));
    }

    #[tokio::test]
    async fn test_missing_artifact_names_the_step() {
        let server = MockServer::start().await;
        let (dir, config) = project(BLOCK);
        std::fs::remove_dir_all(dir.path().join("build")).unwrap();

        let platform = ModtalePlatform::with_base_url("mt-key", commit(), &server.uri()).unwrap();
        let err = platform.deploy(&config).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::Io);
        assert!(err.message.starts_with("failed to publish version: "));
        assert!(requests(&server).await.is_empty());
    }
}
