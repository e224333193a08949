//! Orbis adapter
//!
//! The longest sequence of the supported platforms:
//! create version, set changelog, upload file, mark it primary, submit for
//! review. The version id from the first step and the file id from the upload
//! feed the later steps.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{multipart, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{DeploymentConfig, OrbisConfig};
use crate::context::CommitContext;
use crate::error::Result;

use super::client::{artifact_part, ApiAuth, PlatformClient};
use super::platform_trait::{Platform, PlatformKind};

const DEFAULT_BASE_URL: &str = "https://api.orbis.place";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateVersionRequest<'a> {
    version_number: &'a str,
    name: &'a str,
    channel: &'a str,
    compatible_hytale_version_ids: &'a [String],
}

#[derive(Debug, Serialize)]
struct UpdateChangelogRequest {
    changelog: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SetPrimaryFileRequest<'a> {
    file_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: Identified,
}

#[derive(Debug, Deserialize)]
struct UploadFileResponse {
    file: Identified,
}

#[derive(Debug, Deserialize)]
struct Identified {
    id: String,
}

pub struct OrbisPlatform {
    client: PlatformClient,
    commit: Arc<CommitContext>,
}

impl OrbisPlatform {
    pub fn new(api_key: &str, commit: Arc<CommitContext>) -> Result<Self> {
        Self::with_base_url(api_key, commit, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: &str, commit: Arc<CommitContext>, base_url: &str) -> Result<Self> {
        let client = PlatformClient::new(base_url)?
            .with_auth(ApiAuth::Header("x-api-key", api_key.to_string()));
        Ok(Self { client, commit })
    }

    async fn create_version(&self, config: &DeploymentConfig, orbis: &OrbisConfig) -> Result<String> {
        let version = config.version().await?;
        let request = CreateVersionRequest {
            version_number: version,
            name: version,
            channel: &orbis.channel,
            compatible_hytale_version_ids: &orbis.compatible_hytale_version_ids,
        };

        let endpoint = format!("/resources/{}/versions", orbis.resource_id);
        let response = self.client.post_json(&endpoint, &request).await?;
        let created: VersionResponse = self
            .client
            .handle_response(response, StatusCode::CREATED)
            .await?;
        Ok(created.version.id)
    }

    async fn update_changelog(
        &self,
        config: &DeploymentConfig,
        orbis: &OrbisConfig,
        version_id: &str,
    ) -> Result<()> {
        let request = UpdateChangelogRequest {
            changelog: self.commit.render_changelog(config.changelog().await?),
        };

        let endpoint = format!("/resources/{}/versions/{version_id}/changelog", orbis.resource_id);
        let response = self.client.patch_json(&endpoint, &request).await?;
        self.client.expect_status(response, StatusCode::OK).await?;
        Ok(())
    }

    async fn upload_file(
        &self,
        config: &DeploymentConfig,
        orbis: &OrbisConfig,
        version_id: &str,
    ) -> Result<String> {
        let form = multipart::Form::new().part("file", artifact_part(config).await?);

        let endpoint = format!("/resources/{}/versions/{version_id}/files", orbis.resource_id);
        let response = self.client.post_multipart(&endpoint, form).await?;
        let uploaded: UploadFileResponse = self.client.handle_response(response, StatusCode::OK).await?;
        Ok(uploaded.file.id)
    }

    async fn set_primary_file(&self, orbis: &OrbisConfig, version_id: &str, file_id: &str) -> Result<()> {
        let endpoint = format!(
            "/resources/{}/versions/{version_id}/files/primary",
            orbis.resource_id
        );
        let response = self
            .client
            .patch_json(&endpoint, &SetPrimaryFileRequest { file_id })
            .await?;
        self.client.expect_status(response, StatusCode::CREATED).await?;
        Ok(())
    }

    async fn submit_for_review(&self, orbis: &OrbisConfig, version_id: &str) -> Result<()> {
        let endpoint = format!("/resources/{}/versions/{version_id}/submit", orbis.resource_id);
        let response = self.client.post_empty(&endpoint).await?;
        self.client.expect_status(response, StatusCode::CREATED).await?;
        Ok(())
    }
}

#[async_trait]
impl Platform for OrbisPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Orbis
    }

    async fn deploy(&self, config: &DeploymentConfig) -> Result<()> {
        let orbis = config
            .orbis
            .as_ref()
            .ok_or_else(|| super::missing_block(self.kind()))?;

        let version_id = self
            .create_version(config, orbis)
            .await
            .map_err(|e| e.context("failed to create version"))?;
        debug!(version_id = %version_id, "created Orbis version");

        self.update_changelog(config, orbis, &version_id)
            .await
            .map_err(|e| e.context("failed to update changelog"))?;

        let file_id = self
            .upload_file(config, orbis, &version_id)
            .await
            .map_err(|e| e.context("failed to upload file"))?;

        self.set_primary_file(orbis, &version_id, &file_id)
            .await
            .map_err(|e| e.context("failed to set primary file"))?;

        self.submit_for_review(orbis, &version_id)
            .await
            .map_err(|e| e.context("failed to submit for review"))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::platforms::test_support::{commit, project, requests};
    use wiremock::matchers::{body_json, body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BLOCK: &str = r#""orbis": {
        "resource_id": "res-42",
        "channel": "RELEASE",
        "compatible_hytale_version_ids": ["hv-1"]
    }"#;

    async fn mount_happy_path(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/resources/res-42/versions"))
            .and(header("x-api-key", "orbis-key"))
            .and(body_partial_json(serde_json::json!({
                "versionNumber": "1.2.3",
                "channel": "RELEASE",
                "compatibleHytaleVersionIds": ["hv-1"],
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({"version": {"id": "ver-7"}})),
            )
            .mount(server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/resources/res-42/versions/ver-7/changelog"))
            .and(body_json(serde_json::json!({
                "changelog": "Fixed 9f2c1e7 bug (Bump dependencies)"
            })))
            .respond_with(ResponseTemplate::new(200))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/resources/res-42/versions/ver-7/files"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"file": {"id": "file-9"}})),
            )
            .mount(server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/resources/res-42/versions/ver-7/files/primary"))
            .and(body_json(serde_json::json!({"fileId": "file-9"})))
            .respond_with(ResponseTemplate::new(201))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/resources/res-42/versions/ver-7/submit"))
            .respond_with(ResponseTemplate::new(201))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_deploy_runs_full_sequence() {
        let server = MockServer::start().await;
        mount_happy_path(&server).await;

        let (_dir, config) = project(BLOCK);
        let platform = OrbisPlatform::with_base_url("orbis-key", commit(), &server.uri()).unwrap();
        platform.deploy(&config).await.unwrap();

        let paths: Vec<String> = requests(&server)
            .await
            .iter()
            .map(|r| r.url.path().to_string())
            .collect();
        assert_eq!(
            paths,
            vec![
                "/resources/res-42/versions",
                "/resources/res-42/versions/ver-7/changelog",
                "/resources/res-42/versions/ver-7/files",
                "/resources/res-42/versions/ver-7/files/primary",
                "/resources/res-42/versions/ver-7/submit",
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_create_stops_before_upload_and_submit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/resources/res-42/versions"))
            .respond_with(ResponseTemplate::new(400).set_body_string("unknown channel"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/resources/res-42/versions/ver-7/files"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/resources/res-42/versions/ver-7/submit"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let (_dir, config) = project(BLOCK);
        let platform = OrbisPlatform::with_base_url("orbis-key", commit(), &server.uri()).unwrap();
        let err = platform.deploy(&config).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::Http);
        assert_eq!(err.http_status(), Some(400));
        assert_eq!(err.body(), Some("unknown channel"));
        assert!(err.message.starts_with("failed to create version"));
        assert_eq!(requests(&server).await.len(), 1);
    }

    #[tokio::test]
    async fn test_primary_file_expects_created() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/resources/res-42/versions/ver-7/files/primary"))
            .respond_with(ResponseTemplate::new(200))
            .with_priority(1)
            .mount(&server)
            .await;
        mount_happy_path(&server).await;

        let (_dir, config) = project(BLOCK);
        let platform = OrbisPlatform::with_base_url("orbis-key", commit(), &server.uri()).unwrap();
        let err = platform.deploy(&config).await.unwrap_err();

        assert_eq!(err.http_status(), Some(200));
        assert!(err.message.starts_with("failed to set primary file"));
    }

    #[tokio::test]
    async fn test_failed_primary_file_skips_submit() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/resources/res-42/versions/ver-7/files/primary"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such file"))
            .with_priority(1)
            .mount(&server)
            .await;
        mount_happy_path(&server).await;

        let (_dir, config) = project(BLOCK);
        let platform = OrbisPlatform::with_base_url("orbis-key", commit(), &server.uri()).unwrap();
        let err = platform.deploy(&config).await.unwrap_err();

        assert!(err.message.starts_with("failed to set primary file"));
        let submitted = requests(&server)
            .await
            .iter()
            .any(|r| r.url.path().ends_with("/submit"));
        assert!(!submitted);
    }
}
