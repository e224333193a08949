//! Discord webhook notification sent after a deployment run

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::DeploymentConfig;
use crate::context::CommitContext;
use crate::error::{Error, ErrorCode, Result};
use crate::platforms::USER_AGENT;

const SUCCESS_COLOR: u32 = 0x00FF00;

#[derive(Debug, Serialize)]
struct WebhookMessage {
    content: String,
    embeds: Vec<Embed>,
}

#[derive(Debug, Serialize)]
struct Embed {
    title: String,
    description: String,
    color: u32,
    timestamp: String,
}

pub struct DiscordNotifier {
    http_client: Client,
    commit: Arc<CommitContext>,
}

impl DiscordNotifier {
    pub fn new(commit: Arc<CommitContext>) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::network(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { http_client, commit })
    }

    /// Markdown body of the embed: version, channel, commit and one link per platform
    pub async fn build_description(&self, config: &DeploymentConfig) -> Result<String> {
        let version = config.version().await?;
        let mut desc = format!("**Version:** {version}");

        let channel = config
            .fancyspaces
            .as_ref()
            .map(|fs| fs.channel.as_str())
            .or_else(|| config.modrinth.as_ref().map(|mr| mr.channel.as_str()));
        if let Some(channel) = channel {
            desc.push_str(&format!("\n**Channel:** {channel}"));
        }

        desc.push_str(&format!(
            "\n**Commit ([{}]({})):** {}\n",
            self.commit.sha(),
            self.commit.commit_url(),
            self.commit.message()
        ));

        for (name, url) in platform_links(config, version) {
            desc.push_str(&format!("\n**{name}:** [click here]({url})"));
        }
        Ok(desc)
    }

    /// Post the success embed to `webhook_url`. Any non-2xx answer is a
    /// `Notify` error carrying the status and body.
    pub async fn send_success_message(&self, webhook_url: &str, config: &DeploymentConfig) -> Result<()> {
        let message = WebhookMessage {
            content: "Plugin deployment completed!".to_string(),
            embeds: vec![Embed {
                title: format!("New version of {} deployed!", config.project_name),
                description: self.build_description(config).await?,
                color: SUCCESS_COLOR,
                timestamp: Utc::now().to_rfc3339(),
            }],
        };

        let response = self
            .http_client
            .post(webhook_url)
            .json(&message)
            .send()
            .await
            .map_err(|e| Error::new(ErrorCode::Notify, format!("Failed to reach webhook: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), body = %body, "Discord webhook rejected message");
            return Err(Error::new(
                ErrorCode::Notify,
                format!("failed to send Discord message, status code: {}", status.as_u16()),
            )
            .with_http_status(status.as_u16())
            .with_body(body));
        }

        info!(project = %config.project_name, "sent Discord success message");
        Ok(())
    }
}

/// Public page of the new version on every configured platform
fn platform_links(config: &DeploymentConfig, version: &str) -> Vec<(&'static str, String)> {
    let mut links = Vec::new();
    if let Some(fs) = &config.fancyspaces {
        links.push((
            "FancySpaces",
            format!("https://fancyspaces.net/spaces/{}/versions/{version}", fs.space_id),
        ));
    }
    if let Some(mr) = &config.modrinth {
        links.push((
            "Modrinth",
            format!("https://modrinth.com/plugin/{}/version/{version}", mr.project_id),
        ));
    }
    if let Some(hangar) = &config.hangar {
        links.push((
            "Hangar",
            format!(
                "https://hangar.papermc.io/{}/{}/versions/{version}",
                hangar.author, hangar.project_id
            ),
        ));
    }
    if let Some(orbis) = &config.orbis {
        links.push(("Orbis", format!("https://orbis.place/resources/{}", orbis.resource_id)));
    }
    if let Some(mt) = &config.modtale {
        links.push(("Modtale", format!("https://modtale.net/mod/{}", mt.project_id)));
    }
    if let Some(cf) = &config.curseforge {
        links.push((
            "CurseForge",
            format!("https://www.curseforge.com/projects/{}", cf.project_id),
        ));
    }
    if let Some(uh) = &config.unifiedhytale {
        links.push((
            "UnifiedHytale",
            format!("https://unifiedhytale.com/projects/{}", uh.project_id),
        ));
    }
    if let Some(hh) = &config.hytahub {
        links.push(("Hytahub", format!("https://hytahub.com/mods/{}", hh.slug)));
    }
    links
}
