//! Deployment orchestration
//!
//! Every platform with a block in the config is deployed to in turn. A failed
//! platform is recorded and the run moves on to the next one. The webhook
//! notification goes out last, whatever the individual outcomes were.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::DeploymentConfig;
use crate::context::CommitContext;
use crate::error::{Error, Result};
use crate::notifier::DiscordNotifier;
use crate::platforms::{build_platform, Platform, PlatformKind};

/// API keys by platform
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    keys: HashMap<PlatformKind, String>,
}

impl ApiKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `FV_<PLATFORM>_API_KEY` for every platform
    pub fn from_env() -> Self {
        let mut keys = Self::new();
        for kind in PlatformKind::ALL {
            if let Ok(key) = std::env::var(kind.api_key_env()) {
                keys.insert(kind, key);
            }
        }
        keys
    }

    pub fn insert(&mut self, kind: PlatformKind, key: impl Into<String>) {
        self.keys.insert(kind, key.into());
    }

    /// Key for `kind`, `None` when absent or blank
    pub fn get(&self, kind: PlatformKind) -> Option<&str> {
        self.keys
            .get(&kind)
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
    }
}

/// Adapters ready to run plus the enabled platforms that could not be set up
#[derive(Default)]
pub struct DeployPlan {
    pub platforms: Vec<Box<dyn Platform>>,
    pub unresolved: Vec<(PlatformKind, Error)>,
}

/// Outcome of one run
#[derive(Debug, Default)]
pub struct DeployReport {
    pub outcomes: Vec<(PlatformKind, Result<()>)>,
    /// `None` when no webhook was configured
    pub notification: Option<Result<()>>,
}

impl DeployReport {
    pub fn succeeded(&self) -> impl Iterator<Item = PlatformKind> + '_ {
        self.outcomes
            .iter()
            .filter(|(_, r)| r.is_ok())
            .map(|(kind, _)| *kind)
    }

    pub fn failed(&self) -> impl Iterator<Item = (PlatformKind, &Error)> + '_ {
        self.outcomes
            .iter()
            .filter_map(|(kind, r)| r.as_ref().err().map(|e| (*kind, e)))
    }

    /// True when every platform deployed
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|(_, r)| r.is_ok())
    }
}

pub struct Orchestrator {
    commit: Arc<CommitContext>,
    strict: bool,
    webhook_url: Option<String>,
}

impl Orchestrator {
    pub fn new(commit: Arc<CommitContext>, strict: bool) -> Self {
        Self {
            commit,
            strict,
            webhook_url: None,
        }
    }

    /// Notify this webhook after deploying; blank URLs are ignored
    pub fn with_webhook(mut self, webhook_url: Option<String>) -> Self {
        self.webhook_url = webhook_url.filter(|url| !url.trim().is_empty());
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Set up an adapter for every enabled platform.
    ///
    /// In strict mode a missing key fails the whole run here, before any
    /// request is made. Otherwise the platform is marked unresolved.
    pub fn resolve_platforms(&self, config: &DeploymentConfig, keys: &ApiKeys) -> Result<DeployPlan> {
        self.resolve_with(config, keys, build_platform)
    }

    pub(crate) fn resolve_with<F>(
        &self,
        config: &DeploymentConfig,
        keys: &ApiKeys,
        build: F,
    ) -> Result<DeployPlan>
    where
        F: Fn(PlatformKind, &str, Arc<CommitContext>) -> Result<Box<dyn Platform>>,
    {
        let mut plan = DeployPlan::default();
        for kind in PlatformKind::enabled(config) {
            let built = match keys.get(kind) {
                Some(key) => build(kind, key, self.commit.clone()),
                None => Err(Error::missing_input(format!(
                    "{} is required to deploy to {kind}",
                    kind.api_key_env()
                ))),
            };

            match built {
                Ok(platform) => plan.platforms.push(platform),
                Err(e) if self.strict => return Err(e),
                Err(e) => {
                    warn!(platform = %kind, error = %e, "skipping platform");
                    plan.unresolved.push((kind, e));
                }
            }
        }
        Ok(plan)
    }

    /// Deploy to every planned platform, one after another
    ///
    /// Outcomes, including unresolved platforms, are reported in deploy order.
    pub async fn deploy_all(&self, config: &DeploymentConfig, plan: DeployPlan) -> DeployReport {
        let mut report = DeployReport::default();
        report.outcomes.extend(plan.unresolved.into_iter().map(|(kind, e)| (kind, Err(e))));

        for platform in plan.platforms {
            let kind = platform.kind();
            info!(platform = %kind, project = %config.project_name, "deploying");
            let result = platform.deploy(config).await;
            match &result {
                Ok(()) => info!(platform = %kind, "deployed"),
                Err(e) => error!(
                    platform = %kind,
                    status = e.http_status().unwrap_or_default(),
                    error = %e,
                    "deploy failed"
                ),
            }
            report.outcomes.push((kind, result));
        }
        report.outcomes.sort_by_key(|(kind, _)| *kind);
        report
    }

    async fn notify(&self, config: &DeploymentConfig) -> Option<Result<()>> {
        let url = self.webhook_url.as_deref()?;
        let result = match DiscordNotifier::new(self.commit.clone()) {
            Ok(notifier) => notifier.send_success_message(url, config).await,
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            error!(error = %e, "failed to send Discord message");
        }
        Some(result)
    }

    /// Resolve, deploy, notify
    pub async fn run(&self, config: &DeploymentConfig, keys: &ApiKeys) -> Result<DeployReport> {
        let plan = self.resolve_platforms(config, keys)?;
        self.execute(config, plan).await
    }

    pub(crate) async fn execute(&self, config: &DeploymentConfig, plan: DeployPlan) -> Result<DeployReport> {
        let mut report = self.deploy_all(config, plan).await;
        report.notification = self.notify(config).await;

        let failed = report.failed().count();
        if failed == 0 {
            info!(platforms = report.outcomes.len(), "deployment finished");
        } else {
            warn!(failed, platforms = report.outcomes.len(), "deployment finished with failures");
        }
        Ok(report)
    }
}
