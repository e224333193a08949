//! Publish one built artifact to every configured hosting platform.
//!
//! A [`DeploymentConfig`] names the artifact, its version and changelog files,
//! and carries one optional block per platform. The [`Orchestrator`] deploys
//! to each platform with a block, then posts a summary to a Discord webhook.

pub mod config;
pub mod context;
pub mod deploy;
pub mod error;
pub mod notifier;
pub mod platforms;

// Re-exports for convenience
pub use config::DeploymentConfig;
pub use context::CommitContext;
pub use deploy::{ApiKeys, DeployPlan, DeployReport, Orchestrator};
pub use error::{Error, ErrorCode, Result};
pub use notifier::DiscordNotifier;
pub use platforms::{build_platform, Platform, PlatformKind};

pub const VERSION_STRING: &str = concat!(env!("CARGO_PKG_VERSION"), " (verteiler)");
