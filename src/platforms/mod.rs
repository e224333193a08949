//! Platform adapters for the supported hosting services
//!
//! Each platform module provides an adapter that publishes one artifact version
//! through that service's upload API.

mod client;
mod platform_trait;

pub mod curseforge;
pub mod fancyspaces;
pub mod hangar;
pub mod hytahub;
pub mod modrinth;
pub mod modtale;
pub mod orbis;
pub mod unifiedhytale;

use std::sync::Arc;

use crate::context::CommitContext;
use crate::error::{Error, Result};

pub use client::{artifact_part, json_field, ApiAuth, PlatformClient, USER_AGENT};
pub use platform_trait::{Platform, PlatformKind};

pub use curseforge::CurseForgePlatform;
pub use fancyspaces::FancySpacesPlatform;
pub use hangar::HangarPlatform;
pub use hytahub::HytahubPlatform;
pub use modrinth::ModrinthPlatform;
pub use modtale::ModtalePlatform;
pub use orbis::OrbisPlatform;
pub use unifiedhytale::UnifiedHytalePlatform;

/// Error for an adapter invoked on a config without its block
pub(crate) fn missing_block(kind: PlatformKind) -> Error {
    Error::config(format!(
        "config has no \"{}\" block, {kind} is not enabled",
        kind.config_key()
    ))
}

/// Build the adapter for `kind` against its public API
pub fn build_platform(
    kind: PlatformKind,
    api_key: &str,
    commit: Arc<CommitContext>,
) -> Result<Box<dyn Platform>> {
    let platform: Box<dyn Platform> = match kind {
        PlatformKind::FancySpaces => Box::new(FancySpacesPlatform::new(api_key, commit)?),
        PlatformKind::Modrinth => Box::new(ModrinthPlatform::new(api_key, commit)?),
        PlatformKind::Hangar => Box::new(HangarPlatform::new(api_key, commit)?),
        PlatformKind::Orbis => Box::new(OrbisPlatform::new(api_key, commit)?),
        PlatformKind::Modtale => Box::new(ModtalePlatform::new(api_key, commit)?),
        PlatformKind::CurseForge => Box::new(CurseForgePlatform::new(api_key, commit)?),
        PlatformKind::UnifiedHytale => Box::new(UnifiedHytalePlatform::new(api_key, commit)?),
        PlatformKind::Hytahub => Box::new(HytahubPlatform::new(api_key, commit)?),
    };
    Ok(platform)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use tempfile::TempDir;
    use wiremock::{MockServer, Request};

    use crate::config::test_support::{config_json, write_project};
    use crate::config::DeploymentConfig;
    use crate::context::CommitContext;

    pub const SHA: &str = "9f2c1e7";

    pub fn commit() -> Arc<CommitContext> {
        Arc::new(CommitContext::new(
            "https://github.com/acme/widget",
            SHA,
            "Bump dependencies",
        ))
    }

    /// Project on disk at version 1.2.3 with the given platform blocks enabled
    pub fn project(platform_blocks: &str) -> (TempDir, DeploymentConfig) {
        let dir = tempfile::tempdir().unwrap();
        write_project(
            dir.path(),
            "1.2.3",
            "Fixed %COMMIT_HASH% bug (%COMMIT_MESSAGE%)",
        );
        let config = DeploymentConfig::from_json(dir.path(), &config_json(platform_blocks)).unwrap();
        (dir, config)
    }

    /// Requests the mock server saw, in arrival order
    pub async fn requests(server: &MockServer) -> Vec<Request> {
        server.received_requests().await.unwrap_or_default()
    }

    pub fn body_text(request: &Request) -> String {
        String::from_utf8_lossy(&request.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_every_platform() {
        for kind in PlatformKind::ALL {
            let platform = build_platform(kind, "key", test_support::commit()).unwrap();
            assert_eq!(platform.kind(), kind);
        }
    }
}
