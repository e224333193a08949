//! Platform trait defining the interface all platform adapters must implement

use async_trait::async_trait;

use crate::config::DeploymentConfig;
use crate::error::Result;

/// Hosting platforms an artifact can be deployed to
///
/// Order is the order the orchestrator deploys in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PlatformKind {
    FancySpaces,
    Modrinth,
    Hangar,
    Orbis,
    Modtale,
    CurseForge,
    UnifiedHytale,
    Hytahub,
}

impl PlatformKind {
    pub const ALL: [PlatformKind; 8] = [
        PlatformKind::FancySpaces,
        PlatformKind::Modrinth,
        PlatformKind::Hangar,
        PlatformKind::Orbis,
        PlatformKind::Modtale,
        PlatformKind::CurseForge,
        PlatformKind::UnifiedHytale,
        PlatformKind::Hytahub,
    ];

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            PlatformKind::FancySpaces => "FancySpaces",
            PlatformKind::Modrinth => "Modrinth",
            PlatformKind::Hangar => "Hangar",
            PlatformKind::Orbis => "Orbis",
            PlatformKind::Modtale => "Modtale",
            PlatformKind::CurseForge => "CurseForge",
            PlatformKind::UnifiedHytale => "UnifiedHytale",
            PlatformKind::Hytahub => "Hytahub",
        }
    }

    /// Key of the platform block in the config document
    pub fn config_key(&self) -> &'static str {
        match self {
            PlatformKind::FancySpaces => "fancyspaces",
            PlatformKind::Modrinth => "modrinth",
            PlatformKind::Hangar => "hangar",
            PlatformKind::Orbis => "orbis",
            PlatformKind::Modtale => "modtale",
            PlatformKind::CurseForge => "curseforge",
            PlatformKind::UnifiedHytale => "unifiedhytale",
            PlatformKind::Hytahub => "hytahub",
        }
    }

    /// Environment variable carrying the platform's API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            PlatformKind::FancySpaces => "FV_FANCYSPACES_API_KEY",
            PlatformKind::Modrinth => "FV_MODRINTH_API_KEY",
            PlatformKind::Hangar => "FV_HANGAR_API_KEY",
            PlatformKind::Orbis => "FV_ORBIS_API_KEY",
            PlatformKind::Modtale => "FV_MODTALE_API_KEY",
            PlatformKind::CurseForge => "FV_CURSEFORGE_API_KEY",
            PlatformKind::UnifiedHytale => "FV_UNIFIEDHYTALE_API_KEY",
            PlatformKind::Hytahub => "FV_HYTAHUB_API_KEY",
        }
    }

    /// Whether the config carries a block for this platform
    pub fn is_enabled(&self, config: &DeploymentConfig) -> bool {
        match self {
            PlatformKind::FancySpaces => config.fancyspaces.is_some(),
            PlatformKind::Modrinth => config.modrinth.is_some(),
            PlatformKind::Hangar => config.hangar.is_some(),
            PlatformKind::Orbis => config.orbis.is_some(),
            PlatformKind::Modtale => config.modtale.is_some(),
            PlatformKind::CurseForge => config.curseforge.is_some(),
            PlatformKind::UnifiedHytale => config.unifiedhytale.is_some(),
            PlatformKind::Hytahub => config.hytahub.is_some(),
        }
    }

    /// Platforms enabled by `config`, in deploy order
    pub fn enabled(config: &DeploymentConfig) -> Vec<PlatformKind> {
        Self::ALL
            .into_iter()
            .filter(|kind| kind.is_enabled(config))
            .collect()
    }
}

impl std::fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait that all platform adapters must implement
///
/// An adapter is built with its API credential and the shared commit context.
/// `deploy` runs the platform's fixed request sequence; the first failing step
/// aborts the rest and is returned with the step name as context. Nothing is
/// rolled back on the remote side.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Which platform this adapter targets
    fn kind(&self) -> PlatformKind;

    /// Publish the config's artifact, version and changelog
    ///
    /// # Errors
    /// Returns an error if the platform block is missing from `config`, a
    /// referenced file is unreadable, or any request fails.
    async fn deploy(&self, config: &DeploymentConfig) -> Result<()>;
}
