//! Per-platform config blocks
//!
//! Each block is shaped after the platform it targets; they share no fields.

use serde::Deserialize;

/// `fancyspaces` block
#[derive(Debug, Clone, Deserialize)]
pub struct FancySpacesConfig {
    pub space_id: String,
    /// Server software the artifact runs on, e.g. "paper"
    pub platform: String,
    pub channel: String,
    #[serde(default)]
    pub supported_versions: Vec<String>,
}

/// `modrinth` block
#[derive(Debug, Clone, Deserialize)]
pub struct ModrinthConfig {
    pub project_id: String,
    #[serde(default)]
    pub supported_versions: Vec<String>,
    /// Version type: release, beta or alpha
    pub channel: String,
    #[serde(default)]
    pub loaders: Vec<String>,
    #[serde(default)]
    pub featured: bool,
}

/// Server platform a Hangar upload targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HangarServer {
    #[default]
    Paper,
    Waterfall,
    Velocity,
}

/// `hangar` block
#[derive(Debug, Clone, Deserialize)]
pub struct HangarConfig {
    /// Owner of the project, used for the public page link
    pub author: String,
    /// Project slug or id
    pub project_id: String,
    pub channel: String,
    #[serde(default)]
    pub supported_versions: Vec<String>,
    #[serde(default)]
    pub platform: HangarServer,
}

/// `orbis` block
#[derive(Debug, Clone, Deserialize)]
pub struct OrbisConfig {
    pub resource_id: String,
    pub channel: String,
    #[serde(default, alias = "hytale_version_ids")]
    pub compatible_hytale_version_ids: Vec<String>,
}

/// `modtale` block
#[derive(Debug, Clone, Deserialize)]
pub struct ModtaleConfig {
    pub project_id: String,
    #[serde(default)]
    pub game_versions: Vec<String>,
}

/// Artifact kind on CurseForge; decides which id tables apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    #[default]
    Plugin,
    Mod,
}

impl ProjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectKind::Plugin => "plugin",
            ProjectKind::Mod => "mod",
        }
    }
}

/// CurseForge game version, either a native id or a human version string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum GameVersion {
    Id(u32),
    Name(String),
}

/// `curseforge` block
#[derive(Debug, Clone, Deserialize)]
pub struct CurseForgeConfig {
    pub project_id: String,
    #[serde(default)]
    pub game_versions: Vec<GameVersion>,
    /// release, beta or alpha
    pub release_type: String,
    #[serde(default, rename = "type")]
    pub kind: ProjectKind,
    /// Mod loader name; required when `type` is "mod"
    #[serde(default)]
    pub loader: Option<String>,
    #[serde(default)]
    pub relations: Option<CurseForgeRelations>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurseForgeRelations {
    #[serde(default)]
    pub projects: Vec<CurseForgeRelation>,
}

/// Relation to another CurseForge project, e.g. a required dependency
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, serde::Serialize)]
pub struct CurseForgeRelation {
    pub slug: String,
    /// embeddedLibrary, incompatible, optionalDependency, requiredDependency or tool
    #[serde(rename = "type")]
    pub kind: String,
}

/// `unifiedhytale` block
#[derive(Debug, Clone, Deserialize)]
pub struct UnifiedHytaleConfig {
    pub project_id: String,
    #[serde(default)]
    pub game_versions: Vec<String>,
    pub release_channel: String,
}

/// `hytahub` block
#[derive(Debug, Clone, Deserialize)]
pub struct HytahubConfig {
    pub slug: String,
    pub channel: String,
}
