//! CurseForge game version and loader ids
//!
//! CurseForge only understands its own numeric ids. Human version strings from
//! the config are mapped through a fixed table per artifact kind. Numeric ids
//! pass through.

use std::collections::HashMap;

use crate::config::{CurseForgeConfig, GameVersion, ProjectKind};
use crate::error::{Error, ErrorCode, Result};

/// Loader id sent for Bukkit plugins, whatever `loader` says
///
/// Placeholder: no published CurseForge id for the Bukkit loader has been
/// confirmed. Check it against the upload API's `game/versions` listing
/// before relying on plugin uploads.
pub const PLUGIN_LOADER_ID: u32 = 1;

const MINECRAFT_VERSIONS: [(&str, u32); 26] = [
    ("1.21.4", 11596),
    ("1.21.3", 11213),
    ("1.21.2", 11092),
    ("1.21.1", 10785),
    ("1.21", 10407),
    ("1.20.6", 10235),
    ("1.20.5", 10169),
    ("1.20.4", 9971),
    ("1.20.3", 9883),
    ("1.20.2", 9856),
    ("1.20.1", 9990),
    ("1.20", 9885),
    ("1.19.4", 9776),
    ("1.19.3", 9550),
    ("1.19.2", 9366),
    ("1.19.1", 9259),
    ("1.19", 9186),
    ("1.18.2", 9008),
    ("1.18.1", 8857),
    ("1.18", 8830),
    ("1.17.1", 8516),
    ("1.17", 8203),
    ("1.16.5", 7915),
    ("1.16.4", 7890),
    ("1.16.3", 7667),
    ("1.16", 7469),
];

lazy_static::lazy_static! {
    // Only the Minecraft ids are known; the plugin partition reuses them
    // until a Bukkit-specific list replaces it
    static ref VERSION_TABLES: HashMap<ProjectKind, HashMap<&'static str, u32>> = {
        let minecraft: HashMap<&'static str, u32> = HashMap::from(MINECRAFT_VERSIONS);
        HashMap::from([
            (ProjectKind::Plugin, minecraft.clone()),
            (ProjectKind::Mod, minecraft),
        ])
    };

    static ref MOD_LOADERS: HashMap<&'static str, u32> = HashMap::from([
        ("forge", 7498),
        ("fabric", 7499),
        ("quilt", 9153),
        ("neoforge", 10150),
    ]);
}

fn supported_loaders() -> String {
    let mut names: Vec<&str> = MOD_LOADERS.keys().copied().collect();
    names.sort_unstable();
    names.join(", ")
}

/// Resolve the loader id for an artifact kind.
pub fn loader_id(kind: ProjectKind, loader: Option<&str>) -> Result<u32> {
    match kind {
        ProjectKind::Plugin => Ok(PLUGIN_LOADER_ID),
        ProjectKind::Mod => {
            let name = loader.map(|l| l.trim().to_ascii_lowercase()).unwrap_or_default();
            MOD_LOADERS.get(name.as_str()).copied().ok_or_else(|| {
                Error::new(
                    ErrorCode::UnknownLoader,
                    format!("unknown loader '{name}', supported loaders: {}", supported_loaders()),
                )
            })
        }
    }
}

/// Map one configured game version to its CurseForge id for `kind`.
pub fn version_id(kind: ProjectKind, version: &GameVersion) -> Result<u32> {
    match version {
        GameVersion::Id(id) => Ok(*id),
        GameVersion::Name(name) => VERSION_TABLES
            .get(&kind)
            .and_then(|table| table.get(name.as_str()))
            .copied()
            .ok_or_else(|| {
                Error::new(
                    ErrorCode::UnknownVersion,
                    format!("unknown Minecraft version for {}: {name}", kind.as_str()),
                )
            }),
    }
}

/// Loader id first, then every configured game version in order.
pub fn resolve_game_versions(config: &CurseForgeConfig) -> Result<Vec<u32>> {
    let mut ids = Vec::with_capacity(config.game_versions.len() + 1);
    ids.push(loader_id(config.kind, config.loader.as_deref())?);
    for version in &config.game_versions {
        ids.push(version_id(config.kind, version)?);
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(json: &str) -> CurseForgeConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_numeric_ids_pass_through() {
        assert_eq!(version_id(ProjectKind::Plugin, &GameVersion::Id(424242)).unwrap(), 424242);
        assert_eq!(version_id(ProjectKind::Mod, &GameVersion::Id(7)).unwrap(), 7);
    }

    #[test]
    fn test_known_version_names() {
        let name = |v: &str| GameVersion::Name(v.to_string());
        assert_eq!(version_id(ProjectKind::Plugin, &name("1.21")).unwrap(), 10407);
        assert_eq!(version_id(ProjectKind::Mod, &name("1.20.1")).unwrap(), 9990);
    }

    #[test]
    fn test_unknown_version_name() {
        let err = version_id(ProjectKind::Mod, &GameVersion::Name("1.99".to_string())).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownVersion);
        assert!(err.message.contains("1.99"));
    }

    #[test]
    fn test_plugin_ignores_loader() {
        assert_eq!(loader_id(ProjectKind::Plugin, Some("fabric")).unwrap(), PLUGIN_LOADER_ID);
        assert_eq!(loader_id(ProjectKind::Plugin, None).unwrap(), PLUGIN_LOADER_ID);
    }

    #[test]
    fn test_mod_loaders() {
        assert_eq!(loader_id(ProjectKind::Mod, Some("Fabric")).unwrap(), 7499);
        assert_eq!(loader_id(ProjectKind::Mod, Some("neoforge")).unwrap(), 10150);
    }

    #[test]
    fn test_unknown_mod_loader_lists_supported() {
        let err = loader_id(ProjectKind::Mod, Some("liteloader")).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownLoader);
        assert!(err.message.ends_with("fabric, forge, neoforge, quilt"));

        let err = loader_id(ProjectKind::Mod, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownLoader);
    }

    #[test]
    fn test_resolve_prepends_loader() {
        let cfg = config(
            r#"{"project_id": "1", "release_type": "release", "type": "mod",
                "loader": "forge", "game_versions": ["1.21.1", 9990]}"#,
        );
        assert_eq!(resolve_game_versions(&cfg).unwrap(), vec![7498, 10785, 9990]);
    }
}
