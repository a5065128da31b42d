//! On-disk data layout of a game-server container.
//!
//! All mutable server state lives under [`DATA_ROOT`]. Config files sit
//! directly under the root; the world lives in its own subdirectory and
//! travels as a single archive blob under [`WORLD_ARCHIVE_KEY`].

/// Root of the mutable data directory inside the container.
pub const DATA_ROOT: &str = "/data";

/// Name of the bulk world directory under [`DATA_ROOT`].
pub const WORLD_DIR: &str = "world";

/// Reserved object-store key holding the base64-encoded world archive.
/// Never treated as an ordinary config file during restore.
pub const WORLD_ARCHIVE_KEY: &str = "world.tar.gz.b64";

/// Config files tracked for backup on stop and pause.
pub const TRACKED_CONFIG_FILES: [&str; 5] = [
    "server.properties",
    "ops.json",
    "whitelist.json",
    "banned-players.json",
    "banned-ips.json",
];

/// Absolute in-container path for a server-relative artifact path.
pub fn container_path(relative: &str) -> String {
    format!("{DATA_ROOT}/{relative}")
}

/// Absolute in-container path of the world directory.
pub fn world_path() -> String {
    format!("{DATA_ROOT}/{WORLD_DIR}")
}

/// The minimal configuration bundle seeded for a brand-new server.
///
/// Returned as `(relative_path, content)` pairs in tracked-file order.
pub fn default_artifacts() -> Vec<(&'static str, String)> {
    TRACKED_CONFIG_FILES
        .iter()
        .map(|name| {
            let content = match *name {
                "server.properties" => {
                    "server-port=25565\nmotd=A Shardhost Server\nenable-rcon=false\n".to_string()
                }
                _ => "[]\n".to_string(),
            };
            (*name, content)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_bundle_covers_every_tracked_file() {
        let seeded = default_artifacts();
        assert_eq!(seeded.len(), TRACKED_CONFIG_FILES.len());
        for (name, content) in &seeded {
            assert!(TRACKED_CONFIG_FILES.contains(name));
            assert!(!content.is_empty());
        }
    }

    #[test]
    fn json_seeds_are_empty_lists() {
        let seeded = default_artifacts();
        let ops = seeded.iter().find(|(n, _)| *n == "ops.json").unwrap();
        assert_eq!(ops.1, "[]\n");
    }

    #[test]
    fn container_paths_are_rooted() {
        assert_eq!(container_path("ops.json"), "/data/ops.json");
        assert_eq!(world_path(), "/data/world");
    }

    #[test]
    fn archive_key_is_not_a_tracked_file() {
        assert!(!TRACKED_CONFIG_FILES.contains(&WORLD_ARCHIVE_KEY));
    }
}
