//! Game profiles — the closed set of server packages Shardhost can run.
//!
//! A profile fixes the container image, resource figures, game port, and
//! environment for a package. Profiles are a tagged enum rather than a
//! string-keyed table so an unknown package is a deserialization error at
//! the edge, not a lookup failure mid-operation. Operators may adjust the
//! built-in figures through a `profiles.toml` override file, validated at
//! load time.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating profile overrides.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read profile file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse profile file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("profile {package}: {reason}")]
    Invalid { package: String, reason: String },
}

/// The closed set of supported game packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePackage {
    Standard,
}

impl GamePackage {
    /// Built-in profile for this package.
    pub fn spec(&self) -> ProfileSpec {
        match self {
            GamePackage::Standard => ProfileSpec {
                image: "itzg/minecraft-server:latest".to_string(),
                cpu_millis: 1000,
                memory_mib: 2048,
                port: 25565,
                env: BTreeMap::from([("EULA".to_string(), "TRUE".to_string())]),
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GamePackage::Standard => "standard",
        }
    }
}

/// Concrete resource/image template for one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSpec {
    /// Container image reference.
    pub image: String,
    /// CPU request and limit, in millicores.
    pub cpu_millis: u32,
    /// Memory request and limit, in MiB.
    pub memory_mib: u32,
    /// Game port exposed by the container.
    pub port: u16,
    /// Environment variables injected into the container.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl ProfileSpec {
    fn validate(&self, package: &str) -> Result<(), ProfileError> {
        let fail = |reason: &str| ProfileError::Invalid {
            package: package.to_string(),
            reason: reason.to_string(),
        };
        if self.image.is_empty() {
            return Err(fail("image must not be empty"));
        }
        if self.cpu_millis == 0 {
            return Err(fail("cpu_millis must be positive"));
        }
        if self.memory_mib == 0 {
            return Err(fail("memory_mib must be positive"));
        }
        if self.port == 0 {
            return Err(fail("port must be nonzero"));
        }
        Ok(())
    }
}

/// Partial per-package overrides parsed from `profiles.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
struct ProfileOverride {
    image: Option<String>,
    cpu_millis: Option<u32>,
    memory_mib: Option<u32>,
    port: Option<u16>,
    env: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Default, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    profiles: BTreeMap<String, ProfileOverride>,
}

/// Resolved profile table: built-in specs plus any file overrides.
///
/// Construct once at startup; lookups afterward are infallible for any
/// `GamePackage` value.
#[derive(Debug, Clone)]
pub struct ProfileTable {
    standard: ProfileSpec,
}

impl ProfileTable {
    /// Built-in profiles only.
    pub fn builtin() -> Self {
        Self {
            standard: GamePackage::Standard.spec(),
        }
    }

    /// Built-in profiles with overrides applied from a `profiles.toml` file.
    ///
    /// Unknown package names in the file are rejected; the merged result is
    /// validated before it is returned.
    pub fn from_file(path: &Path) -> Result<Self, ProfileError> {
        let content = std::fs::read_to_string(path)?;
        let file: ProfileFile = toml::from_str(&content)?;

        let mut table = Self::builtin();
        for (name, over) in file.profiles {
            let spec = match name.as_str() {
                "standard" => &mut table.standard,
                other => {
                    return Err(ProfileError::Invalid {
                        package: other.to_string(),
                        reason: "unknown package name".to_string(),
                    });
                }
            };
            if let Some(image) = over.image {
                spec.image = image;
            }
            if let Some(cpu) = over.cpu_millis {
                spec.cpu_millis = cpu;
            }
            if let Some(mem) = over.memory_mib {
                spec.memory_mib = mem;
            }
            if let Some(port) = over.port {
                spec.port = port;
            }
            if let Some(env) = over.env {
                spec.env.extend(env);
            }
        }
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<(), ProfileError> {
        self.standard.validate("standard")
    }

    /// Resolve the spec for a package.
    pub fn get(&self, package: GamePackage) -> &ProfileSpec {
        match package {
            GamePackage::Standard => &self.standard,
        }
    }
}
