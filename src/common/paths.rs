//! Configuration paths and relative path resolution

use std::path::{Path, PathBuf};

/// Name used for the configuration directory
const APP_NAME: &str = "grpc-bdd";

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/grpc-bdd/`
/// - macOS: `~/Library/Application Support/grpc-bdd/`
/// - Windows: `%APPDATA%\grpc-bdd\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Resolve `path` against `base` unless it is already absolute
pub fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        base.join(path)
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_ends_with_toml() {
        if let Some(path) = config_path() {
            assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("config.toml"));
        }
    }

    #[test]
    fn test_resolve_relative() {
        let base = Path::new("/srv/features");
        assert_eq!(
            resolve_relative(base, Path::new("protos/hello.proto")),
            PathBuf::from("/srv/features/protos/hello.proto")
        );
        assert_eq!(
            resolve_relative(base, Path::new("/etc/hello.proto")),
            PathBuf::from("/etc/hello.proto")
        );
    }
}
