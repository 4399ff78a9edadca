// Application state module
// Immutable per-process state shared by every request

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

use super::types::Config;

/// Reasons the server refuses to start
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("static root '{path}' is not accessible: {source}")]
    RootUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("static root '{0}' is not a directory")]
    RootNotDirectory(String),
    #[error("index file '{0}' must be a plain file name")]
    InvalidIndexFile(String),
}

/// Application state
///
/// Built once at startup and never mutated afterwards, so request tasks share it
/// through an `Arc` without locking.
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    /// Canonical root directory
    pub root: PathBuf,
    pub index_file: String,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, StartupError> {
        let root_str = &config.static_files.root;
        let root = Path::new(root_str)
            .canonicalize()
            .map_err(|source| StartupError::RootUnavailable {
                path: root_str.clone(),
                source,
            })?;
        if !root.is_dir() {
            return Err(StartupError::RootNotDirectory(root_str.clone()));
        }

        let index_file = config.static_files.index_file.clone();
        let mut components = Path::new(&index_file).components();
        let is_plain_name = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !is_plain_name || index_file.contains('\\') {
            return Err(StartupError::InvalidIndexFile(index_file));
        }

        Ok(Self {
            config: config.clone(),
            root,
            index_file,
        })
    }

    /// Whether per-request access lines are written
    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(root: &str, index: &str) -> Config {
        let mut cfg = Config::load_from("definitely-not-a-config-file").unwrap();
        cfg.static_files.root = root.to_string();
        cfg.static_files.index_file = index.to_string();
        cfg
    }

    #[test]
    fn test_root_is_canonicalized() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("sub");
        std::fs::create_dir(&nested).unwrap();
        let dotted = format!("{}/sub/..", dir.path().display());

        let state = AppState::new(&config_with(&dotted, "index.html")).unwrap();
        assert_eq!(state.root, dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_missing_root_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = AppState::new(&config_with(missing.to_str().unwrap(), "index.html"))
            .unwrap_err();
        assert!(matches!(err, StartupError::RootUnavailable { .. }));
    }

    #[test]
    fn test_file_root_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, b"x").unwrap();
        let err =
            AppState::new(&config_with(file.to_str().unwrap(), "index.html")).unwrap_err();
        assert!(matches!(err, StartupError::RootNotDirectory(_)));
    }

    #[test]
    fn test_index_file_must_be_plain_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        for bad in ["../index.html", "sub/index.html", "/index.html", ""] {
            assert!(
                matches!(
                    AppState::new(&config_with(root, bad)),
                    Err(StartupError::InvalidIndexFile(_))
                ),
                "accepted index file {bad:?}"
            );
        }
    }
}
