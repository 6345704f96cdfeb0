//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Represents a SUT project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .sut/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current =
            std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            let sut_dir = current.join(".sut");
            if sut_dir.is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let sut_dir = root.join(".sut");
        if sut_dir.exists() {
            return Err(ProjectError::AlreadyExists(root.clone()));
        }

        Self::create_structure(&root)?;
        Ok(Self { root })
    }

    /// Force initialization even if .sut/ exists
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::create_structure(&root)?;
        Ok(Self { root })
    }

    fn create_structure(root: &Path) -> Result<(), ProjectError> {
        let sut_dir = root.join(".sut");

        std::fs::create_dir_all(sut_dir.join("state"))
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        let config_path = sut_dir.join("config.yaml");
        std::fs::write(&config_path, Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        Ok(())
    }

    fn default_config() -> &'static str {
        r#"# SUT Project Configuration

# Assessment key used when a command doesn't name one
# (also settable per invocation with --assessment or SUT_ASSESSMENT)
# assessment: ""

# Default output format (auto, tsv, json)
# default_format: auto
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .sut configuration directory
    pub fn sut_dir(&self) -> PathBuf {
        self.root.join(".sut")
    }

    /// Get the directory holding the engine's persisted state blobs
    pub fn state_dir(&self) -> PathBuf {
        self.sut_dir().join("state")
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a SUT project (searched from {searched_from:?}). Run 'sut init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("SUT project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.sut_dir().exists());
        assert!(project.sut_dir().join("config.yaml").exists());
        assert!(project.state_dir().is_dir());
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
    }

    #[test]
    fn test_project_init_force_succeeds_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();
        Project::init_force(tmp.path()).unwrap();
    }

    #[test]
    fn test_project_discover_finds_sut_dir() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_project_discover_fails_without_sut_dir() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }
}
