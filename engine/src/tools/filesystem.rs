//! Sandboxed filesystem access for the edit pipeline.
//!
//! All reads and writes go through [`FileTools`], which confines paths to a
//! single workspace root and maintains a deny list of sensitive names.
//!
//! # Security Model
//!
//! Path validation is purely lexical and happens before any I/O:
//! 1. Check deny list on the requested path
//! 2. Join to the workspace root and normalize `.` / `..` components
//! 3. Check deny list on the normalized path
//! 4. Verify the result is still under the root
//!
//! Because normalization never touches the filesystem, a traversal attempt
//! like `../../etc/passwd` is rejected even when the target does not exist.

use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use crate::errors::EngineError;

/// Filesystem gateway rooted at the workspace directory.
#[derive(Debug)]
pub struct FileTools {
    root: PathBuf,
    deny_list: Vec<PathBuf>,
}

impl FileTools {
    /// Creates a new `FileTools` rooted at `root`.
    ///
    /// The root is canonicalized once here; this is the only place path
    /// validation touches the filesystem. The deny list covers common
    /// credential and key locations:
    /// - .ssh, id_rsa, id_ed25519, id_dsa (SSH keys)
    /// - .env (environment variables)
    /// - .aws/credentials, .config/gcloud (cloud credentials)
    /// - .gnupg (GPG keys)
    /// - .kube/config (Kubernetes config)
    pub fn new(root: &Path) -> Result<Self, EngineError> {
        let root = root.canonicalize()?;

        let deny_list = vec![
            PathBuf::from(".ssh"),
            PathBuf::from(".env"),
            PathBuf::from(".aws/credentials"),
            PathBuf::from(".config/gcloud"),
            PathBuf::from("id_rsa"),
            PathBuf::from("id_ed25519"),
            PathBuf::from("id_dsa"),
            PathBuf::from(".gnupg"),
            PathBuf::from(".kube/config"),
            PathBuf::from("credentials"),
            PathBuf::from("private_key"),
            PathBuf::from(".npmrc"),
            PathBuf::from(".pypirc"),
        ];

        Ok(Self { root, deny_list })
    }

    /// Returns the canonical sandbox root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a workspace-relative path through the four validation gates.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::PathDenied` if the path matches the deny list.
    /// Returns `EngineError::PathOutsideWorkspace` if normalization escapes
    /// the root, including absolute paths that point elsewhere.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, EngineError> {
        let requested = Path::new(path);

        // Gate 1: Check deny list before normalization
        if self.is_denied(requested) {
            return Err(EngineError::PathDenied(requested.to_path_buf()));
        }

        // Gate 2: Normalize lexically, popping `..` without touching the disk
        let mut resolved = self.root.clone();
        for component in requested.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    if resolved == self.root {
                        return Err(EngineError::PathOutsideWorkspace(requested.to_path_buf()));
                    }
                    resolved.pop();
                }
                Component::Normal(part) => resolved.push(part),
                // Absolute paths restart from their own root; accept them
                // only when they already point inside the sandbox.
                Component::RootDir | Component::Prefix(_) => {
                    resolved = PathBuf::from(component.as_os_str());
                }
            }
        }

        // Gate 3: Check deny list after normalization
        if self.is_denied(&resolved) {
            return Err(EngineError::PathDenied(resolved));
        }

        // Gate 4: Verify within the root
        if !resolved.starts_with(&self.root) {
            return Err(EngineError::PathOutsideWorkspace(resolved));
        }

        Ok(resolved)
    }

    /// Reads the contents of a file within the workspace.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::FileNotFound` if the path does not exist and
    /// `EngineError::NotAFile` if it resolves to a directory.
    pub async fn read_file(&self, path: &str) -> Result<String, EngineError> {
        let resolved = self.resolve(path)?;

        let metadata = match fs::metadata(&resolved).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(EngineError::FileNotFound(resolved));
            }
            Err(e) => return Err(EngineError::Io(e)),
        };
        if !metadata.is_file() {
            return Err(EngineError::NotAFile(resolved));
        }

        let content = fs::read_to_string(&resolved).await?;
        debug!("Read {} bytes from {}", content.len(), resolved.display());
        Ok(content)
    }

    /// Writes content to a file within the workspace, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::FileExists` if the file already exists and
    /// `overwrite` is false.
    pub async fn write_file(
        &self,
        path: &str,
        content: &str,
        overwrite: bool,
    ) -> Result<PathBuf, EngineError> {
        let resolved = self.resolve(path)?;

        if !overwrite && fs::metadata(&resolved).await.is_ok() {
            warn!("Refusing to overwrite existing file: {}", resolved.display());
            return Err(EngineError::FileExists(resolved));
        }

        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&resolved, content).await?;
        debug!("Wrote {} bytes to {}", content.len(), resolved.display());
        Ok(resolved)
    }

    /// Checks whether a path exists within the workspace.
    ///
    /// Paths that fail validation are reported as absent rather than as
    /// errors.
    pub async fn exists(&self, path: &str) -> bool {
        match self.resolve(path) {
            Ok(resolved) => fs::metadata(&resolved).await.is_ok(),
            Err(_) => false,
        }
    }

    /// Checks if a path matches any entry in the deny list.
    ///
    /// Matches both whole-path suffixes (`.aws/credentials`) and single
    /// components (`.env` anywhere in the path).
    fn is_denied(&self, path: &Path) -> bool {
        self.deny_list.iter().any(|denied| {
            path.ends_with(denied)
                || path.components().any(|c| {
                    if let Some(os_str) = c.as_os_str().to_str() {
                        denied.as_os_str().to_str().is_some_and(|d| os_str == d)
                    } else {
                        false
                    }
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tools(temp: &TempDir) -> FileTools {
        FileTools::new(temp.path()).unwrap()
    }

    #[test]
    fn test_resolve_plain_relative_path() {
        let temp = TempDir::new().unwrap();
        let tools = tools(&temp);

        let resolved = tools.resolve("src/main.rs").unwrap();
        assert_eq!(resolved, tools.root().join("src/main.rs"));
    }

    #[test]
    fn test_resolve_normalizes_dot_components() {
        let temp = TempDir::new().unwrap();
        let tools = tools(&temp);

        let resolved = tools.resolve("./src/./lib.rs").unwrap();
        assert_eq!(resolved, tools.root().join("src/lib.rs"));
    }

    #[test]
    fn test_resolve_allows_parent_within_root() {
        let temp = TempDir::new().unwrap();
        let tools = tools(&temp);

        let resolved = tools.resolve("src/../README.md").unwrap();
        assert_eq!(resolved, tools.root().join("README.md"));
    }

    #[test]
    fn test_traversal_rejected_without_io() {
        let temp = TempDir::new().unwrap();
        let tools = tools(&temp);

        // The target does not exist anywhere; rejection is purely lexical.
        let result = tools.resolve("../../definitely/not/here.txt");
        assert!(matches!(
            result,
            Err(EngineError::PathOutsideWorkspace(_))
        ));
    }

    #[test]
    fn test_interior_traversal_escaping_root_rejected() {
        let temp = TempDir::new().unwrap();
        let tools = tools(&temp);

        let result = tools.resolve("src/../../outside.txt");
        assert!(matches!(
            result,
            Err(EngineError::PathOutsideWorkspace(_))
        ));
    }

    #[test]
    fn test_absolute_path_outside_root_rejected() {
        let temp = TempDir::new().unwrap();
        let tools = tools(&temp);

        let result = tools.resolve("/etc/hostname");
        assert!(matches!(
            result,
            Err(EngineError::PathOutsideWorkspace(_))
        ));
    }

    #[test]
    fn test_absolute_path_inside_root_accepted() {
        let temp = TempDir::new().unwrap();
        let tools = tools(&temp);

        let inside = tools.root().join("file.txt");
        let resolved = tools.resolve(inside.to_str().unwrap()).unwrap();
        assert_eq!(resolved, inside);
    }

    #[test]
    fn test_denied_component_rejected_before_normalization() {
        let temp = TempDir::new().unwrap();
        let tools = tools(&temp);

        let result = tools.resolve(".env");
        assert!(matches!(result, Err(EngineError::PathDenied(_))));
    }

    #[test]
    fn test_denied_component_rejected_in_subdirectory() {
        let temp = TempDir::new().unwrap();
        let tools = tools(&temp);

        let result = tools.resolve("config/.ssh/known_hosts");
        assert!(matches!(result, Err(EngineError::PathDenied(_))));
    }

    #[test]
    fn test_denied_suffix_rejected() {
        let temp = TempDir::new().unwrap();
        let tools = tools(&temp);

        let result = tools.resolve("backup/.aws/credentials");
        assert!(matches!(result, Err(EngineError::PathDenied(_))));
    }

    #[tokio::test]
    async fn test_read_missing_file_is_file_not_found() {
        let temp = TempDir::new().unwrap();
        let tools = tools(&temp);

        let result = tools.read_file("absent.rs").await;
        assert!(matches!(result, Err(EngineError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_read_directory_is_not_a_file() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("src")).unwrap();
        let tools = tools(&temp);

        let result = tools.read_file("src").await;
        assert!(matches!(result, Err(EngineError::NotAFile(_))));
    }

    #[tokio::test]
    async fn test_write_then_read_roundtrip() {
        let temp = TempDir::new().unwrap();
        let tools = tools(&temp);

        tools
            .write_file("src/main.rs", "fn main() {}\n", false)
            .await
            .unwrap();

        let content = tools.read_file("src/main.rs").await.unwrap();
        assert_eq!(content, "fn main() {}\n");
    }

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let tools = tools(&temp);

        tools
            .write_file("deep/nested/dir/file.txt", "data", false)
            .await
            .unwrap();

        assert!(temp.path().join("deep/nested/dir/file.txt").is_file());
    }

    #[tokio::test]
    async fn test_write_refuses_clobber_without_overwrite() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("keep.txt"), "original").unwrap();
        let tools = tools(&temp);

        let result = tools.write_file("keep.txt", "replaced", false).await;
        assert!(matches!(result, Err(EngineError::FileExists(_))));

        let content = std::fs::read_to_string(temp.path().join("keep.txt")).unwrap();
        assert_eq!(content, "original");
    }

    #[tokio::test]
    async fn test_write_with_overwrite_replaces_content() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("keep.txt"), "original").unwrap();
        let tools = tools(&temp);

        tools.write_file("keep.txt", "replaced", true).await.unwrap();

        let content = std::fs::read_to_string(temp.path().join("keep.txt")).unwrap();
        assert_eq!(content, "replaced");
    }

    #[tokio::test]
    async fn test_exists_reports_validation_failures_as_absent() {
        let temp = TempDir::new().unwrap();
        let tools = tools(&temp);

        assert!(!tools.exists("../outside.txt").await);
        assert!(!tools.exists("missing.txt").await);

        std::fs::write(temp.path().join("present.txt"), "x").unwrap();
        assert!(tools.exists("present.txt").await);
    }
}
