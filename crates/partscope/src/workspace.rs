//! Per-request scratch directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use partscope_convert::PipelineOutputs;
use tempfile::TempDir;
use tracing::debug;

use crate::error::ProcessError;

const INPUT_DIR: &str = "input";
const PREFIX: &str = "partscope-";

/// A temporary directory holding every file produced for one request.
///
/// Deleted when dropped, on success and failure alike. Uploads are staged
/// under `input/` so they never collide with the fixed output names.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh workspace under the system temp directory.
    pub fn new() -> io::Result<Self> {
        Self::from_dir(tempfile::Builder::new().prefix(PREFIX).tempdir()?)
    }

    /// Create a fresh workspace under `parent`.
    pub fn new_in(parent: &Path) -> io::Result<Self> {
        Self::from_dir(tempfile::Builder::new().prefix(PREFIX).tempdir_in(parent)?)
    }

    fn from_dir(dir: TempDir) -> io::Result<Self> {
        fs::create_dir(dir.path().join(INPUT_DIR))?;
        debug!(path = %dir.path().display(), "created workspace");
        Ok(Self { dir })
    }

    /// Workspace root.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Output slots for the conversion pipeline.
    pub fn outputs(&self) -> PipelineOutputs {
        PipelineOutputs::in_dir(self.path())
    }

    /// Copy `input` into the workspace under a sanitized name.
    pub fn stage_input(&self, input: &Path) -> Result<PathBuf, ProcessError> {
        let name = input
            .file_name()
            .and_then(|n| n.to_str())
            .map(sanitize_file_name)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ProcessError::InvalidFileName(input.to_path_buf()))?;
        let staged = self.path().join(INPUT_DIR).join(name);
        fs::copy(input, &staged)?;
        Ok(staged)
    }
}

/// Replace spaces with underscores and drop parentheses.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '(' | ')'))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_file_name("bracket (rev 2).step"), "bracket_rev_2.step");
        assert_eq!(sanitize_file_name("plain.stl"), "plain.stl");
    }

    #[test]
    fn test_stage_input_and_cleanup() {
        let source = TempDir::new().unwrap();
        let upload = source.path().join("my part (1).stl");
        fs::write(&upload, b"solid x\nendsolid x\n").unwrap();

        let workspace = Workspace::new().unwrap();
        let root = workspace.path().to_path_buf();
        let staged = workspace.stage_input(&upload).unwrap();
        assert_eq!(staged, root.join("input").join("my_part_1.stl"));
        assert_eq!(fs::read(&staged).unwrap(), fs::read(&upload).unwrap());
        assert_ne!(staged, workspace.outputs().mesh);

        drop(workspace);
        assert!(!root.exists());
    }

    #[test]
    fn test_new_in_parent() {
        let parent = TempDir::new().unwrap();
        let workspace = Workspace::new_in(parent.path()).unwrap();
        assert_eq!(workspace.path().parent(), Some(parent.path()));
        assert!(workspace.path().join("input").is_dir());

        drop(workspace);
        assert_eq!(fs::read_dir(parent.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_stage_rejects_nameless_path() {
        let workspace = Workspace::new().unwrap();
        let err = workspace.stage_input(Path::new("/")).unwrap_err();
        assert!(matches!(err, ProcessError::InvalidFileName(_)));
    }
}
