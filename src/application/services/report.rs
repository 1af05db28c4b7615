//! Writing rendered diagrams, reports and generated config files

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::application::{ApplicationResult, IoResultExt};
use crate::infrastructure::traits::FileSystem;

pub struct ReportWriter {
    fs: Arc<dyn FileSystem>,
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(fs: Arc<dyn FileSystem>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            output_dir: output_dir.into(),
        }
    }

    /// Explicit path as given, otherwise `default_name` inside the output directory.
    pub fn target(&self, explicit: Option<&Path>, default_name: &str) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.output_dir.join(default_name))
    }

    /// Write `content` to `path`, creating parent directories.
    pub fn write(&self, path: &Path, content: &str) -> ApplicationResult<PathBuf> {
        self.fs
            .ensure_parent(path)
            .with_path_context("create parent directory", path)?;
        self.fs.write(path, content).with_path_context("write", path)?;
        info!("wrote {} ({} bytes)", path.display(), content.len());
        Ok(path.to_path_buf())
    }

    /// Write unless the file already exists; returns false when skipped.
    pub fn write_new(&self, path: &Path, content: &str) -> ApplicationResult<bool> {
        if self.fs.exists(path) {
            return Ok(false);
        }
        self.write(path, content)?;
        Ok(true)
    }

    pub fn read(&self, path: &Path) -> ApplicationResult<String> {
        self.fs.read_to_string(path).with_path_context("read", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::traits::RealFileSystem;
    use tempfile::TempDir;

    #[test]
    fn given_no_explicit_path_when_targeting_then_uses_output_dir() {
        let writer = ReportWriter::new(Arc::new(RealFileSystem), "/tmp/out");

        assert_eq!(writer.target(None, "parse_tree.svg"), PathBuf::from("/tmp/out/parse_tree.svg"));
        assert_eq!(
            writer.target(Some(Path::new("x/tree.svg")), "parse_tree.svg"),
            PathBuf::from("x/tree.svg")
        );
    }

    #[test]
    fn given_existing_file_when_write_new_then_left_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conf/.bodmas-viz.toml");
        let writer = ReportWriter::new(Arc::new(RealFileSystem), dir.path());

        assert!(writer.write_new(&path, "first").unwrap());
        assert!(!writer.write_new(&path, "second").unwrap());

        assert_eq!(writer.read(&path).unwrap(), "first");
    }

    #[test]
    fn given_missing_file_when_reading_then_error_names_path() {
        let dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(Arc::new(RealFileSystem), dir.path());

        let err = writer.read(&dir.path().join("nope.json")).unwrap_err();

        assert!(err.to_string().contains("nope.json"));
    }
}
