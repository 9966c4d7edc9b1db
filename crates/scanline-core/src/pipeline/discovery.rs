//! File discovery for finding images to process.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ProcessingConfig;

/// Discovers image files under a path by extension.
pub struct FileDiscovery {
    config: ProcessingConfig,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// Discover all supported image files at a path.
    ///
    /// A file path returns itself if supported. A directory is walked
    /// recursively; unreadable entries are skipped, not fatal. Results are
    /// sorted for deterministic job ids across runs.
    pub fn discover(&self, path: &Path) -> Vec<PathBuf> {
        if path.is_file() {
            if self.is_supported(path) {
                return vec![path.to_path_buf()];
            }
            return vec![];
        }

        let mut files: Vec<PathBuf> = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file() && self.is_supported(entry.path()))
            .map(|entry| entry.into_path())
            .collect();

        files.sort();
        files
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                self.config
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.to_lowercase() == ext_lower)
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported() {
        let discovery = FileDiscovery::new(ProcessingConfig::default());

        assert!(discovery.is_supported(Path::new("photo.jpg")));
        assert!(discovery.is_supported(Path::new("photo.JPG")));
        assert!(discovery.is_supported(Path::new("photo.jpeg")));
        assert!(discovery.is_supported(Path::new("photo.png")));
        assert!(discovery.is_supported(Path::new("photo.gif")));
        assert!(discovery.is_supported(Path::new("photo.bmp")));
        assert!(discovery.is_supported(Path::new("photo.tiff")));
        assert!(discovery.is_supported(Path::new("photo.webp")));
        assert!(!discovery.is_supported(Path::new("photo.txt")));
        assert!(!discovery.is_supported(Path::new("photo")));
    }

    #[test]
    fn test_discover_walks_recursively_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(dir.path().join("b.png"), b"x").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        std::fs::write(nested.join("c.gif"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let discovery = FileDiscovery::new(ProcessingConfig::default());
        let found = discovery.discover(dir.path());

        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.png", "c.gif"]);
    }

    #[test]
    fn test_discover_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("only.png");
        let other = dir.path().join("only.txt");
        std::fs::write(&img, b"x").unwrap();
        std::fs::write(&other, b"x").unwrap();

        let discovery = FileDiscovery::new(ProcessingConfig::default());
        assert_eq!(discovery.discover(&img), vec![img]);
        assert!(discovery.discover(&other).is_empty());
    }
}
