//! Finding input documents and the groups they merge into.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::config::DiscoveryConfig;

/// Discovers input documents in directories.
pub struct FileDiscovery {
    config: DiscoveryConfig,
}

/// Information about a discovered file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
}

/// A directory whose documents are merged into one.
#[derive(Debug, Clone)]
pub struct DiscoveredGroup {
    /// Directory name, also the merged document's stem
    pub name: String,
    /// Directory holding the inputs; the merged document is written here
    pub dir: PathBuf,
    /// Inputs, sorted by path
    pub files: Vec<DiscoveredFile>,
}

impl FileDiscovery {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    /// Groups under `root`.
    ///
    /// With `per_subdirectory`, every immediate subdirectory that is not
    /// ignored and holds at least one input is a group. Otherwise `root` is
    /// the only group.
    pub fn discover_groups(&self, root: &Path) -> std::io::Result<Vec<DiscoveredGroup>> {
        let root = root.canonicalize()?;

        if !self.config.per_subdirectory {
            let files = self.discover(&root);
            if files.is_empty() {
                return Ok(Vec::new());
            }
            return Ok(vec![DiscoveredGroup {
                name: dir_name(&root),
                dir: root,
                files,
            }]);
        }

        let mut dirs: Vec<PathBuf> = std::fs::read_dir(&root)?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter(|e| !self.is_ignored_dir_name(&e.file_name().to_string_lossy()))
            .map(|e| e.path())
            .collect();
        dirs.sort();

        Ok(dirs
            .into_iter()
            .filter_map(|dir| {
                let files = self.discover(&dir);
                if files.is_empty() {
                    tracing::debug!("No inputs in {:?}, skipping", dir);
                    return None;
                }
                Some(DiscoveredGroup {
                    name: dir_name(&dir),
                    dir,
                    files,
                })
            })
            .collect())
    }

    /// Discover all supported input files at a path.
    ///
    /// If path is a file, returns it if supported.
    /// If path is a directory, recursively finds all supported files.
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        if path.is_file() {
            if self.accepts(path) {
                return vec![DiscoveredFile {
                    path: path.to_path_buf(),
                }];
            }
            return vec![];
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| !self.is_ignored_dir(e))
            .filter_map(|e| e.ok())
        {
            let entry_path = entry.path();
            if entry_path.is_file() && self.accepts(entry_path) {
                files.push(DiscoveredFile {
                    path: entry_path.to_path_buf(),
                });
            }
        }

        // Merge order follows this
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    fn accepts(&self, path: &Path) -> bool {
        self.is_supported(path) && !self.is_ignored_file(path)
    }

    /// Check if a file has a configured input extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                self.config
                    .input_formats
                    .iter()
                    .any(|fmt| fmt.trim_start_matches('.').to_lowercase() == ext_lower)
            })
            .unwrap_or(false)
    }

    /// Ignore entries are either bare file names or absolute paths.
    fn is_ignored_file(&self, path: &Path) -> bool {
        let name = path.file_name().map(|n| n.to_string_lossy());
        self.config.ignored_files.iter().any(|ignored| {
            let ignored_path = Path::new(ignored);
            if ignored_path.is_absolute() {
                ignored_path == path
            } else {
                name.as_deref() == Some(ignored.as_str())
            }
        })
    }

    fn is_ignored_dir(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && self.is_ignored_dir_name(&entry.file_name().to_string_lossy())
    }

    fn is_ignored_dir_name(&self, name: &str) -> bool {
        self.config.ignored_dirs.iter().any(|d| d == name)
    }
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "merged".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_is_supported() {
        let discovery = FileDiscovery::new(DiscoveryConfig::default());

        assert!(discovery.is_supported(Path::new("deck.pptx")));
        assert!(discovery.is_supported(Path::new("NOTES.PDF")));
        assert!(discovery.is_supported(Path::new("essay.docx")));
        assert!(!discovery.is_supported(Path::new("page.html")));
        assert!(!discovery.is_supported(Path::new("README")));
    }

    #[test]
    fn test_discover_sorted_and_pruned() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.pdf"));
        touch(&dir.path().join("a.docx"));
        touch(&dir.path().join("sub/c.pptx"));
        touch(&dir.path().join("__pycache__/d.pdf"));
        touch(&dir.path().join("notes.txt"));

        let files = FileDiscovery::new(DiscoveryConfig::default()).discover(dir.path());
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.docx"),
                PathBuf::from("b.pdf"),
                PathBuf::from("sub/c.pptx")
            ]
        );
    }

    #[test]
    fn test_ignored_files_by_name_and_path() {
        let dir = tempfile::tempdir().unwrap();
        let keep = dir.path().join("keep.pdf");
        let by_name = dir.path().join("syllabus.pdf");
        let by_path = dir.path().join("draft.docx");
        for path in [&keep, &by_name, &by_path] {
            touch(path);
        }

        let config = DiscoveryConfig {
            ignored_files: vec![
                "syllabus.pdf".to_string(),
                by_path.to_string_lossy().into_owned(),
            ],
            ..DiscoveryConfig::default()
        };
        let files = FileDiscovery::new(config).discover(dir.path());
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, keep);
    }

    #[test]
    fn test_groups_per_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("course2/a.pdf"));
        touch(&dir.path().join("course1/slides.pptx"));
        touch(&dir.path().join("course1/notes.pdf"));
        touch(&dir.path().join("empty/readme.txt"));
        touch(&dir.path().join("__pycache__/x.pdf"));
        touch(&dir.path().join("loose.pdf"));

        let groups = FileDiscovery::new(DiscoveryConfig::default())
            .discover_groups(dir.path())
            .unwrap();

        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["course1", "course2"]);
        assert_eq!(groups[0].files.len(), 2);
        assert!(groups[0].files[0].path.ends_with("notes.pdf"));
    }

    #[test]
    fn test_single_group_mode() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("course1/slides.pptx"));
        touch(&dir.path().join("loose.pdf"));

        let config = DiscoveryConfig {
            per_subdirectory: false,
            ..DiscoveryConfig::default()
        };
        let groups = FileDiscovery::new(config)
            .discover_groups(dir.path())
            .unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].files.len(), 2);
        assert_eq!(groups[0].dir, dir.path().canonicalize().unwrap());
    }
}
