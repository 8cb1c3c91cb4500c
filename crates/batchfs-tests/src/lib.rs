//! Integration test suite for the batchfs workspace
//!
//! The crate body holds shared test utilities; the actual scenarios live
//! under `tests/`.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Unified test utilities
///
/// Builders for the directory trees the integration scenarios operate on,
/// plus content verification helpers shared across test files.
pub mod test_utils {
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    /// Install a test-writer subscriber so failing tests show engine
    /// tracing. Safe to call from every test; only the first call wins.
    pub fn init_test_logging() {
        use tracing_subscriber::EnvFilter;
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// Create a file filled with a repeated byte pattern
    pub fn create_test_file(path: &Path, size: usize) -> io::Result<()> {
        let content = "A".repeat(size);
        fs::write(path, content)
    }

    /// Create a nested directory tree with files of mixed sizes.
    ///
    /// Returns the files created, in no particular order.
    pub fn create_test_tree(base: &Path) -> io::Result<Vec<PathBuf>> {
        for dir in ["photos", "photos/2024", "documents"] {
            fs::create_dir_all(base.join(dir))?;
        }

        let files = [
            ("readme.txt", 256),
            ("photos/cover.jpg", 64 * 1024),
            ("photos/2024/trip.jpg", 128 * 1024),
            ("documents/notes.md", 4096),
        ];

        let mut created = Vec::new();
        for (rel, size) in files {
            let path = base.join(rel);
            create_test_file(&path, size)?;
            created.push(path);
        }
        Ok(created)
    }

    /// Assert that two directory trees hold identical entries and file
    /// contents.
    pub fn assert_trees_equal(left: &Path, right: &Path) {
        let mut left_entries = list_sorted(left);
        let mut right_entries = list_sorted(right);
        left_entries.sort();
        right_entries.sort();
        assert_eq!(
            left_entries, right_entries,
            "trees under {} and {} differ in structure",
            left.display(),
            right.display()
        );

        for rel in &left_entries {
            let a = left.join(rel);
            let b = right.join(rel);
            assert_eq!(a.is_dir(), b.is_dir(), "kind mismatch for {}", rel.display());
            if a.is_file() {
                assert_eq!(
                    fs::read(&a).unwrap(),
                    fs::read(&b).unwrap(),
                    "contents differ for {}",
                    rel.display()
                );
            }
        }
    }

    /// Count the entries directly inside `dir`
    pub fn entry_count(dir: &Path) -> usize {
        fs::read_dir(dir).map(|it| it.count()).unwrap_or(0)
    }

    fn list_sorted(root: &Path) -> Vec<PathBuf> {
        let mut out = Vec::new();
        collect(root, root, &mut out);
        out
    }

    fn collect(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(_) => return,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if let Ok(rel) = path.strip_prefix(root) {
                out.push(rel.to_path_buf());
            }
            if path.is_dir() {
                collect(root, &path, out);
            }
        }
    }
}
