/*!
 * Exclusion policy for ctxpack
 *
 * Decides which directories and files are kept out of the packed document:
 * fixed directory and extension tables, a size ceiling, binary sniffing,
 * and user-supplied glob patterns.
 */

use std::path::Path;

use glob_match::glob_match;
use once_cell::sync::Lazy;

/// Default ceiling for individual file content, in bytes
pub const MAX_FILE_SIZE_BYTES: u64 = 1024 * 1024;

/// Number of leading bytes inspected for the binary sniff
pub const BINARY_SNIFF_LEN: usize = 8192;

/// Directory names that are never descended into
pub static EXCLUDED_DIRS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // Version control
        ".git",
        ".svn",
        ".hg",
        // Rust
        "target",
        // JavaScript
        "node_modules",
        "dist",
        "build",
        "out",
        ".next",
        // Python
        "__pycache__",
        ".pytest_cache",
        ".mypy_cache",
        ".tox",
        ".eggs",
        ".ipynb_checkpoints",
        "venv",
        "env",
        ".env",
        ".venv",
        // IDEs & editors
        ".vscode",
        ".idea",
        ".vs",
        // CI metadata
        ".github",
        // Caches
        ".cache",
        ".gradle",
        ".terraform",
    ]
});

/// File extensions excluded before any content read
pub static EXCLUDED_EXTENSIONS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // Executables and native libraries
        "exe", "dll", "so", "dylib", "o", "obj", "a", "lib", "bin",
        // Images
        "png", "jpg", "jpeg", "gif", "svg", "ico", "bmp", "webp",
        // Fonts
        "woff", "woff2", "ttf", "eot", "otf",
        // Compiled intermediates
        "pyc", "pyd", "pyo", "class", "jar",
        // Archives
        "zip", "tar", "gz", "tgz", "rar", "7z",
        // Databases
        "sqlite", "sqlite3", "db",
        // Documents
        "pdf",
    ]
});

/// Why a path was kept out of the entry set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Inside (or named as) an excluded directory
    ExcludedDir,
    /// Extension is on the excluded list
    ExcludedExtension,
    /// Size exceeds the configured ceiling
    TooLarge,
    /// Content is binary (null byte in the sniff window or invalid UTF-8)
    Binary,
    /// Matched a user-supplied ignore pattern
    IgnoredPattern,
    /// Did not match the user's include patterns
    NotIncluded,
}

impl SkipReason {
    /// Stable tag used in diagnostics
    pub fn tag(&self) -> &'static str {
        match self {
            SkipReason::ExcludedDir => "excluded-dir",
            SkipReason::ExcludedExtension => "excluded-ext",
            SkipReason::TooLarge => "too-large",
            SkipReason::Binary => "binary",
            SkipReason::IgnoredPattern => "ignore-pattern",
            SkipReason::NotIncluded => "not-included",
        }
    }
}

/// Exclusion rules for a single run
#[derive(Debug, Clone)]
pub struct ExclusionPolicy {
    /// Maximum file size in bytes
    pub max_file_size: u64,
    /// User glob patterns matched against file names; matches are skipped
    pub ignore_patterns: Vec<String>,
    /// User glob patterns; when non-empty, only matching file names are kept
    pub include_patterns: Vec<String>,
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE_BYTES,
            ignore_patterns: Vec::new(),
            include_patterns: Vec::new(),
        }
    }
}

impl ExclusionPolicy {
    /// Create a policy with explicit settings
    pub fn new(
        max_file_size: u64,
        ignore_patterns: Vec<String>,
        include_patterns: Vec<String>,
    ) -> Self {
        Self {
            max_file_size,
            ignore_patterns,
            include_patterns,
        }
    }

    /// Check whether a directory name must be pruned from traversal
    pub fn excludes_dir(&self, name: &str) -> bool {
        if EXCLUDED_DIRS.iter().any(|&d| d == name) {
            return true;
        }
        self.ignore_patterns.iter().any(|p| glob_match(p, name))
    }

    /// Check a candidate file by name and size, before any content read.
    ///
    /// Returns the reason to skip it, or `None` when the file passes. Binary
    /// classification happens later, once content is available.
    pub fn check_file(&self, path: &Path, size: u64) -> Option<SkipReason> {
        let file_name = path.file_name().unwrap_or_default().to_string_lossy();

        if self.ignore_patterns.iter().any(|p| glob_match(p, &file_name)) {
            return Some(SkipReason::IgnoredPattern);
        }

        if !self.include_patterns.is_empty()
            && !self
                .include_patterns
                .iter()
                .any(|p| glob_match(p, &file_name))
        {
            return Some(SkipReason::NotIncluded);
        }

        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            let ext = ext.to_ascii_lowercase();
            if EXCLUDED_EXTENSIONS.iter().any(|&e| e == ext) {
                return Some(SkipReason::ExcludedExtension);
            }
        }

        if size > self.max_file_size {
            return Some(SkipReason::TooLarge);
        }

        None
    }

    /// Report whether a content sample looks binary.
    ///
    /// A null byte anywhere in the first [`BINARY_SNIFF_LEN`] bytes classifies
    /// the file as binary regardless of extension.
    pub fn is_binary_sample(sample: &[u8]) -> bool {
        sample
            .iter()
            .take(BINARY_SNIFF_LEN)
            .any(|&b| b == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_excluded_dirs() {
        let policy = ExclusionPolicy::default();
        assert!(policy.excludes_dir(".git"));
        assert!(policy.excludes_dir("target"));
        assert!(policy.excludes_dir("node_modules"));
        assert!(!policy.excludes_dir("src"));
    }

    #[test]
    fn test_extension_check() {
        let policy = ExclusionPolicy::default();
        let skip = policy.check_file(&PathBuf::from("logo.PNG"), 10);
        assert_eq!(skip, Some(SkipReason::ExcludedExtension));
        assert_eq!(policy.check_file(&PathBuf::from("main.rs"), 10), None);
    }

    #[test]
    fn test_size_ceiling() {
        let policy = ExclusionPolicy::default();
        let path = PathBuf::from("big.txt");
        assert_eq!(
            policy.check_file(&path, MAX_FILE_SIZE_BYTES + 1),
            Some(SkipReason::TooLarge)
        );
        assert_eq!(policy.check_file(&path, MAX_FILE_SIZE_BYTES), None);
    }

    #[test]
    fn test_user_patterns() {
        let policy = ExclusionPolicy::new(MAX_FILE_SIZE_BYTES, vec!["*.md".into()], vec![]);
        assert!(policy.check_file(&PathBuf::from("README.md"), 10).is_some());
        assert!(policy.check_file(&PathBuf::from("main.rs"), 10).is_none());

        let only_rs = ExclusionPolicy::new(MAX_FILE_SIZE_BYTES, vec![], vec!["*.rs".into()]);
        assert_eq!(
            only_rs.check_file(&PathBuf::from("notes.txt"), 10),
            Some(SkipReason::NotIncluded)
        );
        assert!(only_rs.check_file(&PathBuf::from("main.rs"), 10).is_none());
    }

    #[test]
    fn test_binary_sniff() {
        assert!(ExclusionPolicy::is_binary_sample(&[0x50, 0x4b, 0x00, 0x01]));
        assert!(!ExclusionPolicy::is_binary_sample(b"plain text content"));
    }

    #[test]
    fn test_skip_reason_tags() {
        assert_eq!(SkipReason::ExcludedDir.tag(), "excluded-dir");
        assert_eq!(SkipReason::ExcludedExtension.tag(), "excluded-ext");
        assert_eq!(SkipReason::TooLarge.tag(), "too-large");
        assert_eq!(SkipReason::Binary.tag(), "binary");
    }
}
