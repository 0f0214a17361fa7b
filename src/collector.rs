/*!
 * File collection for ctxpack
 *
 * Walks the input paths, applies the exclusion policy, reads surviving file
 * contents in parallel, and yields a deterministic, path-sorted entry set.
 */

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use indicatif::ProgressBar;
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::error::{PackError, Result};
use crate::policy::{ExclusionPolicy, SkipReason};
use crate::report::FileReportInfo;
use crate::utils::format_file_size;

/// A file selected for inclusion in the packed document
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Path relative to the input that produced it
    pub relative_path: PathBuf,
    /// Absolute path on disk
    pub absolute_path: PathBuf,
    /// Decoded UTF-8 content
    pub content: String,
    /// Size in bytes
    pub size: u64,
}

/// Collector statistics
#[derive(Debug, Clone, Default)]
pub struct CollectorStats {
    /// Number of files included in the entry set
    pub files_included: usize,
    /// Files reclassified as binary and excluded
    pub binary_skipped: usize,
    /// Files over the size ceiling
    pub too_large_skipped: usize,
    /// Files skipped by name, extension, or pattern checks
    pub excluded_skipped: usize,
    /// Files that could not be read (permissions, I/O failure)
    pub unreadable_skipped: usize,
    /// Input paths that did not exist
    pub missing_inputs: usize,
    /// Line/char details per included file, keyed by relative path
    pub file_details: HashMap<String, FileReportInfo>,
}

/// A candidate discovered during traversal, before its content is read
struct Candidate {
    absolute_path: PathBuf,
    relative_path: PathBuf,
    size: u64,
}

/// Collector for the input paths of a run
pub struct Collector {
    policy: ExclusionPolicy,
    progress: Arc<ProgressBar>,
    stats: Arc<Mutex<CollectorStats>>,
}

impl Collector {
    /// Create a new collector
    pub fn new(policy: ExclusionPolicy, progress: Arc<ProgressBar>) -> Self {
        Self {
            policy,
            progress,
            stats: Arc::new(Mutex::new(CollectorStats::default())),
        }
    }

    /// Get collector statistics
    pub fn get_statistics(&self) -> CollectorStats {
        self.stats.lock().unwrap().clone()
    }

    /// Collect entries from the given input paths.
    ///
    /// Missing inputs are reported and skipped; the run fails only when every
    /// input is missing. The returned entries are deduplicated by absolute
    /// path and sorted by relative path.
    pub fn collect(&self, inputs: &[PathBuf]) -> Result<Vec<FileEntry>> {
        let mut candidates = Vec::new();
        let mut seen = HashSet::new();
        let mut usable_inputs = 0usize;

        for input in inputs {
            if !input.exists() {
                eprintln!("Warning: input path not found: {}", input.display());
                self.stats.lock().unwrap().missing_inputs += 1;
                continue;
            }
            usable_inputs += 1;

            if input.is_file() {
                self.push_file_input(input, &mut candidates, &mut seen);
            } else if input.is_dir() {
                self.walk_directory(input, &mut candidates, &mut seen);
            }
        }

        if usable_inputs == 0 {
            return Err(PackError::NoInputs(
                "none of the supplied paths exist".to_string(),
            ));
        }

        // Content reads are embarrassingly parallel; ordering is restored by
        // the sort below, never taken from completion order.
        let mut entries: Vec<FileEntry> = candidates
            .par_iter()
            .filter_map(|candidate| self.read_candidate(candidate))
            .collect();

        entries.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        self.stats.lock().unwrap().files_included = entries.len();
        Ok(entries)
    }

    /// Queue a file passed directly as an input path
    fn push_file_input(
        &self,
        path: &Path,
        candidates: &mut Vec<Candidate>,
        seen: &mut HashSet<PathBuf>,
    ) {
        let size = match fs::metadata(path) {
            Ok(m) => m.len(),
            Err(e) => {
                eprintln!("Warning: cannot stat {}: {}", path.display(), e);
                self.stats.lock().unwrap().unreadable_skipped += 1;
                return;
            }
        };

        if let Some(reason) = self.policy.check_file(path, size) {
            self.note_skip(path, size, reason);
            return;
        }

        let absolute = match fs::canonicalize(path) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Warning: cannot resolve {}: {}", path.display(), e);
                self.stats.lock().unwrap().unreadable_skipped += 1;
                return;
            }
        };
        if !seen.insert(absolute.clone()) {
            return;
        }

        let relative = PathBuf::from(path.file_name().unwrap_or_default());
        candidates.push(Candidate {
            absolute_path: absolute,
            relative_path: relative,
            size,
        });
    }

    /// Walk a directory input depth-first with children sorted by name.
    ///
    /// Excluded directories are pruned outright, so dependency caches are
    /// never descended into. Symlinks are not followed.
    fn walk_directory(
        &self,
        root: &Path,
        candidates: &mut Vec<Candidate>,
        seen: &mut HashSet<PathBuf>,
    ) {
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                !self.policy.excludes_dir(&name)
            });

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    eprintln!("Warning: traversal error under {}: {}", root.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);

            if let Some(reason) = self.policy.check_file(path, size) {
                self.note_skip(path, size, reason);
                continue;
            }

            let absolute = match fs::canonicalize(path) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Warning: cannot resolve {}: {}", path.display(), e);
                    self.stats.lock().unwrap().unreadable_skipped += 1;
                    continue;
                }
            };
            if !seen.insert(absolute.clone()) {
                continue;
            }

            let relative = path
                .strip_prefix(root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| path.to_path_buf());
            candidates.push(Candidate {
                absolute_path: absolute,
                relative_path: relative,
                size,
            });
        }
    }

    /// Read a candidate's content, classifying binary data on the way.
    ///
    /// Returns `None` when the candidate turns out to be binary or unreadable;
    /// both outcomes are tallied, neither aborts the run.
    fn read_candidate(&self, candidate: &Candidate) -> Option<FileEntry> {
        self.progress.inc(1);

        let bytes = match fs::read(&candidate.absolute_path) {
            Ok(b) => b,
            Err(e) => {
                eprintln!(
                    "Warning: cannot read {}: {}",
                    candidate.absolute_path.display(),
                    e
                );
                self.stats.lock().unwrap().unreadable_skipped += 1;
                return None;
            }
        };

        if ExclusionPolicy::is_binary_sample(&bytes) {
            self.stats.lock().unwrap().binary_skipped += 1;
            return None;
        }

        let content = match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(_) => {
                // Decode failure reclassifies the file as binary, silently.
                self.stats.lock().unwrap().binary_skipped += 1;
                return None;
            }
        };

        let rel_display = candidate.relative_path.to_string_lossy().to_string();
        self.progress.set_message(rel_display.clone());

        {
            let mut stats = self.stats.lock().unwrap();
            stats.file_details.insert(
                rel_display,
                FileReportInfo {
                    lines: content.lines().count(),
                    chars: content.chars().count(),
                },
            );
        }

        Some(FileEntry {
            relative_path: candidate.relative_path.clone(),
            absolute_path: candidate.absolute_path.clone(),
            size: candidate.size,
            content,
        })
    }

    /// Record a pre-read skip and warn where it is worth the noise
    fn note_skip(&self, path: &Path, size: u64, reason: SkipReason) {
        let mut stats = self.stats.lock().unwrap();
        match reason {
            SkipReason::TooLarge => {
                stats.too_large_skipped += 1;
                drop(stats);
                eprintln!(
                    "Skipping large file ({}): {}",
                    format_file_size(size),
                    path.display()
                );
            }
            SkipReason::Binary => stats.binary_skipped += 1,
            _ => stats.excluded_skipped += 1,
        }
    }
}

/// Convenience wrapper for library callers: collect with a hidden progress
/// bar and fresh statistics.
pub fn collect_entries(policy: ExclusionPolicy, inputs: &[PathBuf]) -> Result<Vec<FileEntry>> {
    let collector = Collector::new(policy, Arc::new(ProgressBar::hidden()));
    collector.collect(inputs)
}

impl FileEntry {
    /// Relative path as a display string with forward slashes
    pub fn relative_display(&self) -> String {
        let s = self.relative_path.to_string_lossy().to_string();
        if std::path::MAIN_SEPARATOR == '/' {
            s
        } else {
            s.replace(std::path::MAIN_SEPARATOR, "/")
        }
    }
}
