/*!
 * Utility functions for ctxpack
 */

use std::path::PathBuf;

use walkdir::WalkDir;

use crate::policy::ExclusionPolicy;

/// Count candidate files for progress tracking.
///
/// Applies only the cheap name/extension/size checks; binary reclassification
/// happens later, so the count is an upper bound on the included set.
pub fn count_files(inputs: &[PathBuf], policy: &ExclusionPolicy) -> u64 {
    let mut count = 0;

    for input in inputs {
        if input.is_file() {
            let size = input.metadata().map(|m| m.len()).unwrap_or(0);
            if policy.check_file(input, size).is_none() {
                count += 1;
            }
        } else if input.is_dir() {
            let walker = WalkDir::new(input)
                .follow_links(false)
                .into_iter()
                .filter_entry(|entry| {
                    if entry.depth() == 0 || !entry.file_type().is_dir() {
                        return true;
                    }
                    !policy.excludes_dir(&entry.file_name().to_string_lossy())
                });
            for entry in walker.filter_map(Result::ok) {
                if !entry.file_type().is_file() {
                    continue;
                }
                let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                if policy.check_file(entry.path(), size).is_none() {
                    count += 1;
                }
            }
        }
    }

    count
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(512), "512 bytes");
        assert_eq!(format_file_size(2048), "2.00 KB");
        assert_eq!(format_file_size(3 * 1024 * 1024), "3.00 MB");
    }
}
