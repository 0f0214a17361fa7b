/*!
 * Run reporting for ctxpack
 *
 * Emits the machine-parseable summary lines consumed by the editor wrapper,
 * and an optional console table with per-file detail.
 */

use std::time::Duration;

use clap::ValueEnum;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::collector::CollectorStats;

/// Per-file line/char detail feeding the table report
#[derive(Debug, Clone, Default)]
pub struct FileReportInfo {
    /// Number of lines in the file
    pub lines: usize,
    /// Number of characters in the file
    pub chars: usize,
}

/// The run artifact read back by the external caller
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Number of files included in the document
    pub files_processed: usize,
    /// Length of the emitted document string, in bytes of UTF-8
    pub total_chars: usize,
    /// Detected project kind label: Rust, Python, mixed, or unknown
    pub project_kind: String,
}

impl RunSummary {
    /// The three lines the caller parses, in fixed order
    pub fn summary_lines(&self) -> String {
        format!(
            "Files processed: {}\nTotal size: {} characters\nProject type: {}",
            self.files_processed, self.total_chars, self.project_kind
        )
    }
}

/// Format of the report output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Only the parseable summary lines
    Summary,
    /// Summary lines plus console tables
    Table,
}

/// Report generator for run results
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Generate the report string for this run
    pub fn generate(
        &self,
        summary: &RunSummary,
        stats: &CollectorStats,
        duration: Duration,
    ) -> String {
        match self.format {
            ReportFormat::Summary => summary.summary_lines(),
            ReportFormat::Table => format!(
                "{}\n{}\n\n{}",
                self.files_table(stats),
                self.totals_table(summary, stats, duration),
                summary.summary_lines()
            ),
        }
    }

    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    fn totals_table(
        &self,
        summary: &RunSummary,
        stats: &CollectorStats,
        duration: Duration,
    ) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,
            #[tabled(rename = "Value")]
            value: String,
        }

        let mut rows = vec![
            SummaryRow {
                key: "Process Time".to_string(),
                value: format!("{:.4?}", duration),
            },
            SummaryRow {
                key: "Files Processed".to_string(),
                value: self.format_number(summary.files_processed),
            },
            SummaryRow {
                key: "Document Size".to_string(),
                value: format!("{} chars", self.format_number(summary.total_chars)),
            },
            SummaryRow {
                key: "Project Type".to_string(),
                value: summary.project_kind.clone(),
            },
        ];

        if stats.binary_skipped > 0 {
            rows.push(SummaryRow {
                key: "Binary Skipped".to_string(),
                value: self.format_number(stats.binary_skipped),
            });
        }
        if stats.too_large_skipped > 0 {
            rows.push(SummaryRow {
                key: "Oversized Skipped".to_string(),
                value: self.format_number(stats.too_large_skipped),
            });
        }
        if stats.unreadable_skipped > 0 {
            rows.push(SummaryRow {
                key: "Unreadable Skipped".to_string(),
                value: self.format_number(stats.unreadable_skipped),
            });
        }

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));
        table.to_string()
    }

    fn files_table(&self, stats: &CollectorStats) -> String {
        #[derive(Tabled)]
        struct FileRow {
            #[tabled(rename = "File Path")]
            path: String,
            #[tabled(rename = "Lines")]
            lines: String,
            #[tabled(rename = "Chars")]
            chars: String,
        }

        let mut files: Vec<_> = stats.file_details.iter().collect();
        files.sort_by(|(path_a, a), (path_b, b)| {
            b.chars.cmp(&a.chars).then_with(|| path_a.cmp(path_b))
        });

        // Long runs list only the heaviest files.
        let shown = if files.len() > 15 {
            &files[0..10]
        } else {
            &files[..]
        };

        let rows: Vec<FileRow> = shown
            .iter()
            .map(|(path, info)| FileRow {
                path: (*path).clone(),
                lines: self.format_number(info.lines),
                chars: self.format_number(info.chars),
            })
            .collect();

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));
        table.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_lines_shape() {
        let summary = RunSummary {
            files_processed: 3,
            total_chars: 1234,
            project_kind: "Rust".to_string(),
        };
        assert_eq!(
            summary.summary_lines(),
            "Files processed: 3\nTotal size: 1234 characters\nProject type: Rust"
        );
    }

    #[test]
    fn test_summary_report_is_parseable() {
        let summary = RunSummary {
            files_processed: 0,
            total_chars: 42,
            project_kind: "unknown".to_string(),
        };
        let report = Reporter::new(ReportFormat::Summary).generate(
            &summary,
            &CollectorStats::default(),
            Duration::from_millis(5),
        );
        assert!(report.contains("Files processed: 0"));
        assert!(report.contains("Total size: 42 characters"));
        assert!(report.contains("Project type: unknown"));
    }
}
