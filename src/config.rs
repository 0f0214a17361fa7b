/*!
 * Configuration handling for ctxpack
 */

use std::io;
use std::path::PathBuf;

use clap::Parser;
use clap_complete::Shell;

use crate::policy::{ExclusionPolicy, MAX_FILE_SIZE_BYTES};
use crate::report::ReportFormat;

/// Command-line arguments for ctxpack
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "ctxpack",
    version = env!("CARGO_PKG_VERSION"),
    about = "Pack source files into a single document for LLM context",
    long_about = "Collects the given files and directories, discovers nearby project manifests, and assembles one structured text document suitable for pasting into an LLM conversation."
)]
pub struct Args {
    /// Files or directories to pack
    #[clap(required_unless_present = "generate")]
    pub paths: Vec<String>,

    /// Explicit Cargo.toml path, when the caller has already located it
    #[clap(long)]
    pub cargo_manifest: Option<String>,

    /// Explicit Python project file (pyproject.toml, setup.py, or requirements.txt)
    #[clap(long)]
    pub pyproject: Option<String>,

    /// Print the document to stdout instead of copying it to the clipboard
    #[clap(long)]
    pub stdout: bool,

    /// Maximum file size in bytes; larger files are excluded
    #[clap(long, default_value_t = MAX_FILE_SIZE_BYTES)]
    pub max_file_size: u64,

    /// Comma-separated list of file-name patterns to ignore
    #[clap(long, value_delimiter = ',')]
    pub ignore_patterns: Vec<String>,

    /// Comma-separated list of patterns to include (if specified, only matching files are included)
    #[clap(long, value_delimiter = ',')]
    pub include_patterns: Vec<String>,

    /// Number of threads to use for file reads
    #[clap(long, default_value = "4")]
    pub threads: usize,

    /// Report format printed after the run
    #[clap(long, value_enum, default_value_t = ReportFormat::Summary)]
    pub report: ReportFormat,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Where the assembled document goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTarget {
    /// System clipboard (primary mode)
    Clipboard,
    /// Standard output; the summary moves to stderr
    Stdout,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Input files and directories, in caller order
    pub input_paths: Vec<PathBuf>,

    /// Explicit Cargo manifest override
    pub cargo_manifest: Option<PathBuf>,

    /// Explicit Python project file override
    pub pyproject: Option<PathBuf>,

    /// Document destination
    pub output: OutputTarget,

    /// Maximum file size in bytes
    pub max_file_size: u64,

    /// Patterns to ignore
    pub ignore_patterns: Vec<String>,

    /// Patterns to include (if empty, include all)
    pub include_patterns: Vec<String>,

    /// Number of threads to use for processing
    pub num_threads: usize,

    /// Report format
    pub report_format: ReportFormat,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Self {
        Self {
            input_paths: args.paths.iter().map(PathBuf::from).collect(),
            cargo_manifest: args.cargo_manifest.map(PathBuf::from),
            pyproject: args.pyproject.map(PathBuf::from),
            output: if args.stdout {
                OutputTarget::Stdout
            } else {
                OutputTarget::Clipboard
            },
            max_file_size: args.max_file_size,
            ignore_patterns: args.ignore_patterns,
            include_patterns: args.include_patterns,
            num_threads: args.threads,
            report_format: args.report,
        }
    }

    /// The exclusion policy for this run
    pub fn policy(&self) -> ExclusionPolicy {
        ExclusionPolicy::new(
            self.max_file_size,
            self.ignore_patterns.clone(),
            self.include_patterns.clone(),
        )
    }

    /// Validate the configuration
    pub fn validate(&self) -> io::Result<()> {
        if self.input_paths.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "at least one input path is required",
            ));
        }

        if self.num_threads == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "thread count must be at least 1",
            ));
        }

        // Explicit manifest overrides were located by the caller; a missing
        // one is a caller bug, not a detection miss.
        if let Some(path) = &self.cargo_manifest {
            if !path.exists() {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("Cargo manifest not found: {}", path.display()),
                ));
            }
        }
        if let Some(path) = &self.pyproject {
            if !path.exists() {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("Python project file not found: {}", path.display()),
                ));
            }
        }

        Ok(())
    }
}
