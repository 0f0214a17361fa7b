/*!
 * Command-line interface for CtxPack
 */

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::ThreadPoolBuilder;

use ctxpack::clipboard::copy_to_clipboard;
use ctxpack::collector::Collector;
use ctxpack::config::{Args, Config, OutputTarget};
use ctxpack::metadata::MetadataDetector;
use ctxpack::report::{Reporter, RunSummary};
use ctxpack::tree::TreeNode;
use ctxpack::utils::count_files;
use ctxpack::writer::DocumentWriter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> ctxpack::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Generate shell completions and exit when requested
    if let Some(shell) = args.generate {
        let mut cmd = Args::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    // Create configuration
    let config = Config::from_args(args);

    // Validate configuration
    config.validate()?;

    // Configure thread pool
    if let Err(e) = ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build_global()
    {
        eprintln!("Warning: Failed to set thread pool size: {}", e);
    }

    // Progress bar draws to stderr, so it never touches the document
    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos}/{len} ({percent}%) Elapsed: {elapsed_precise}")
            .unwrap(),
    );
    progress.enable_steady_tick(std::time::Duration::from_millis(100));
    progress.set_prefix("Packing");

    let policy = config.policy();
    progress.set_length(count_files(&config.input_paths, &policy));
    progress.set_message("Collecting files...");

    let start_time = Instant::now();

    // Collect the entry set
    let collector = Collector::new(policy, Arc::new(progress.clone()));
    let entries = collector.collect(&config.input_paths)?;

    // Detect project metadata around the inputs
    let detector = MetadataDetector::new(config.cargo_manifest.clone(), config.pyproject.clone());
    let projects = detector.detect(&config.input_paths);

    // Render the tree and assemble the document
    let tree = TreeNode::from_entries(&entries);
    let document = DocumentWriter::new().build(&entries, &projects, &tree);

    let duration = start_time.elapsed();
    progress.finish_and_clear();

    if entries.is_empty() {
        eprintln!("Notice: no files matched after exclusion; emitting an empty document");
    }

    // Place the document, whole, only after assembly
    match config.output {
        OutputTarget::Clipboard => {
            copy_to_clipboard(&document)?;
            eprintln!("Document copied to clipboard");
        }
        OutputTarget::Stdout => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(document.as_bytes())?;
            handle.write_all(b"\n")?;
        }
    }

    let summary = RunSummary {
        files_processed: entries.len(),
        total_chars: document.len(),
        project_kind: projects.kind_label().to_string(),
    };

    // Summary lines share stdout with the caller's parser, except when the
    // document itself occupies stdout.
    let reporter = Reporter::new(config.report_format);
    let report = reporter.generate(&summary, &collector.get_statistics(), duration);
    match config.output {
        OutputTarget::Clipboard => println!("{}", report),
        OutputTarget::Stdout => eprintln!("{}", report),
    }

    Ok(())
}
