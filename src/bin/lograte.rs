//! HTTP status rate CLI (lograte) - Main binary entry point

use lograte::cli::args::{Command, ReportArgs, ScanArgs, parse_args};
use lograte::cli::output::{
    format_checkpoint, format_json, format_report_json, format_report_text, format_text,
};
use lograte::io::report::{ScanReport, read_report, write_report};
use lograte::services::store::fs::FsObjectStore;
use lograte::{Checkpoint, ExtractorKind, Granularity, ScanOptions};
use std::process;
use std::str::FromStr;
use std::sync::Arc;

fn main() {
    // Initialize logger (controlled by RUST_LOG environment variable)
    // Example: RUST_LOG=debug lograte scan s3://logs/2024 --store-root /mnt/buckets
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return;
    }

    match args[1].as_str() {
        "--help" | "-h" => {
            print_help();
            return;
        }
        "--version" | "-v" => {
            print_version();
            return;
        }
        _ => {}
    }

    let cli_args = match parse_args(&args) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Use --help for usage information");
            process::exit(2);
        }
    };

    let exit_code = match &cli_args.command {
        Command::Scan(scan_args) => handle_scan(scan_args),
        Command::Report(report_args) => handle_report(report_args),
    };

    process::exit(exit_code);
}

fn handle_scan(args: &ScanArgs) -> i32 {
    let Some(store_root) = args.store_root.as_deref() else {
        eprintln!("Error: --store-root is required for scan command");
        eprintln!("Example: lograte scan s3://logs/2024 --store-root /mnt/buckets");
        return 2;
    };

    let extractor = match ExtractorKind::from_str(&args.extractor) {
        Ok(kind) => kind,
        Err(err) => {
            eprintln!("Error: {err}. Use 'literal' or 'regex'");
            return 2;
        }
    };

    let granularity = match args.granularity.as_deref().map(Granularity::from_str) {
        None => Granularity::default(),
        Some(Ok(granularity)) => granularity,
        Some(Err(err)) => {
            eprintln!("Error: {err}");
            return 2;
        }
    };

    let mut opts = ScanOptions {
        extractor,
        granularity,
        ..ScanOptions::default()
    };
    if let Some(workers) = args.workers {
        opts.workers = workers;
    }

    if !args.quiet {
        opts.checkpoint_notifier = Some(Arc::new(move |checkpoint: &Checkpoint| {
            eprintln!("{}", format_checkpoint(checkpoint, granularity));
        }));
        eprintln!("Scanning: {}", args.location);
    }

    let store = FsObjectStore::new(store_root);
    let summary = match lograte::scan_summary(&args.location, &store, &opts) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            return match e {
                lograte::Error::InvalidInput(_) => 2,
                lograte::Error::Cancelled => 3,
                _ => 4,
            };
        }
    };

    if args.json {
        println!("{}", format_json(&summary));
    } else {
        println!("{}", format_text(&summary));
    }

    if let Some(report_path) = &args.report {
        let report = ScanReport::from_summary(&summary, granularity);
        if let Err(e) = write_report(report_path, &report) {
            eprintln!("Error: Failed to save report: {e}");
            return 4;
        }
        if !args.quiet {
            eprintln!("Report saved: {report_path}");
        }
    }

    0
}

fn handle_report(args: &ReportArgs) -> i32 {
    let report = match read_report(&args.from_report) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error reading report: {e}");
            return 4;
        }
    };

    if args.json {
        println!("{}", format_report_json(&report));
    } else {
        println!("{}", format_report_text(&report));
    }

    0
}

fn print_help() {
    println!("HTTP status rate CLI (lograte) - Status class rates from NDJSON logs in a blob store");
    println!();
    println!("USAGE:");
    println!("    lograte scan <LOCATION> --store-root <DIR> [OPTIONS]");
    println!("    lograte report <REPORT> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    scan      List objects under a location and compute 2xx/4xx/5xx rates");
    println!("    report    Display a report saved by a previous scan");
    println!();
    println!("GLOBAL OPTIONS:");
    println!("    -h, --help                 Show this help message");
    println!("    -v, --version              Show version information");
    println!();
    println!("SCAN OPTIONS:");
    println!("    --store-root <DIR>        Directory holding one sub-directory per bucket (required)");
    println!("    --extractor <NAME>        Status extraction: literal (default) or regex");
    println!("    --granularity <STEP>      Checkpoint step: bytes such as 5GiB (default) or 10files");
    println!("    --workers <N>             Objects fetched and parsed in parallel (default: 8)");
    println!("    --report <FILE>           Save rates and checkpoints to a Parquet report");
    println!("    --json                    Emit machine-readable output");
    println!("    --quiet                   Suppress progress output");
    println!();
    println!("REPORT OPTIONS:");
    println!("    --json                    Emit machine-readable output");
    println!();
    println!("LOCATION:");
    println!("    s3://bucket[/prefix] or store://bucket[/prefix]");
    println!();
    println!("EXAMPLES:");
    println!("    lograte scan s3://logs/2024/10 --store-root /mnt/buckets");
    println!("    lograte scan s3://logs --store-root /data --granularity 10files --json");
    println!("    lograte scan s3://logs --store-root /data --report /tmp/logs.parquet");
    println!("    lograte report /tmp/logs.parquet --json");
}

fn print_version() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_DATE: &str = env!("GIT_DATE");
    const BUILD_TARGET: &str = env!("BUILD_TARGET");

    println!("lograte {VERSION}");
    println!("Commit: {GIT_HASH} ({GIT_DATE})");
    println!("Target: {BUILD_TARGET}");

    #[cfg(debug_assertions)]
    println!("Build: debug");
    #[cfg(not(debug_assertions))]
    println!("Build: release");
}
