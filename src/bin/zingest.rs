//! Zeek log ingest CLI - Main binary entry point

use std::path::Path;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use zingest::cli::args::{Command, parse_args};
use zingest::cli::output::{format_json, print_import_results, print_manifest_text};
use zingest::io::metastore::Metastore;
use zingest::services::import::{CountingImporter, ImportOptions, assign_jobs, run_import};
use zingest::{Classifier, Error};

fn main() {
    // Initialize logger (controlled by RUST_LOG environment variable)
    // Example: RUST_LOG=debug zingest scan /opt/zeek/logs
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
        Command::Import(import_args) => handle_import(import_args),
    };

    process::exit(exit_code);
}

fn handle_scan(args: &zingest::cli::args::ScanArgs) -> i32 {
    let classifier = Classifier::standard();

    let summary = match zingest::walk_logs(&args.path, &classifier) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            return exit_code_for(&e);
        }
    };

    if args.json {
        println!("{}", format_json(&summary));
    } else {
        print_manifest_text(&summary);
    }

    if summary.errors.is_empty() { 0 } else { 3 }
}

fn handle_import(args: &zingest::cli::args::ImportArgs) -> i32 {
    let classifier = Classifier::standard();

    let summary = match zingest::walk_logs(&args.path, &classifier) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            return exit_code_for(&e);
        }
    };

    let metastore_path = Path::new(&args.metastore);
    let mut metastore = match Metastore::load(metastore_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: cannot load metastore {}: {e}", args.metastore);
            return 4;
        }
    };

    // rolling is decided at database creation; later runs read it back
    let rolling = match metastore.ensure_database(&args.database, args.rolling) {
        Ok(flag) => flag,
        Err(e) => {
            eprintln!("Error: {e}");
            return 2;
        }
    };

    if !args.quiet {
        eprintln!(
            "Importing {} into {} (rolling: {rolling})",
            summary.root, args.database
        );
    }

    // import ids exist only once the manifest is complete
    let jobs = assign_jobs(&summary.manifest);

    let cancel = Arc::new(AtomicBool::new(false));
    let opts = ImportOptions {
        workers: args.workers,
    };

    let results = match run_import(&jobs, &CountingImporter, &opts, &cancel) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Error: {e}");
            cancel.store(true, Ordering::SeqCst);
            return exit_code_for(&e);
        }
    };

    for result in &results {
        metastore.record_import(&args.database, result);
    }
    if let Err(e) = metastore.save(metastore_path) {
        eprintln!("Error: cannot save metastore {}: {e}", args.metastore);
        return 4;
    }

    if !args.quiet {
        print_import_results(&results);
        eprintln!(
            "Imported {} bucket(s), {} file(s) skipped during walk",
            results.len(),
            summary.errors.len()
        );
    }

    if summary.errors.is_empty() { 0 } else { 3 }
}

fn exit_code_for(error: &Error) -> i32 {
    match error {
        Error::InvalidInput(_) | Error::DirIsEmpty(_) | Error::NoValidFilesFound(_) => 2,
        _ => 4,
    }
}

fn print_help() {
    println!("Zeek log ingest (zingest) - Build day/hour import manifests from sensor logs");
    println!();
    println!("USAGE:");
    println!("    zingest scan <PATH> [OPTIONS]");
    println!("    zingest import <PATH> --database <DB> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    scan      Walk a log tree and print the day/hour manifest");
    println!("    import    Build the manifest and run one import per hour bucket");
    println!();
    println!("GLOBAL OPTIONS:");
    println!("    -h, --help                Show this help message");
    println!("    -v, --version             Show version information");
    println!();
    println!("SCAN OPTIONS:");
    println!("    --json                    Emit machine-readable output");
    println!();
    println!("IMPORT OPTIONS:");
    println!("    --database <DB>           Destination database name (required)");
    println!("    --rolling                 Create the database in rolling retention mode");
    println!("    --metastore <FILE>        Import metadata store (default: zingest-meta.json)");
    println!("    --workers <N>             Concurrent bucket imports (default: 4)");
    println!("    --quiet                   Suppress non-error output");
    println!();
    println!("EXAMPLES:");
    println!("    zingest scan /opt/zeek/logs");
    println!("    zingest import /opt/zeek/logs --database corp_edge --rolling");
    println!("    zingest import /opt/zeek/logs/2024-05-01 --database corp_edge --workers 8");
}

fn print_version() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const BUILD_TARGET: &str = env!("BUILD_TARGET");

    println!("zingest {VERSION}");
    println!("Commit: {GIT_HASH}");
    println!("Target: {BUILD_TARGET}");

    #[cfg(debug_assertions)]
    println!("Build: debug");
    #[cfg(not(debug_assertions))]
    println!("Build: release");
}
