//! Converge - reconcile a source export into a JSON destination store.
//!
//! The binary is a thin shell: argument parsing, logging setup, wiring the
//! collaborators around the engine, and exit-code mapping.

use clap::{Args, Parser, Subcommand};
use converge_cli::config::{self, Config};
use converge_cli::error::Result;
use converge_cli::persister::StorePersister;
use converge_cli::progress::BarProgress;
use converge_cli::report;
use converge_cli::repository::{SourceFileRepository, StoreRepository};
use converge_cli::store::{JsonStore, StoreAttributes};
use converge_cli::transformer::{SourceTransformer, StoreTransformer};
use converge_engine::{ComparisonConfig, Importer, ImportRequest, Syncer};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "converge", version, about = "Reconcile a source export into a destination store")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import records from a source export into the destination store
    Import(ImportArgs),
    /// Remove every entry from the destination store
    Reset(ResetArgs),
}

#[derive(Args)]
struct ImportArgs {
    /// Path to the source export (a JSON array of raw records)
    #[arg(long, value_name = "FILE")]
    source: Option<PathBuf>,
    /// Path to the destination store file
    #[arg(long, value_name = "FILE")]
    store: Option<PathBuf>,
    /// Analyse and report without touching the store
    #[arg(long)]
    dry_run: bool,
    /// Delete store entries that are missing from the source
    #[arg(long)]
    delete: bool,
    /// Scalar fields compared to decide whether an entry needs an update
    #[arg(long = "compare-field", value_name = "KEY")]
    compare_fields: Vec<String>,
}

#[derive(Args)]
struct ResetArgs {
    /// Path to the destination store file
    #[arg(long, value_name = "FILE")]
    store: Option<PathBuf>,
    /// Report what would be removed without touching the store
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "converge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            1
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Import(args) => run_import(args),
        Command::Reset(args) => run_reset(args),
    }
}

fn run_import(args: ImportArgs) -> Result<i32> {
    let config = Config::resolve(args.source, args.store)?;
    tracing::info!(
        source = %config.source_path.display(),
        store = %config.store_path.display(),
        dry_run = args.dry_run,
        "starting import"
    );

    let store = Rc::new(RefCell::new(JsonStore::load(&config.store_path)?));

    let comparison = if args.compare_fields.is_empty() {
        ComparisonConfig::default()
    } else {
        ComparisonConfig::with_field_keys(args.compare_fields)
    };
    let syncer = Syncer::new(StorePersister::new(Rc::clone(&store)), comparison)
        .with_attribute_store(Box::new(StoreAttributes::new(Rc::clone(&store))));
    let mut importer = Importer::new(
        Box::new(SourceFileRepository::new(config.source_path.clone())),
        Box::new(SourceTransformer),
        Box::new(StoreRepository::new(Rc::clone(&store))),
        Box::new(StoreTransformer),
        syncer,
    );

    let request = ImportRequest {
        dry_run: args.dry_run,
        deletion_enabled: args.delete,
    };
    let mut progress = BarProgress::new(args.dry_run);
    let outcome = importer.import(request, &mut progress);

    if !args.dry_run {
        store.borrow_mut().save()?;
    }
    report::print_import(&outcome);
    Ok(report::exit_code(&outcome))
}

fn run_reset(args: ResetArgs) -> Result<i32> {
    let store_path = config::resolve_store(args.store)?;
    let mut store = JsonStore::load(&store_path)?;

    if args.dry_run {
        tracing::info!(
            entries = store.entry_count(),
            "dry-run: entries that would be removed"
        );
    } else {
        let removed = store.reset();
        store.save()?;
        tracing::info!(entries = removed, "store reset");
    }
    Ok(0)
}
