//! # tgspyder CLI
//!
//! Command-line interface for the tgspyder library.

use std::process;

use clap::{CommandFactory, Parser as ClapParser};
use tracing_subscriber::EnvFilter;

use tgspyder::SpyderError;
use tgspyder::cli::Args;
use tgspyder::client::{SnapshotClient, TelegramApi};
use tgspyder::config::SpyderConfig;
use tgspyder::core::{
    CrawlReport, OutputLayout, UserLookup, UserReport, crawl_history, enumerate_members,
    lookup_user, resolve_sticker_pack, resolve_target,
};
use tgspyder::message::Entity;
use tgspyder::progress::stderr_progress;

const DEFAULT_FILTER: &str = "warn,tgspyder=info";
const VERBOSE_FILTER: &str = "info,tgspyder=debug";

fn main() {
    let args = <Args as ClapParser>::parse();
    init_tracing(args.verbose);

    if !args.has_work() {
        let _ = Args::command().print_help();
        process::exit(2);
    }

    match run(&args) {
        Ok(0) => println!("✅ Done."),
        Ok(failed) => {
            eprintln!("❌ {failed} operation(s) failed");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Runs every requested operation and returns how many failed.
fn run(args: &Args) -> Result<usize, SpyderError> {
    let config = args.resolve_config()?;
    let snapshot_dir = config.snapshot_dir.clone().ok_or_else(|| {
        SpyderError::Unexpected(
            "no data source: pass --snapshot <DIR> or set snapshot_dir in the config file".into(),
        )
    })?;
    let client = SnapshotClient::open(&snapshot_dir)?;
    let layout = OutputLayout::from_config(&config);

    print_header(&config, client.name());

    let mut failed = 0;

    if let Some(identifier) = &args.user_lookup {
        failed += report(run_user_lookup(&client, identifier));
    }

    if let Some(pack) = &args.sticker_pack {
        failed += report(run_sticker_pack(&client, pack));
    }

    if let Some(target) = &args.target {
        println!("🎯 Resolving target {target}...");
        match resolve_target(&client, target) {
            Ok(entity) => {
                println!("   Resolved {} '{}' (id {})", entity.kind, entity.output_name(), entity.id);
                failed += run_target(&client, &entity, &layout, args);
            }
            Err(e) => failed += report::<()>(Err(e)),
        }
    }

    Ok(failed)
}

fn print_header(config: &SpyderConfig, source: &str) {
    println!("🕷️  tgspyder v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if let Some(dir) = &config.snapshot_dir {
        println!("📂 Source:  {} ({})", source, dir.display());
    }
    println!("💾 Output:  {}", config.output_root.display());
    println!();
}

/// Prints a failed operation and counts it.
fn report<T>(result: Result<T, SpyderError>) -> usize {
    match result {
        Ok(_) => 0,
        Err(e) => {
            eprintln!("❌ {}", e);
            1
        }
    }
}

fn run_user_lookup(client: &dyn TelegramApi, identifier: &str) -> Result<(), SpyderError> {
    println!("🧍 Looking up user {identifier}...");
    match lookup_user(client, identifier)? {
        UserLookup::Found(user) => {
            println!("👤 User Lookup Result");
            println!("{}", UserReport(&user));
        }
        UserLookup::NotAUser(entity) => {
            println!("⚠️  '{identifier}' resolved but is not a user ({}).", entity.kind);
        }
    }
    println!();
    Ok(())
}

fn run_sticker_pack(client: &dyn TelegramApi, pack: &str) -> Result<(), SpyderError> {
    let report = resolve_sticker_pack(client, pack)?;
    println!("🎭 Resolved sticker pack input '{}' -> {}", report.input, report.short_name);
    println!("{report}");
    println!();
    Ok(())
}

/// Runs the target operations in order, each isolated. Returns the failures.
fn run_target(client: &dyn TelegramApi, entity: &Entity, layout: &OutputLayout, args: &Args) -> usize {
    let mut failed = 0;
    let name = layout.file_name_part(&entity.output_name());

    if args.members {
        let progress = stderr_progress("📋 Members");
        let result = enumerate_members(client, entity, layout, &progress);
        eprintln!();
        if let Ok(summary) = &result {
            println!("💾 Saved {} to '{}' ({} rows)", summary.artifact, summary.path.display(), summary.rows);
        }
        failed += report(result);
    }

    let options = args.crawl_options();
    if options.is_active() {
        let progress = stderr_progress(format!("💬 Crawling {name}"));
        let result = crawl_history(client, entity, layout, options, &progress);
        eprintln!();
        match result {
            Ok(crawl) => failed += print_crawl(&crawl),
            Err(e) => failed += report::<()>(Err(e)),
        }
    }

    if !args.members && !options.is_active() {
        println!("ℹ️  Nothing to do for the target: pass --members, --chats or --crawl-invites");
    }

    failed
}

fn print_crawl(report: &CrawlReport) -> usize {
    for file in report.files() {
        println!("💾 Saved {} to '{}' ({} rows)", file.artifact, file.path.display(), file.rows);
    }
    println!(
        "   {} messages seen, {} invite links found",
        report.messages_seen, report.invites_found
    );
    match &report.failure {
        Some(failure) => {
            eprintln!("❌ Crawl aborted after {} messages: {}", report.messages_seen, failure);
            1
        }
        None => 0,
    }
}
