//! `gensnip` - CLI for genealogy-snippets
//!
//! Shows the stored catalog, ingests records, and serves the browser
//! extension over native messaging.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::Read as _;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use genealogy_snippets::bridge::{serve, NativeMessagingChannel};
use genealogy_snippets::cli::{
    AddCommand, ClearCommand, Cli, Command, ConfigCommand, OutputFormat, ShowCommand,
};
use genealogy_snippets::message::{Acknowledgment, RecordBatch};
use genealogy_snippets::render::render_catalog;
use genealogy_snippets::storage::{ChangeFeed, StoreWatcher, WatchHandle};
use genealogy_snippets::{
    init_logging, Catalog, CatalogView, Config, ExtensionEndpoint, KeyValueStore, SqliteStore,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Show(cmd) => handle_show(&config, &cmd),
        Command::Watch(cmd) => handle_watch(&config, &cmd),
        Command::Add(cmd) => handle_add(&config, &cmd),
        Command::Bridge => handle_bridge(&config),
        Command::Clear(cmd) => handle_clear(&config, &cmd),
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_store(config: &Config) -> Result<SqliteStore> {
    let path = config.database_path();
    SqliteStore::open(&path).with_context(|| format!("opening store at {}", path.display()))
}

fn open_catalog(config: &Config) -> Result<Catalog<SqliteStore>> {
    Ok(Catalog::new(open_store(config)?, config.catalog_key()))
}

fn current_thread_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")
}

fn print_view<S: KeyValueStore>(view: &CatalogView<S>, format: OutputFormat) -> Result<()> {
    let pages = view.groups();
    match format {
        OutputFormat::Cards => {
            if pages.iter().all(|page| page.groups.is_empty()) {
                println!("No snippets stored.");
            } else {
                print!("{}", render_catalog(&pages));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&pages)?),
    }
    Ok(())
}

fn handle_show(config: &Config, cmd: &ShowCommand) -> Result<()> {
    let view = CatalogView::open(open_catalog(config)?)?;
    print_view(&view, cmd.format)
}

fn handle_watch(config: &Config, cmd: &ShowCommand) -> Result<()> {
    let mut view = CatalogView::open(open_catalog(config)?)?;

    let feed = ChangeFeed::new(config.watch.feed_capacity);
    let mut subscription = feed.subscribe();
    let handle = WatchHandle::new();
    let watcher = StoreWatcher::new(
        open_store(config)?,
        &[config.catalog_key()],
        config.poll_interval(),
    )?;

    print_view(&view, cmd.format)?;

    let runtime = current_thread_runtime()?;
    runtime.block_on(async {
        let watcher_task = tokio::spawn(watcher.run(feed, handle.clone()));

        let format = cmd.format;
        let outcome = tokio::select! {
            result = view.follow(&mut subscription, |view| {
                println!();
                println!("--- catalog changed at {} ---", chrono::Local::now().format("%H:%M:%S"));
                if let Err(e) = print_view(view, format) {
                    tracing::error!("Failed to render catalog: {e}");
                }
            }) => result.map_err(anyhow::Error::from),
            signal = tokio::signal::ctrl_c() => signal.context("waiting for Ctrl-C"),
        };

        handle.stop();
        watcher_task.await.context("joining store watcher")?;
        outcome
    })
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display())),
        _ => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("reading stdin")?;
            Ok(raw)
        }
    }
}

fn handle_add(config: &Config, cmd: &AddCommand) -> Result<()> {
    let raw = read_input(cmd.file.as_deref())?;
    let batch = RecordBatch::from_json(&raw).context("decoding records")?;

    let mut catalog = open_catalog(config)?;
    let outcome = catalog.ingest_raw(batch.into_records())?;
    println!(
        "{}",
        serde_json::to_string(&Acknowledgment::from(outcome))?
    );
    Ok(())
}

fn handle_bridge(config: &Config) -> Result<()> {
    let mut endpoint = ExtensionEndpoint::new(open_catalog(config)?);
    let mut channel = NativeMessagingChannel::stdio(config.bridge.max_message_bytes);

    let runtime = current_thread_runtime()?;
    runtime.block_on(serve(&mut channel, &mut endpoint))?;
    Ok(())
}

fn handle_clear(config: &Config, cmd: &ClearCommand) -> Result<()> {
    if !cmd.yes {
        println!("This will remove every stored snippet.");
        println!("Use --yes to confirm.");
        return Ok(());
    }
    let mut view = CatalogView::open(open_catalog(config)?)?;
    let removed = view.records().len();
    view.clear_all()?;
    println!("Removed {removed} records.");
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> Result<()> {
    let catalog = open_catalog(config)?;
    let records = catalog.load()?;
    let persons: usize = records.iter().map(|r| r.data.persons.len()).sum();
    let slot = catalog.store().slot_info(catalog.key())?;

    if json {
        let status = serde_json::json!({
            "database_path": config.database_path(),
            "catalog_key": catalog.key(),
            "records": records.len(),
            "persons": persons,
            "size_bytes": slot.as_ref().map(|s| s.size_bytes),
            "updated_at": slot.as_ref().and_then(|s| s.updated_at),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("gensnip status");
        println!("--------------");
        println!("Database:      {}", config.database_path().display());
        println!("Catalog key:   {}", catalog.key());
        println!("Records:       {}", records.len());
        println!("Persons:       {persons}");
        match slot {
            Some(slot) => {
                println!("Size:          {} bytes", slot.size_bytes);
                if let Some(updated_at) = slot.updated_at {
                    println!("Last change:   {}", updated_at.to_rfc3339());
                }
            }
            None => println!("Size:          (never written)"),
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Catalog key:        {}", config.catalog_key());
                println!();
                println!("[Watch]");
                println!("  Poll interval (ms): {}", config.watch.poll_interval_ms);
                println!("  Feed capacity:      {}", config.watch.feed_capacity);
                println!();
                println!("[Bridge]");
                println!("  Max message bytes:  {}", config.bridge.max_message_bytes);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
