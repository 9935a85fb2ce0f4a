mod bundle_page;
mod catalog;
mod commands;
mod config;
mod diagnostics;
mod error;
mod hover;
mod info;
mod parser;
mod replay;
mod report;
mod settings;
mod types;
mod watch;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::{OutputFormat, ReportRequest};

#[derive(Parser)]
#[command(name = "bundle-hints", version, about = "Where-to-get-it hints for community center bundles")]
struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
    /// Log at debug level regardless of `RUST_LOG`.
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or edit .bundlehints.toml
    Config {
        /// Config action.
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Print the hint for one item name or `<id>`
    Hint {
        /// Catalog file overriding the config.
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Display name, `<id>`, `EggCategory`, or `MilkCategory`.
        item: String,
        /// Quality tier: 0 normal, 1 silver, 2 gold, 3 iridium.
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
        quality: u8,
    },
    /// Print the reference document and current state
    Info {
        /// Emit JSON instead of markdown.
        #[arg(long)]
        json: bool,
    },
    /// Replay hover and toggle events against a page
    Replay {
        /// Output format.
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
        /// Replay script (TOML).
        script: PathBuf,
    },
    /// Parse bundle definitions and report hints and errors
    Report {
        /// Catalog file overriding the config.
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Output format.
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
        /// Append the listed ingredient names after each bundle.
        #[arg(long)]
        list_items: bool,
        /// Definitions file or directory; reads stdin when omitted.
        path: Option<PathBuf>,
        /// Re-run the report whenever PATH changes.
        #[arg(long, requires = "path")]
        watch: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Set one key, e.g. `collections_tab_hints all`
    Set {
        /// Setting key; `debug.show_unknown_ids` for the debug table.
        key: String,
        /// New value.
        value: String,
    },
    /// Print the effective configuration
    Show,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Config { action: ConfigAction::Set { key, value } } => commands::config_set(&key, &value),
        Commands::Config { action: ConfigAction::Show } => commands::config_show(),
        Commands::Hint { catalog, item, quality } => commands::hint(&item, quality, catalog.as_deref()),
        Commands::Info { json } => {
            info::run(json);
            Ok(())
        },
        Commands::Replay { format, script } => commands::replay(&script, format),
        Commands::Report { catalog, format, list_items, path, watch } => {
            let request = ReportRequest { catalog, format, list_items, path };
            match (watch, request.path.clone()) {
                (true, Some(watched)) => watch::run(&watched, &request),
                _ => commands::report(&request),
            }
        },
    };

    return match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    };
}

/// Send `tracing` output to stderr, filtered by `RUST_LOG` unless `--verbose`.
fn init_logging(verbose: bool) {
    let filter = if verbose { EnvFilter::new("debug") } else { EnvFilter::from_default_env() };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
