use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use nodescope_logs::{QueryChain, SortKey};
use nodescope_topology::parse_group_list;

mod app;
mod config;
mod render;

use app::{ExtractOptions, Mode, Options, Outcome};
use config::Settings;
use render::OutputFormat;

/// Nodescope - extract, filter and sort log entries from a cluster diagnostics bundle
#[derive(Parser, Debug)]
#[command(name = "nodescope")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the nodetool status output file
    #[arg(long, value_name = "PATH")]
    file: PathBuf,

    /// Comma-separated list of datacenter names
    #[arg(long, value_name = "LIST", required_unless_present = "list_dcs")]
    datacenters: Option<String>,

    /// List all datacenters and exit
    #[arg(long)]
    list_dcs: bool,

    /// Sort by date, loglevel, linenumber, or nodeip [default: date]
    #[arg(long, value_name = "KEY")]
    sort: Option<String>,

    /// Comma-separated search terms, matched in order within each entry
    #[arg(long, value_name = "LIST", default_value = "")]
    query: String,

    /// Output format for entries [default: text]
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Optional TOML settings file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Root directory of the diagnostics bundle
    #[arg(value_name = "ROOT", required_unless_present = "list_dcs")]
    root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout only carries results
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = run_app(args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

async fn run_app(args: Args) -> Result<()> {
    let settings = Settings::load(args.config.as_deref())?;
    let format = args.format.or(settings.format).unwrap_or_default();
    let options = resolve_options(args, settings)?;

    let outcome = app::run(options).await?;

    let mut out = BufWriter::new(io::stdout().lock());
    match outcome {
        Outcome::Groups(groups) => render::write_groups(&mut out, &groups)?,
        Outcome::Entries(aggregation) => {
            render::write_entries(&mut out, &aggregation.entries, format)?;
        }
    }

    Ok(())
}

/// Merge flags over settings; rejects bad input before anything is scanned
fn resolve_options(args: Args, settings: Settings) -> Result<Options> {
    if args.list_dcs {
        return Ok(Options {
            status_file: args.file,
            mode: Mode::ListGroups,
        });
    }

    let sort = match args.sort.as_deref() {
        Some(name) => name.parse::<SortKey>()?,
        None => settings.sort.unwrap_or_default(),
    };

    let groups = parse_group_list(args.datacenters.as_deref().unwrap_or_default());
    if groups.is_empty() {
        anyhow::bail!("No datacenters given; use --datacenters or --list-dcs");
    }

    let root = args.root.context("Missing bundle root directory")?;

    Ok(Options {
        status_file: args.file,
        mode: Mode::Extract(ExtractOptions {
            root,
            groups,
            query: QueryChain::parse(&args.query),
            sort,
            layout: settings.layout,
        }),
    })
}
