use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use flags::{selected_categories, CategoryFlag, KindTable};
use serde_json::json;
use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use svcinv_extract::{DataSource, MonitorKind, ScanConfig, WidgetKind, GROUP_WIDGET};

mod config;
mod flags;
mod report;
mod scan;
mod source;

pub use config::ClientConfig;
pub use report::{artifact_url, render_text};
pub use scan::run_scan;
pub use source::{ApiSource, ArtifactSource, Endpoint, ExportDirSource};

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "service-inventory")]
#[command(
    about = "Find which services your dashboards, monitors, notebooks and SLOs reference",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for the report)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan artifacts and report the services each one references
    Scan(ScanArgs),

    /// Print the discriminator tables used to route widgets, monitors and queries
    Kinds(KindsArgs),

    /// Print the JSON Schema of the `scan --json` report
    Schema,
}

#[derive(Args)]
struct ScanArgs {
    /// Read saved API responses from this directory instead of calling the API
    #[arg(long)]
    from_dir: Option<PathBuf>,

    /// Only scan these categories (comma-separated; default: all)
    #[arg(long, value_enum, value_delimiter = ',', num_args = 1..)]
    only: Vec<CategoryFlag>,

    /// Site to query and link to (overrides DD_SITE)
    #[arg(long)]
    site: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Levels of group widgets flattened into their dashboard
    #[arg(long, default_value_t = 1)]
    max_group_depth: usize,

    /// Output JSON format
    #[arg(long)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, requires = "json")]
    pretty: bool,
}

#[derive(Args)]
struct KindsArgs {
    /// Only print one table
    #[arg(long, value_enum)]
    table: Option<KindTable>,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

pub async fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    let json_output = match &cli.command {
        Commands::Scan(args) => args.json,
        Commands::Kinds(args) => args.json,
        Commands::Schema => true,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Scan(args) => run_scan_command(args).await?,
        Commands::Kinds(args) => run_kinds(args)?,
        Commands::Schema => print_stdout(&svcinv_protocol::report_schema()?)?,
    }

    Ok(())
}

async fn run_scan_command(args: ScanArgs) -> Result<()> {
    let scan_config = ScanConfig {
        max_group_depth: args.max_group_depth,
    };
    if let Err(err) = scan_config.validate() {
        bail!("Invalid scan configuration: {err}");
    }

    let categories = selected_categories(&args.only);
    let site = config::resolve_site(args.site.as_deref());
    let source: Box<dyn ArtifactSource> = match &args.from_dir {
        Some(dir) => {
            log::info!("Reading saved exports from {}", dir.display());
            Box::new(ExportDirSource::new(dir)?)
        }
        None => {
            let timeout = Duration::from_secs(args.timeout_secs);
            let client = ClientConfig::from_env(Some(site.as_str()), timeout)?;
            log::info!("Querying {}", client.api_base());
            Box::new(ApiSource::new(&client)?)
        }
    };

    let report = scan::run_scan(&*source, &categories, scan_config).await?;

    if args.json {
        let body = if args.pretty {
            svcinv_protocol::serialize_json_pretty(&report)?
        } else {
            svcinv_protocol::serialize_json(&report)?
        };
        print_stdout(&body)?;
    } else {
        print_stdout(&report::render_text(&report, &site))?;
    }
    Ok(())
}

fn kind_table(table: KindTable) -> BTreeMap<String, String> {
    fn name(strategy: impl std::fmt::Debug) -> String {
        format!("{strategy:?}").to_lowercase()
    }

    match table {
        KindTable::Widgets => {
            let mut rows: BTreeMap<String, String> = WidgetKind::KNOWN
                .iter()
                .map(|raw| (raw.to_string(), name(WidgetKind::parse(raw).strategy())))
                .collect();
            rows.insert(GROUP_WIDGET.to_string(), "nested".to_string());
            rows
        }
        KindTable::Monitors => MonitorKind::KNOWN
            .iter()
            .map(|raw| (raw.to_string(), name(MonitorKind::parse(raw).strategy())))
            .collect(),
        KindTable::DataSources => DataSource::KNOWN
            .iter()
            .map(|raw| (raw.to_string(), name(DataSource::parse(raw).strategy())))
            .collect(),
    }
}

fn table_key(table: KindTable) -> &'static str {
    match table {
        KindTable::Widgets => "widgets",
        KindTable::Monitors => "monitors",
        KindTable::DataSources => "data_sources",
    }
}

fn run_kinds(args: KindsArgs) -> Result<()> {
    let tables = match args.table {
        Some(table) => vec![table],
        None => vec![KindTable::Widgets, KindTable::Monitors, KindTable::DataSources],
    };

    if args.json {
        let body: serde_json::Map<String, serde_json::Value> = tables
            .iter()
            .map(|table| (table_key(*table).to_string(), json!(kind_table(*table))))
            .collect();
        print_stdout(&serde_json::to_string_pretty(&body)?)?;
        return Ok(());
    }

    let mut out = String::new();
    for table in tables {
        out.push_str(&format!("[{}]\n", table_key(table)));
        for (raw, strategy) in kind_table(table) {
            out.push_str(&format!("{raw:<24} {strategy}\n"));
        }
        out.push('\n');
    }
    print_stdout(out.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tables_cover_known_discriminators() {
        let widgets = kind_table(KindTable::Widgets);
        assert_eq!(widgets.len(), WidgetKind::KNOWN.len() + 1);
        assert_eq!(widgets["timeseries"], "timeseries");
        assert_eq!(widgets["slo_list"], "liststream");
        assert_eq!(widgets[GROUP_WIDGET], "nested");

        let monitors = kind_table(KindTable::Monitors);
        assert_eq!(monitors["composite"], "unsupported");
        assert_eq!(monitors["rum alert"], "rumalert");

        let sources = kind_table(KindTable::DataSources);
        assert_eq!(sources["cloud_cost"], "metrics");
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn only_flag_parses_comma_list() {
        let cli = Cli::try_parse_from([
            "service-inventory",
            "scan",
            "--only",
            "slos,monitors",
            "--from-dir",
            "/tmp/x",
        ])
        .unwrap();
        let Commands::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.only, vec![CategoryFlag::Slos, CategoryFlag::Monitors]);
        assert_eq!(
            selected_categories(&args.only),
            vec![
                svcinv_extract::ArtifactCategory::Slo,
                svcinv_extract::ArtifactCategory::Monitor
            ]
        );
    }
}
