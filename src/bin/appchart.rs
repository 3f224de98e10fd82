//! App Chart CLI
//!
//! Lists and describes app charts, manages the default chart, and validates
//! an application's chart values.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use appchart_settings::config::OutputFormat;
use appchart_settings::loader::read_documents;
use appchart_settings::{
    validate_application, AppChart, AppChartConfig, AppChartError, AppRecord, ChartRegistry, ChartStore,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "appchart")]
#[command(about = "Application chart management and settings validation")]
struct Cli {
    /// Config file to load on top of the default locations
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Directory of app chart resources (overrides the config)
    #[arg(long, global = true)]
    charts: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List application charts
    List,

    /// Describe an application chart
    Show {
        /// Chart name
        name: String,
    },

    /// Set or show the default app chart; an empty name unsets it
    Default {
        name: Option<String>,
    },

    /// Validate an application's chart values against its app chart
    Validate {
        /// Application record (YAML or JSON)
        app: PathBuf,

        /// Extra override, may be repeated
        #[arg(short, long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// View and manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration as TOML
    Show,

    /// Write a config file with default values
    Init {
        #[arg(short, long, default_value = "appchart.toml")]
        output: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the command ran but found problems
fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = AppChartConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    let json = cli.json || config.output.format == OutputFormat::Json;
    let open_registry = || -> anyhow::Result<ChartRegistry> {
        let path = cli.charts.clone().unwrap_or_else(|| config.store_path());
        Ok(ChartRegistry::open(path)?)
    };

    match cli.command {
        Commands::List => {
            let registry = open_registry()?;
            let charts = registry.list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&charts)?);
                return Ok(true);
            }

            println!("Show Application Charts\n");
            if charts.is_empty() {
                if let Some(root) = registry.root() {
                    println!("No app charts found in {}", root.display());
                }
                return Ok(true);
            }
            let rows = charts
                .iter()
                .map(|chart| {
                    let marker = if config.default_chart() == Some(chart.name.as_str()) { "*" } else { "" };
                    vec![
                        marker.to_string(),
                        chart.name.clone(),
                        created(chart),
                        chart.short_description.clone(),
                        chart.setting_count().to_string(),
                    ]
                })
                .collect::<Vec<_>>();
            print_table(&["DEFAULT", "NAME", "CREATED", "DESCRIPTION", "#SETTINGS"], &rows);
            Ok(true)
        }

        Commands::Show { name } => {
            let registry = open_registry()?;
            let chart = find_chart(&registry, &name)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&chart)?);
                return Ok(true);
            }

            println!("Show application chart details\n");

            let mut details = vec![
                vec!["Name".to_string(), chart.name.clone()],
                vec!["Created".to_string(), created(&chart)],
                vec!["Short".to_string(), chart.short_description.clone()],
            ];
            let mut description = chart.description.lines();
            details.push(vec!["Description".to_string(), description.next().unwrap_or_default().to_string()]);
            details.extend(description.map(|line| vec![String::new(), line.to_string()]));
            details.push(vec!["Helm Repository".to_string(), chart.helm_repo.clone()]);
            details.push(vec!["Helm Chart".to_string(), chart.helm_chart.clone()]);
            details.push(vec!["Revision".to_string(), chart.revision.short().to_string()]);
            print_table(&["KEY", "VALUE"], &details);
            println!();

            if chart.settings.is_empty() {
                println!("No settings");
            } else {
                let rows = chart
                    .settings
                    .iter()
                    .map(|(key, decl)| vec![key.clone(), decl.setting_type.to_string(), decl.allowed_values()])
                    .collect::<Vec<_>>();
                print_table(&["KEY", "TYPE", "ALLOWED VALUES"], &rows);
            }
            Ok(true)
        }

        Commands::Default { name: None } => {
            match config.default_chart() {
                Some(name) => println!("Name: {}", name),
                None => println!("Name: not set, system default applies"),
            }
            Ok(true)
        }

        Commands::Default { name: Some(name) } => {
            let target = AppChartConfig::writable_path(cli.config.as_deref())
                .ok_or_else(|| anyhow!("no user config directory, pass --config"))?;
            let mut updated = AppChartConfig::load_file(&target)
                .with_context(|| format!("reading {}", target.display()))?;

            if name.is_empty() {
                updated.store.default_chart = None;
            } else {
                let registry = open_registry()?;
                find_chart(&registry, &name)?;
                updated.store.default_chart = Some(name.clone());
            }
            updated
                .save(&target)
                .with_context(|| format!("writing {}", target.display()))?;

            let effective = AppChartConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
            if effective.default_chart() != updated.default_chart() {
                eprintln!(
                    "⚠️  wrote {} but the environment still selects {:?}",
                    target.display(),
                    effective.default_chart().unwrap_or_default()
                );
            }

            if name.is_empty() {
                println!("Unset Default Application Chart");
            } else {
                println!("New Default Application Chart");
                println!("Name: {}", name);
            }
            Ok(true)
        }

        Commands::Validate { app, set } => {
            let registry = open_registry()?;
            let mut record = read_app(&app)?;
            for assignment in &set {
                let (key, value) = assignment
                    .split_once('=')
                    .ok_or_else(|| anyhow!("bad override {:?}, expected KEY=VALUE", assignment))?;
                record.configuration.settings.insert(key.to_string(), value.to_string());
            }

            let report = validate_application(
                &registry,
                &record,
                config.validation.unknown_settings,
                config.default_chart(),
            )?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if report.is_valid() {
                println!("✅ {} - chart values valid for {}", report.application, report.chart);
            } else {
                println!(
                    "❌ {} - {} invalid setting(s) for {}",
                    report.application,
                    report.errors.len(),
                    report.chart
                );
                for failure in &report.failures {
                    println!("   └─ {}", failure);
                }
            }
            Ok(report.is_valid())
        }

        Commands::Config { command: ConfigCommands::Show } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("{}", toml::to_string_pretty(&config)?);
            }
            Ok(true)
        }

        Commands::Config { command: ConfigCommands::Init { output } } => {
            if Path::new(&output).exists() {
                bail!("{} already exists", output);
            }
            AppChartConfig::default().save(&output)?;
            println!("✅ Wrote {}", output);
            Ok(true)
        }
    }
}

/// Look up a chart, suggesting a near miss when it is unknown
fn find_chart(registry: &ChartRegistry, name: &str) -> anyhow::Result<AppChart> {
    match registry.lookup(name)? {
        Some(chart) => Ok(chart),
        None => {
            let err = AppChartError::ChartNotKnown(name.to_string());
            match registry.suggest(name) {
                Some(close) => bail!("{} (did you mean '{}'?)", err, close),
                None => Err(err.into()),
            }
        }
    }
}

fn read_app(path: &Path) -> anyhow::Result<AppRecord> {
    let document = read_documents(path)?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("{} holds no application record", path.display()))?;
    serde_json::from_value(document).with_context(|| format!("reading application {}", path.display()))
}

fn created(chart: &AppChart) -> String {
    chart
        .created_at
        .map(|at| at.format("%Y-%m-%d %H:%M:%S %z").to_string())
        .unwrap_or_default()
}

fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        println!("| {} |", padded.join(" | "));
    };

    line(headers.to_vec());
    println!(
        "|{}|",
        widths.iter().map(|w| "-".repeat(w + 2)).collect::<Vec<_>>().join("|")
    );
    for row in rows {
        line(row.iter().map(String::as_str).collect());
    }
}
