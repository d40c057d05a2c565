use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use estimate_sync::amount::{format_hours, format_money};
use estimate_sync::api::client::EntityClient;
use estimate_sync::api::http::HttpTransport;
use estimate_sync::config::{Config, EntityRoute};
use estimate_sync::model::Section;
use estimate_sync::report::{self, ReportOptions};
use estimate_sync::sync::{self, SyncError};
use estimate_sync::worksheet::Worksheet;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "estimate-sync", version, about = "Estimate line items with alternates")]
struct Cli {
    /// Config file (default: estimate.json)
    #[arg(short, long, default_value = "")]
    config: String,

    /// Override the configured API base URL
    #[arg(long)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List configured entity routes
    Entities,
    /// Show items with their effective values and totals
    List {
        entity: String,
        /// Show alternates under each item
        #[arg(short, long)]
        alternates: bool,
    },
    /// Print alt-adjusted totals only
    Totals { entity: String },
    /// Write the current items as an editable JSON draft
    Export {
        entity: String,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Push an edited JSON draft back to the server
    Submit { entity: String, file: PathBuf },
    /// Delete one item by id
    Delete { entity: String, id: String },
    /// Delete every item of an entity
    Clear {
        entity: String,
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // 1. Load config
    let mut config = Config::load(&cli.config)?;
    if let Some(base) = cli.api_base {
        config.api_base = base;
    }
    config.validate().context("invalid configuration")?;

    if let Command::Entities = cli.command {
        for route in &config.entities {
            println!(
                "{:<12} {:<14} {:<12} /{}",
                route.name,
                route.display_name(),
                route.id_field,
                route.root()
            );
        }
        return Ok(());
    }

    // 2. Init transport
    let transport = HttpTransport::new(&config.api_base, config.timeout())
        .context("failed to initialise HTTP transport")?;
    info!("Using API at {}", config.api_base);

    match cli.command {
        Command::Entities => Ok(()),
        Command::List { entity, alternates } => {
            let route = lookup(&config, &entity)?;
            let client = EntityClient::new(&transport, route);
            let sheet = Worksheet::load(&client);
            let options = ReportOptions {
                expand_alternates: alternates,
            };
            print!("{}", report::render(route.display_name(), sheet.sections(), options));
            Ok(())
        }
        Command::Totals { entity } => {
            let route = lookup(&config, &entity)?;
            let client = EntityClient::new(&transport, route);
            let totals = Worksheet::load(&client).totals();
            println!("Material cost: {}", format_money(totals.material_cost));
            println!("Labor hours:   {}", format_hours(totals.labor_hours));
            println!("Labor cost:    {}", format_money(totals.labor_cost));
            Ok(())
        }
        Command::Export { entity, output } => {
            let route = lookup(&config, &entity)?;
            let client = EntityClient::new(&transport, route);
            let sheet = Worksheet::load(&client).with_blank_slots();
            let data = serde_json::to_string_pretty(sheet.sections())
                .context("failed to serialize draft")?;
            match output {
                Some(path) => {
                    std::fs::write(&path, data)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!("Wrote {} item(s) to {}", sheet.sections().len(), path.display());
                }
                None => println!("{data}"),
            }
            Ok(())
        }
        Command::Submit { entity, file } => {
            let route = lookup(&config, &entity)?;
            let data = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let sections: Vec<Section> = serde_json::from_str(&data)
                .with_context(|| format!("invalid draft: {}", file.display()))?;

            let client = EntityClient::new(&transport, route);
            let progress = ProgressBar::new(sections.len() as u64);
            progress.set_style(
                ProgressStyle::default_bar()
                    .template("  {bar:40.cyan/blue} {pos}/{len} {msg}")
                    .expect("valid template")
                    .progress_chars("█▓░"),
            );

            match sync::submit(&client, &sections, &progress) {
                Ok(summary) => {
                    println!(
                        "Submitted changes: {} created, {} updated, {} alternate(s) created, {} alternate(s) updated, {} skipped",
                        summary.primaries_created,
                        summary.primaries_updated,
                        summary.alternates_created,
                        summary.alternates_updated,
                        summary.skipped
                    );
                    Ok(())
                }
                Err(e) => {
                    let SyncError::Row { completed, .. } = &e;
                    if completed.writes() > 0 {
                        eprintln!(
                            "{} write(s) were committed before the failure and were not rolled back",
                            completed.writes()
                        );
                    }
                    Err(e).context("Submit failed")
                }
            }
        }
        Command::Delete { entity, id } => {
            let route = lookup(&config, &entity)?;
            let client = EntityClient::new(&transport, route);
            client.delete_primary(&id).context("Delete failed")?;
            println!("Deleted {} {id}", route.display_name());
            Ok(())
        }
        Command::Clear { entity, yes } => {
            let route = lookup(&config, &entity)?;
            if !yes {
                bail!(
                    "refusing to delete ALL {} without --yes",
                    route.display_name()
                );
            }
            let client = EntityClient::new(&transport, route);
            client.clear_all().context("Clear failed")?;
            println!("All {} deleted", route.display_name());
            Ok(())
        }
    }
}

fn lookup<'a>(config: &'a Config, entity: &str) -> Result<&'a EntityRoute> {
    config.entity(entity).with_context(|| {
        let known: Vec<&str> = config.entities.iter().map(|e| e.name.as_str()).collect();
        format!("unknown entity {entity:?} (known: {})", known.join(", "))
    })
}
