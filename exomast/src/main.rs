//! exomast - command-line front end for the exoMAST client
//!
//! Resolves a planet name, prints its identifiers and properties, and
//! optionally fetches spectra or Kepler/TESS data-validation products.

use anyhow::{Context, Result};
use clap::Parser;
use exomast::report::{format_attribute_table, TableStyle};
use exomast::services::DEFAULT_TCE_INDEX;
use exomast::{ClientOptions, ExoMastClient, SpectrumLayout};
use exomast_common::config::{SettingsOverrides, SettingsResolver};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for exomast
#[derive(Parser, Debug)]
#[command(name = "exomast")]
#[command(about = "Query the exoMAST exoplanet archive")]
#[command(version)]
struct Args {
    /// Planet name, e.g. "HD 189733 b" or "KIC 12557548"
    planet: String,

    /// Report every request as it is made
    #[arg(short, long)]
    verbose: bool,

    /// Skip identifiers, properties and the local cache
    #[arg(long)]
    quickstart: bool,

    /// API root without version
    #[arg(long)]
    api_url: Option<String>,

    /// API version tag
    #[arg(long)]
    api_version: Option<String>,

    /// Directory holding cached planet records
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Fetch spectrum file IDX from the planet's file list
    #[arg(long, value_name = "IDX", num_args = 0..=1, default_missing_value = "0")]
    spectrum: Option<usize>,

    /// Spectrum files have no delta-wavelength column
    #[arg(long)]
    no_delta: bool,

    /// Fetch threshold-crossing events
    #[arg(long)]
    tce: bool,

    /// Fetch data-validation metadata
    #[arg(long)]
    metadata: bool,

    /// Fetch the detrended table
    #[arg(long)]
    table: bool,

    /// Fetch the phase plot
    #[arg(long)]
    phaseplot: bool,

    /// Request the embeddable phase plot variant
    #[arg(long)]
    embed: bool,

    /// TCE number for metadata, table and phase plot
    #[arg(long, default_value_t = DEFAULT_TCE_INDEX)]
    tce_index: u32,

    /// Print the whole record as JSON instead of tables
    #[arg(long)]
    json: bool,
}

/// Filter directives covering the client and the settings crate
fn log_directives(level: &str) -> String {
    format!("exomast={level},exomast_common={level}")
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logging comes up before settings so config-file fallbacks are reported.
    let (filter, filter_handle) = reload::Layer::new(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_directives("info"))),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .init();

    let overrides = SettingsOverrides {
        api_url: args.api_url.clone(),
        api_version: args.api_version.clone(),
        cache_dir: args.cache_dir.clone(),
        ..Default::default()
    };
    let settings = SettingsResolver::new()
        .resolve(&overrides)
        .context("Failed to resolve exoMAST settings")?;

    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_none() {
        filter_handle
            .reload(EnvFilter::new(log_directives(&settings.log_level)))
            .context("Failed to apply configured log level")?;
    }

    info!("exomast v{}", env!("CARGO_PKG_VERSION"));

    let options = ClientOptions {
        settings,
        verbose: args.verbose,
        quickstart: args.quickstart,
    };
    let mut planet = ExoMastClient::with_options(&args.planet, options)
        .with_context(|| format!("Failed to resolve planet {:?}", args.planet))?;

    if let Some(index) = args.spectrum {
        let layout = if args.no_delta {
            SpectrumLayout::WithoutDelta
        } else {
            SpectrumLayout::WithDelta
        };
        let table = planet.get_spectrum(index, layout).context("Failed to fetch spectrum")?;
        info!(rows = table.len(), "Spectrum loaded");
    }
    if args.tce {
        planet.get_tce().context("Failed to fetch threshold crossing events")?;
    }
    if args.metadata {
        planet.get_metadata(args.tce_index).context("Failed to fetch metadata")?;
    }
    if args.table {
        planet.get_detrended_table(args.tce_index).context("Failed to fetch detrended table")?;
    }
    if args.phaseplot {
        planet
            .get_phase_plot(args.tce_index, args.embed)
            .context("Failed to fetch phase plot")?;
    }

    let record = planet.record();

    if args.json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    let style = TableStyle::default();
    println!("{} ({})", record.canonical_name(), record.collection());
    println!("\nIdentifiers\n{}", format_attribute_table(record.identifiers(), &style));
    println!("Properties\n{}", format_attribute_table(record.properties().fields(), &style));

    if !record.metadata_attributes().is_empty() {
        println!("Metadata\n{}", format_attribute_table(record.metadata_attributes(), &style));
    }
    if let Some(spectrum) = record.spectrum_table() {
        println!("{}", spectrum.columns.join("\t"));
        for row in &spectrum.rows {
            let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            println!("{}", cells.join("\t"));
        }
    }
    for (label, payload) in [
        ("TCEs", record.tce()),
        ("Detrended table", record.detrended_table()),
        ("Phase plot", record.phase_plot()),
    ] {
        if let Some(payload) = payload {
            println!("\n{}\n{}", label, serde_json::to_string_pretty(payload)?);
        }
    }

    Ok(())
}
