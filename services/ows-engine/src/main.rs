//! OWS engine command line.
//!
//! Validates configurations and runs governance, rendering and legend
//! generation offline against band grids stored as JSON.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ows_engine::{CoverageRequest, MapRequest, OwsEngine};
use renderer::{DatasetBands, Legend};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "ows-engine")]
#[command(about = "OWS style rendering and resource governance engine")]
struct Args {
    /// Configuration file (.yaml, .yml or .json)
    #[arg(short, long, env = "OWS_CONFIG", default_value = "config/ows.yaml")]
    config: PathBuf,

    /// Log level
    #[arg(long, env = "OWS_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Number of tokio worker threads (default: number of CPU cores)
    #[arg(long, env = "TOKIO_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// Print Prometheus metrics after the command completes
    #[arg(long, env = "OWS_PRINT_METRICS")]
    print_metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load, validate and compile the configuration
    Validate,

    /// Run governance for a request and print the plan as JSON
    Decide {
        #[arg(long)]
        layer: String,

        #[arg(long)]
        style: Option<String>,

        #[arg(long, value_enum, default_value_t = ServiceArg::Wms)]
        service: ServiceArg,

        /// Required for WMS and WMTS, ignored for WCS
        #[arg(long)]
        zoom_factor: Option<f64>,

        #[arg(long)]
        datasets: u32,
    },

    /// Render band grids from a JSON file to PNG
    Render {
        #[arg(long)]
        layer: String,

        #[arg(long)]
        style: Option<String>,

        /// JSON file: {"width": w, "height": h, "bands": {"B04": [...], ...}}
        #[arg(long)]
        bands: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write a style's legend
    Legend {
        #[arg(long)]
        layer: String,

        #[arg(long)]
        style: Option<String>,

        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ServiceArg {
    Wms,
    Wmts,
    Wcs,
}

/// Band grids on disk. `null` values are no-data.
#[derive(Debug, Deserialize)]
struct BandFile {
    width: usize,
    height: usize,
    bands: HashMap<String, Vec<Option<f32>>>,
}

impl BandFile {
    fn into_dataset(self) -> Result<DatasetBands> {
        let mut data = DatasetBands::new(self.width, self.height);
        for (name, values) in self.bands {
            let values = values.into_iter().map(|v| v.unwrap_or(f32::NAN)).collect();
            data.insert(name, values)?;
        }
        Ok(data)
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .json()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let prometheus = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    if let Some(threads) = args.worker_threads {
        info!(threads, "Configured tokio worker threads");
    }

    let engine = OwsEngine::from_file(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;

    match args.command {
        Command::Validate => {
            let catalog = engine.catalog();
            for name in catalog.layer_names() {
                if let Some(layer) = catalog.layer(name) {
                    let styles: Vec<_> = layer.styles().iter().map(|s| s.name()).collect();
                    println!("{}: {} (default {})", name, styles.join(", "), layer.default_style());
                }
            }
            info!(path = %args.config.display(), "Configuration is valid");
        }

        Command::Decide {
            layer,
            style,
            service,
            zoom_factor,
            datasets,
        } => {
            let json = match service {
                ServiceArg::Wcs => serde_json::to_string_pretty(&engine.coverage_plan(
                    &CoverageRequest {
                        layer,
                        dataset_count: datasets,
                    },
                )?)?,
                ServiceArg::Wms | ServiceArg::Wmts => {
                    let zoom_factor =
                        zoom_factor.context("--zoom-factor is required for WMS and WMTS")?;
                    let mut request = MapRequest::new(layer, zoom_factor, datasets);
                    request.style = style;
                    request.tiled = matches!(service, ServiceArg::Wmts);
                    serde_json::to_string_pretty(&engine.plan(&request)?)?
                }
            };
            println!("{}", json);
        }

        Command::Render {
            layer,
            style,
            bands,
            output,
        } => {
            let content = std::fs::read_to_string(&bands)
                .with_context(|| format!("Failed to read {}", bands.display()))?;
            let file: BandFile = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", bands.display()))?;

            let tile = engine
                .render_tile(&layer, style.as_deref(), file.into_dataset()?)
                .await?;
            std::fs::write(&output, tile.to_png()?)?;
            info!(
                output = %output.display(),
                width = tile.width,
                height = tile.height,
                "Wrote tile"
            );
        }

        Command::Legend {
            layer,
            style,
            output,
        } => match engine.legend(&layer, style.as_deref())? {
            None => bail!("Style has no legend"),
            Some(Legend::External { url }) => println!("{}", url),
            Some(Legend::Generated(legend)) => {
                std::fs::write(&output, legend.to_png()?)?;
                println!("{}", serde_json::to_string_pretty(&legend.ticks)?);
                info!(output = %output.display(), "Wrote legend");
            }
        },
    }

    if args.print_metrics {
        print!("{}", prometheus.render());
    }
    Ok(())
}
