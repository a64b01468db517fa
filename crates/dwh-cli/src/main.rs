//! dwh command-line driver

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glam::Vec3;
use serde::de::DeserializeOwned;

use dwh_core::{
    Block, BoltPlate, BuildConfig, DwhIndex, MemoryDocument, OriginRequest, PartRecipe,
    PartReport, ReportFormat, Rod, RodSupport,
};

#[derive(Parser)]
#[command(name = "dwh")]
#[command(about = "Build reference parts and report their resolved frames", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a part and print where its reference points ended up
    Report {
        /// Part to build
        #[arg(value_enum)]
        part: PartKind,

        /// Build configuration (RON)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Part parameters (RON); defaults are used when omitted
        #[arg(short, long, value_name = "FILE")]
        params: Option<PathBuf>,

        /// Output format (ron, json)
        #[arg(short, long, default_value = "ron")]
        format: ReportFormat,

        /// Point the reference index is placed at
        #[arg(
            long,
            value_name = "X,Y,Z",
            value_parser = parse_vec3,
            default_value = "0,0,0",
            allow_hyphen_values = true
        )]
        at: Vec3,

        /// Reference index placed at `--at`
        #[arg(
            long,
            value_name = "D,W,H",
            value_parser = parse_index,
            default_value = "0,0,0",
            allow_hyphen_values = true
        )]
        index: DwhIndex,

        /// Write the report to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Write the default build configuration
    DefaultConfig {
        /// Destination file
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PartKind {
    Block,
    Rod,
    BoltPlate,
    RodSupport,
}

fn main() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dwh_cli=info,dwh_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Report {
            part,
            config,
            params,
            format,
            at,
            index,
            output,
        } => {
            let config = match config {
                Some(path) => BuildConfig::load(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => BuildConfig::default(),
            };
            let recipe = load_recipe(part, params.as_deref())?;
            let text = report(recipe.as_ref(), OriginRequest::new(at, index), &config, format)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, text)
                        .with_context(|| format!("writing {}", path.display()))?;
                    tracing::info!("report written to {}", path.display());
                }
                None => println!("{}", text),
            }
        }
        Commands::DefaultConfig { file } => {
            BuildConfig::default()
                .save(&file)
                .with_context(|| format!("writing {}", file.display()))?;
            tracing::info!("default configuration written to {}", file.display());
        }
    }
    Ok(())
}

/// Build, realize into a scratch document, and render the report
fn report(
    recipe: &dyn PartRecipe,
    request: OriginRequest,
    config: &BuildConfig,
    format: ReportFormat,
) -> Result<String> {
    let kernel = dwh_kernel::default_kernel();
    let mut part = recipe
        .build(request, kernel.as_ref(), config)
        .with_context(|| format!("building {}", recipe.name()))?;

    let report = PartReport::from_part(&part)?;
    let mut document = MemoryDocument::new();
    part.realize(&mut document)?;
    tracing::info!(
        "{}: {} document objects (kernel: {})",
        recipe.name(),
        document.len(),
        kernel.name()
    );
    Ok(report.render(format)?)
}

fn load_recipe(kind: PartKind, params: Option<&Path>) -> Result<Box<dyn PartRecipe>> {
    match kind {
        PartKind::Block => recipe::<Block>(params),
        PartKind::Rod => recipe::<Rod>(params),
        PartKind::BoltPlate => recipe::<BoltPlate>(params),
        PartKind::RodSupport => recipe::<RodSupport>(params),
    }
}

fn recipe<T>(params: Option<&Path>) -> Result<Box<dyn PartRecipe>>
where
    T: PartRecipe + Default + DeserializeOwned + 'static,
{
    let recipe = match params {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            ron::from_str::<T>(&content)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => T::default(),
    };
    Ok(Box::new(recipe))
}

fn parse_triple<T: std::str::FromStr>(s: &str) -> Result<[T; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [a, b, c] = *parts.as_slice() else {
        return Err(format!("expected three comma-separated values, got '{}'", s));
    };
    let parse = |v: &str| {
        v.parse::<T>()
            .map_err(|_| format!("invalid value '{}' in '{}'", v, s))
    };
    Ok([parse(a)?, parse(b)?, parse(c)?])
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    parse_triple::<f32>(s).map(Vec3::from_array)
}

fn parse_index(s: &str) -> Result<DwhIndex, String> {
    parse_triple::<i32>(s).map(|[d, w, h]| DwhIndex::new(d, w, h))
}
