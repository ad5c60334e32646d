//! gvr-sphere: generate unit sphere meshes from the command line

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use gvr_core::{MeshFormat, SphereConfig, SphereLayout, save_mesh};

#[derive(Parser, Debug)]
#[command(name = "gvr-sphere", version, about = "Procedural unit sphere meshes")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a sphere and write it as OBJ or STL
    Generate {
        /// RON config file; flags override its values
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        stacks: Option<u32>,
        #[arg(long)]
        slices: Option<u32>,
        /// Output file (format follows the extension unless --format is given)
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, value_enum)]
        format: Option<Format>,
    },
    /// Print buffer sizes for a tessellation
    Stats {
        #[arg(long, default_value_t = gvr_core::STACK_NUMBER)]
        stacks: u32,
        #[arg(long, default_value_t = gvr_core::SLICE_NUMBER)]
        slices: u32,
    },
    /// Write a config file with default values
    InitConfig { path: PathBuf },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Format {
    Obj,
    Stl,
}

impl From<Format> for MeshFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Obj => MeshFormat::Obj,
            Format::Stl => MeshFormat::Stl,
        }
    }
}

fn main() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gvr_core=info,gvr_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Generate {
            config,
            stacks,
            slices,
            out,
            format,
        } => {
            let config = build_config(config.as_deref(), stacks, slices, out, format)?;
            generate(&config)
        }
        Command::Stats { stacks, slices } => {
            let layout = SphereLayout::new(stacks, slices)?;
            print!("{}", format_stats(&layout));
            Ok(())
        }
        Command::InitConfig { path } => {
            SphereConfig::default()
                .save(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("Wrote default config to '{}'", path.display());
            Ok(())
        }
    }
}

/// Merge a config file (if any) with command-line overrides
fn build_config(
    path: Option<&Path>,
    stacks: Option<u32>,
    slices: Option<u32>,
    out: Option<PathBuf>,
    format: Option<Format>,
) -> Result<SphereConfig> {
    let mut config = match path {
        Some(path) => SphereConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SphereConfig::default(),
    };
    if let Some(stacks) = stacks {
        config.stacks = stacks;
    }
    if let Some(slices) = slices {
        config.slices = slices;
    }
    if out.is_some() {
        config.output = out;
    }
    if let Some(format) = format {
        config.format = format.into();
        // An explicit flag beats the output extension.
        if let Some(output) = config.output.as_mut() {
            if MeshFormat::from_path(output) != config.format {
                if let Some(ext) = config.format.extension() {
                    output.set_extension(ext);
                }
            }
        }
    }
    Ok(config)
}

fn generate(config: &SphereConfig) -> Result<()> {
    let layout = config.validate()?;
    let target = match config.output.as_deref() {
        Some(output) => {
            let format = config.resolved_format();
            if format == MeshFormat::Unknown {
                bail!("cannot pick a mesh format for {}", output.display());
            }
            Some((output, format))
        }
        None => None,
    };

    let mesh = config.generate()?;
    tracing::info!(
        "Generated '{}': {} stacks x {} slices, {} triangles",
        config.name,
        layout.stacks,
        layout.slices,
        layout.emitted_triangle_count()
    );

    let Some((output, format)) = target else {
        print!("{}", format_stats(&layout));
        return Ok(());
    };
    save_mesh(&mesh, output, format)
        .with_context(|| format!("writing {} to {}", format.name(), output.display()))?;
    Ok(())
}

fn format_stats(layout: &SphereLayout) -> String {
    format!(
        "stacks: {}\nslices: {}\nallocated vertices: {}\nallocated indices: {}\nemitted vertices: {}\nemitted indices: {}\ntriangles: {}\n",
        layout.stacks,
        layout.slices,
        layout.vertex_count,
        layout.index_count,
        layout.emitted_vertex_count,
        layout.emitted_index_count,
        layout.emitted_triangle_count(),
    )
}
