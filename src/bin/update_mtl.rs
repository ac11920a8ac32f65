use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use texmap::cli::{init_logging, CommonArgs};

/// Rename extracted textures after the materials that use them and write a
/// copy of the MTL file referencing them.
#[derive(Parser, Debug)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Directory holding the extracted textures
    #[arg(short, long, value_name = "DIR")]
    textures: Option<PathBuf>,

    /// Directory the renamed textures are written to, recreated on every run
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();
    let mut cfg = args.common.config()?;
    if let Some(t) = args.textures {
        cfg.extracted_dir = t;
    }
    if let Some(o) = args.output {
        cfg.renamed_dir = o;
    }

    let summary = texmap::update_mtl(&cfg)
        .with_context(|| format!("Failed to update {}", cfg.mtl_path().display()))?;
    log::info!(
        "Added {} texture references for {} materials",
        summary.inserted,
        summary.materials
    );
    log::info!("Process completed successfully!");
    Ok(())
}
