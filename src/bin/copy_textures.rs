use clap::Parser;
use std::path::PathBuf;
use texmap::cli::{init_logging, CommonArgs};

/// Copy the renamed textures next to the model.
#[derive(Parser, Debug)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Directory holding the renamed textures
    #[arg(short, long, value_name = "DIR")]
    source: Option<PathBuf>,

    /// Destination, defaults to the work directory
    #[arg(short, long, value_name = "DIR")]
    dest: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();
    let mut cfg = args.common.config()?;
    if let Some(s) = args.source {
        cfg.renamed_dir = s;
    }
    if let Some(d) = args.dest {
        cfg.relocate_dir = Some(d);
    }

    let copied = texmap::relocate::relocate(cfg.renamed_dir(), cfg.relocate_dir(), &cfg.naming)?;
    if copied.is_empty() {
        return Ok(());
    }
    log::info!("Done! All texture files copied to {}", cfg.relocate_dir().display());
    log::info!(
        "Now use {} (or rename it to {}.mtl) to see textures in a 3D viewer",
        cfg.updated_mtl_path().display(),
        cfg.model
    );
    Ok(())
}
