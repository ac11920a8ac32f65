use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use texmap::cli::{init_logging, CommonArgs};
use texmap::extract;

/// Dump packed textures of a scene (.glb, .gltf, or .blend) as PNG files.
#[derive(Parser, Debug)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Scene file, defaults to <MODEL>.glb
    scene: Option<PathBuf>,

    /// Output directory for the extracted textures
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Blender executable used for .blend scenes
    #[arg(long, value_name = "EXE")]
    blender: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();
    let mut cfg = args.common.config()?;
    if let Some(s) = args.scene {
        cfg.scene = Some(s);
    }
    if let Some(o) = args.output {
        cfg.extracted_dir = o;
    }
    if let Some(b) = args.blender {
        cfg.blender = b;
    }

    let scene = cfg.scene_path();
    let report = extract::extract(&scene, cfg.extracted_dir(), &cfg)
        .with_context(|| format!("Failed to extract textures from {}", scene.display()))?;
    if !report.existing.is_empty() {
        log::info!("{} textures already present, left as is", report.existing.len());
    }
    if !report.failed.is_empty() {
        log::warn!("{} textures could not be extracted", report.failed.len());
    }

    // The MTL exported next to the scene, for comparison.
    let mtl = scene.with_file_name(format!("{}.mtl", cfg.model));
    extract::report_mtl_refs(mtl)?;
    Ok(())
}
