use std::path::PathBuf;

pub mod error;
pub use error::{Error, Result};

/// Paths and naming conventions.
pub mod config;
pub use config::{Config, Naming};

/// Command line flags shared by the binaries.
pub mod cli;

/// Line level MTL scanning.
pub mod mtl;

/// Material name to texture filename matching.
pub mod matcher;
pub use matcher::{Matcher, TextureMap};

/// MTL rewriting with inserted diffuse maps.
pub mod rewrite;

/// Copying textures between directories.
pub mod relocate;

/// Dumping packed textures out of scene files.
pub mod extract;

/// Outcome of [`update_mtl`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSummary {
    pub materials: usize,
    pub textures: usize,
    pub mapping: TextureMap,
    pub staged: Vec<PathBuf>,
    pub updated_mtl: PathBuf,
    pub inserted: usize,
}

/// Matches the MTL's materials against the extracted textures, stages the
/// renamed copies and writes the updated MTL next to the original.
pub fn update_mtl(cfg: &Config) -> Result<UpdateSummary> {
    let naming = &cfg.naming;
    naming.validate()?;
    let matcher = Matcher::new(naming)?;

    let mtl_path = cfg.mtl_path();
    log::info!("Reading materials from {}", mtl_path.display());
    let materials = mtl::parse_materials(&mtl_path)?;
    log::info!("Found {} materials in MTL file", materials.len());

    let texture_dir = cfg.extracted_dir();
    let textures = matcher::list_textures(&texture_dir, naming)?;
    log::info!("Found {} textures in {}", textures.len(), texture_dir.display());

    let mapping = matcher.map(&materials, &textures);
    log::info!("Successfully mapped {} materials to textures", mapping.len());

    log::info!("Renaming and copying textures...");
    let renamed_dir = cfg.renamed_dir();
    let staged = relocate::stage_renamed(&mapping, &texture_dir, &renamed_dir, naming)?;
    log::info!("Renamed textures saved in: {}", renamed_dir.display());

    log::info!("Updating MTL file with texture references...");
    let updated_mtl = cfg.updated_mtl_path();
    let inserted = rewrite::rewrite_file(&mtl_path, &updated_mtl, &mapping, naming)?;

    Ok(UpdateSummary {
        materials: materials.len(),
        textures: textures.len(),
        mapping,
        staged,
        updated_mtl,
        inserted,
    })
}
