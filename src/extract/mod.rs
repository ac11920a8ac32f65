use crate::config::Config;
use crate::error::{Error, PathContext, Result};
use std::path::{Path, PathBuf};

/// Extraction by driving Blender in the background.
pub mod blender;

/// In-process extraction from glTF/GLB files.
#[cfg(feature = "gltf")]
pub mod glb;

/// Scene file formats textures can be extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneFormat {
    /// GLTF Binary Format (.glb)
    GLB,
    /// GLTF JSON Format (.gltf), buffers may be external or data URIs
    GLTF,
    /// Blender scene (.blend), needs a Blender executable
    Blend,

    Unknown,
}

/// Given something that looks like a path parse it into a SceneFormat.
pub fn extension_to_format(s: impl AsRef<Path>) -> SceneFormat {
    let Some(e) = s.as_ref().extension().and_then(|e| e.to_str()) else {
        return SceneFormat::Unknown;
    };
    let matches = [
        ("glb", SceneFormat::GLB),
        ("gltf", SceneFormat::GLTF),
        ("blend", SceneFormat::Blend),
    ];
    for (ext, fmt) in matches {
        if ext.eq_ignore_ascii_case(e) {
            return fmt;
        }
    }
    SceneFormat::Unknown
}

/// What happened to the textures of one scene.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractReport {
    /// Materials visited, in scene order.
    pub materials: Vec<String>,
    /// Files written.
    pub saved: Vec<PathBuf>,
    /// Files that already existed and were left alone.
    pub existing: Vec<PathBuf>,
    /// Images that are not embedded in the scene.
    pub external: Vec<String>,
    /// Images that could not be written, with the reason.
    pub failed: Vec<(String, String)>,
}

/// Filename a packed image is written to.
pub(crate) fn texture_file_name(name: Option<&str>, index: usize) -> String {
    match name {
        Some(n) if !n.is_empty() => format!("{}.png", n.replace(['/', '\\'], "_")),
        _ => format!("texture_{index}.png"),
    }
}

/// Writes every packed texture in `scene` to `out_dir` as PNG.
pub fn extract(scene: impl AsRef<Path>, out_dir: impl AsRef<Path>, cfg: &Config) -> Result<ExtractReport> {
    let (scene, out_dir) = (scene.as_ref(), out_dir.as_ref());
    std::fs::create_dir_all(out_dir).at(out_dir)?;
    log::info!("Processing file: {}", scene.display());
    log::info!("Saving textures to: {}", out_dir.display());

    use SceneFormat::*;
    let report = match extension_to_format(scene) {
        #[cfg(feature = "gltf")]
        GLB | GLTF => glb::extract(scene, out_dir)?,
        #[cfg(not(feature = "gltf"))]
        GLB | GLTF => return Err(Error::UnknownScene(scene.into())),

        Blend => blender::extract(&cfg.blender, scene, out_dir)?,
        Unknown => return Err(Error::UnknownScene(scene.into())),
    };
    log::info!(
        "Extraction complete. {} textures extracted to {}",
        report.saved.len(),
        out_dir.display()
    );
    Ok(report)
}

/// Logs the texture map lines of an existing MTL file. Returns them, or None
/// if there is no such file.
pub fn report_mtl_refs(mtl: impl AsRef<Path>) -> Result<Option<Vec<String>>> {
    let mtl = mtl.as_ref();
    if !mtl.is_file() {
        log::info!("MTL file not found: {}", mtl.display());
        return Ok(None);
    }
    log::info!("Checking MTL file: {}", mtl.display());
    let refs = crate::mtl::parse_texture_refs(mtl)?;
    if refs.is_empty() {
        log::info!("No texture references found in MTL file");
    } else {
        log::info!("Found {} texture references in MTL file:", refs.len());
        for r in &refs {
            log::info!("  {r}");
        }
    }
    Ok(Some(refs))
}

#[test]
fn test_extension_to_format() {
    assert_eq!(extension_to_format("a/b.GLB"), SceneFormat::GLB);
    assert_eq!(extension_to_format("scene.gltf"), SceneFormat::GLTF);
    assert_eq!(extension_to_format("ValeroWA02C.blend"), SceneFormat::Blend);
    assert_eq!(extension_to_format("x.obj"), SceneFormat::Unknown);
    assert_eq!(extension_to_format("noext"), SceneFormat::Unknown);
}

#[test]
fn test_texture_file_name() {
    assert_eq!(texture_file_name(Some("Image_0.1000"), 3), "Image_0.1000.png");
    assert_eq!(texture_file_name(Some("a/b"), 3), "a_b.png");
    assert_eq!(texture_file_name(Some(""), 3), "texture_3.png");
    assert_eq!(texture_file_name(None, 0), "texture_0.png");
}
