use crate::config::Naming;
use crate::error::{Error, PathContext, Result};
use crate::matcher::TextureMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Fails if `dst_dir` exists and is the same directory as `src_dir`.
fn check_distinct(src_dir: &Path, dst_dir: &Path) -> Result<()> {
    if !fs::exists(dst_dir).at(dst_dir)? || !fs::exists(src_dir).at(src_dir)? {
        return Ok(());
    }
    let src = fs::canonicalize(src_dir).at(src_dir)?;
    if src == fs::canonicalize(dst_dir).at(dst_dir)? {
        return Err(Error::SameDirectory(src));
    }
    Ok(())
}

fn copy(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst).map_err(|e| Error::Copy(src.into(), dst.into(), e))?;
    Ok(())
}

/// Copies each mapped texture from `src_dir` into a freshly recreated `dst_dir`,
/// renamed after its material. Anything already in `dst_dir` is removed first.
///
/// Missing source textures are skipped with a warning. Staging a directory
/// onto itself is an error.
/// Returns the paths written.
pub fn stage_renamed(
    textures: &TextureMap,
    src_dir: impl AsRef<Path>,
    dst_dir: impl AsRef<Path>,
    naming: &Naming,
) -> Result<Vec<PathBuf>> {
    let (src_dir, dst_dir) = (src_dir.as_ref(), dst_dir.as_ref());
    check_distinct(src_dir, dst_dir)?;
    if fs::exists(dst_dir).at(dst_dir)? {
        fs::remove_dir_all(dst_dir).at(dst_dir)?;
    }
    fs::create_dir_all(dst_dir).at(dst_dir)?;

    let mut out = vec![];
    for (material, original) in textures {
        let src = src_dir.join(original);
        if !src.is_file() {
            log::warn!("Source texture not found: {}", src.display());
            continue;
        }
        let new_name = naming.renamed_texture(material);
        let dst = dst_dir.join(&new_name);
        copy(&src, &dst)?;
        log::info!("Copied {original} -> {new_name}");
        out.push(dst);
    }
    Ok(out)
}

/// Copies every texture in `src_dir` into `dst_dir`, overwriting files of the same name.
///
/// A missing `src_dir` is reported and nothing is copied. Copying a directory
/// onto itself is an error.
pub fn relocate(
    src_dir: impl AsRef<Path>,
    dst_dir: impl AsRef<Path>,
    naming: &Naming,
) -> Result<Vec<PathBuf>> {
    let (src_dir, dst_dir) = (src_dir.as_ref(), dst_dir.as_ref());
    if !src_dir.is_dir() {
        log::error!("Source directory {} does not exist", src_dir.display());
        return Ok(vec![]);
    }
    let names = crate::matcher::list_textures(src_dir, naming)?;
    log::info!("Found {} texture files to copy", names.len());

    check_distinct(src_dir, dst_dir)?;
    fs::create_dir_all(dst_dir).at(dst_dir)?;
    let mut out = vec![];
    for name in names {
        let src = src_dir.join(&name);
        let dst = dst_dir.join(&name);
        copy(&src, &dst)?;
        log::info!("Copied {name}");
        out.push(dst);
    }
    Ok(out)
}
