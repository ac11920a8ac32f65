use crate::config::Naming;
use crate::error::{PathContext, Result};
use crate::matcher::TextureMap;
use crate::mtl;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// `dir/name.mtl` -> `dir/name<suffix>.mtl`
pub fn updated_path(p: impl AsRef<Path>, suffix: &str) -> PathBuf {
    let p = p.as_ref();
    let stem = p.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let name = match p.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    p.with_file_name(name)
}

/// State carried from line to line while rewriting.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Rewriter {
    /// Most recent `newmtl` name.
    curr_mtl: Option<String>,
    /// Number of lines inserted so far.
    pub inserted: usize,
}

impl Rewriter {
    /// Feeds one raw line (with its terminator, if any).
    /// Returns the line to insert right after it.
    pub fn step(&mut self, l: &str, textures: &TextureMap, naming: &Naming) -> Option<String> {
        if l.starts_with(mtl::NEWMTL) {
            self.curr_mtl = mtl::declared_material(l).map(String::from);
            return None;
        }
        if !mtl::is_illum(l) {
            return None;
        }
        let name = self.curr_mtl.as_deref()?;
        if !textures.contains_key(name) {
            return None;
        }
        self.inserted += 1;
        let eol = if l.ends_with("\r\n") { "\r\n" } else { "\n" };
        Some(format!(
            "{} {}{eol}",
            naming.map_keyword,
            naming.renamed_texture(name)
        ))
    }
}

/// Copies `src` to `dst` line by line, adding a diffuse map line after the
/// `illum` line of every material in `textures`. Returns the number of lines added.
pub fn rewrite(
    mut src: impl BufRead,
    mut dst: impl Write,
    textures: &TextureMap,
    naming: &Naming,
) -> Result<usize> {
    let mut state = Rewriter::default();
    let mut l = String::new();
    loop {
        l.clear();
        if src.read_line(&mut l)? == 0 {
            break;
        }
        dst.write_all(l.as_bytes())?;
        if let Some(extra) = state.step(&l, textures, naming) {
            // a final `illum` line without a newline still needs one before the map
            if !l.ends_with('\n') {
                dst.write_all(b"\n")?;
            }
            dst.write_all(extra.as_bytes())?;
        }
    }
    dst.flush()?;
    Ok(state.inserted)
}

/// Writes the rewritten copy of `src_path` to `dst_path`. The source is not modified.
pub fn rewrite_file(
    src_path: impl AsRef<Path>,
    dst_path: impl AsRef<Path>,
    textures: &TextureMap,
    naming: &Naming,
) -> Result<usize> {
    let (src_path, dst_path) = (src_path.as_ref(), dst_path.as_ref());
    let src = BufReader::new(File::open(src_path).at(src_path)?);
    let dst = BufWriter::new(File::create(dst_path).at(dst_path)?);
    let n = rewrite(src, dst, textures, naming)?;
    log::info!("Updated MTL file saved as: {}", dst_path.display());
    Ok(n)
}

#[cfg(test)]
fn rewrite_str(src: &str, mapped: &[&str]) -> String {
    let naming = Naming::default();
    let textures: TextureMap = mapped
        .iter()
        .map(|m| (m.to_string(), String::from("unused.png")))
        .collect();
    let mut out = vec![];
    rewrite(src.as_bytes(), &mut out, &textures, &naming).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_insert_after_illum() {
    let src = "newmtl Material_0.1000\nKd 1 1 1\nillum 2\n";
    assert_eq!(
        rewrite_str(src, &["Material_0.1000"]),
        "newmtl Material_0.1000\nKd 1 1 1\nillum 2\nmap_Kd Material_0.1000.png\n"
    );
}

#[test]
fn test_unmapped_untouched() {
    let src = "# c\nnewmtl A\nillum 2\n\nnewmtl B\nNs 1\nillum 1\nnewmtl C\nKd 0 0 0\n";
    assert_eq!(rewrite_str(src, &[]), src);
    assert_eq!(
        rewrite_str(src, &["B", "C"]),
        "# c\nnewmtl A\nillum 2\n\nnewmtl B\nNs 1\nillum 1\nmap_Kd B.png\nnewmtl C\nKd 0 0 0\n"
    );
}

#[test]
fn test_illum_before_any_material() {
    assert_eq!(rewrite_str("illum 2\nnewmtl A\n", &["A"]), "illum 2\nnewmtl A\n");
}

#[test]
fn test_line_endings_preserved() {
    assert_eq!(
        rewrite_str("newmtl A\r\nillum 2\r\n", &["A"]),
        "newmtl A\r\nillum 2\r\nmap_Kd A.png\r\n"
    );
    assert_eq!(
        rewrite_str("newmtl A\nillum 2", &["A"]),
        "newmtl A\nillum 2\nmap_Kd A.png\n"
    );
}

#[test]
fn test_updated_path() {
    assert_eq!(
        updated_path("dir/Valero.mtl", "_updated"),
        Path::new("dir/Valero_updated.mtl")
    );
    assert_eq!(
        updated_path("a.mtl.d/x.mtl", "_new"),
        Path::new("a.mtl.d/x_new.mtl")
    );
    assert_eq!(updated_path("noext", "_u"), Path::new("noext_u"));
}
