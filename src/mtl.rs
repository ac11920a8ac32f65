use crate::error::{PathContext, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Starts a material block.
pub const NEWMTL: &str = "newmtl";
/// Illumination model, the diffuse map is inserted after it.
pub const ILLUM: &str = "illum";
/// Prefix shared by all texture map keywords.
pub const MAP_PREFIX: &str = "map_";

/// Material name declared by a `newmtl` line, if `l` is one.
///
/// Keywords are matched on the start of the raw line, so indented or
/// differently cased keywords are not recognized.
pub fn declared_material(l: &str) -> Option<&str> {
    if !l.starts_with(NEWMTL) {
        return None;
    }
    let mut iter = l.split_whitespace();
    iter.next();
    let name = iter.next();
    if name.is_none() {
        log::warn!("`{NEWMTL}` without a material name: {:?}", l.trim_end());
    }
    name
}

pub fn is_illum(l: &str) -> bool {
    l.starts_with(ILLUM)
}

/// Material names in order of declaration. Duplicates are kept.
pub fn read_materials(buf_read: impl BufRead) -> Result<Vec<String>> {
    let mut out = vec![];
    for l in buf_read.lines() {
        let l = l?;
        if let Some(name) = declared_material(&l) {
            out.push(name.to_string());
        }
    }
    Ok(out)
}

pub fn parse_materials(p: impl AsRef<Path>) -> Result<Vec<String>> {
    let p = p.as_ref();
    let f = File::open(p).at(p)?;
    read_materials(BufReader::new(f))
}

/// Every texture map line (`map_Kd`, `map_Ks`, ...), trimmed.
pub fn read_texture_refs(buf_read: impl BufRead) -> Result<Vec<String>> {
    let mut out = vec![];
    for l in buf_read.lines() {
        let l = l?;
        if l.starts_with(MAP_PREFIX) {
            out.push(l.trim().to_string());
        }
    }
    Ok(out)
}

pub fn parse_texture_refs(p: impl AsRef<Path>) -> Result<Vec<String>> {
    let p = p.as_ref();
    let f = File::open(p).at(p)?;
    read_texture_refs(BufReader::new(f))
}

#[cfg(test)]
const VALERO: &str = "\
# Blender MTL File
newmtl Material_0.1000
Ns 250.000000
Ka 1.000000 1.000000 1.000000
Kd 0.800000 0.800000 0.800000
illum 2

newmtl Material_0.1001
Kd 0.5 0.5 0.5
map_Kd old_texture.png
illum 2
newmtl
  newmtl Indented
";

#[test]
fn test_read_materials() {
    let names = read_materials(VALERO.as_bytes()).unwrap();
    assert_eq!(names, ["Material_0.1000", "Material_0.1001"]);
}

#[test]
fn test_read_texture_refs() {
    let refs = read_texture_refs(VALERO.as_bytes()).unwrap();
    assert_eq!(refs, ["map_Kd old_texture.png"]);
}

#[test]
fn test_keywords_match_line_start() {
    assert_eq!(declared_material("newmtl a b"), Some("a"));
    assert_eq!(declared_material("newmtl\tb\r\n"), Some("b"));
    assert_eq!(declared_material(" newmtl a"), None);
    assert!(is_illum("illum 2"));
    assert!(!is_illum("  illum 2"));
}
