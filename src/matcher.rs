use crate::config::Naming;
use crate::error::{PathContext, Result};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Material name -> filename of the texture found for it.
pub type TextureMap = BTreeMap<String, String>;

/// Pairs material names with texture filenames by naming convention.
pub struct Matcher<'a> {
    pattern: Regex,
    naming: &'a Naming,
}

impl<'a> Matcher<'a> {
    pub fn new(naming: &'a Naming) -> Result<Self> {
        Ok(Self {
            pattern: naming.pattern()?,
            naming,
        })
    }

    /// The texture filename expected for `material`, or None if the pattern does not match.
    pub fn expected_texture(&self, material: &str) -> Option<String> {
        let caps = self.pattern.captures(material)?;
        let suffix = caps.get(1).map_or("", |m| m.as_str());
        Some(self.naming.expected_texture(suffix))
    }

    /// Maps every material whose expected texture is in `textures`.
    ///
    /// Materials the pattern does not match are skipped silently, ones whose
    /// texture is missing are skipped with a warning. A repeated material name
    /// overwrites the earlier entry.
    pub fn map<S: AsRef<str>>(&self, materials: &[S], textures: &BTreeSet<String>) -> TextureMap {
        let mut out = TextureMap::new();
        for material in materials {
            let material = material.as_ref();
            let Some(expected) = self.expected_texture(material) else {
                log::debug!("{material} does not follow the naming pattern, skipping");
                continue;
            };
            if !textures.contains(&expected) {
                log::warn!("No texture found for material {material} (expected {expected})");
                continue;
            }
            log::info!("Mapped {material} -> {expected}");
            if out.insert(material.to_string(), expected).is_some() {
                log::warn!("Material {material} is declared more than once");
            }
        }
        out
    }
}

/// Filenames in `dir` with the naming extension.
/// A missing directory is reported and treated as empty.
pub fn list_textures(dir: impl AsRef<Path>, naming: &Naming) -> Result<BTreeSet<String>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        log::warn!("Texture directory {} does not exist", dir.display());
        return Ok(BTreeSet::new());
    }
    let mut out = BTreeSet::new();
    for entry in std::fs::read_dir(dir).at(dir)? {
        let entry = entry.at(dir)?;
        let Some(name) = entry.file_name().to_str().map(String::from) else {
            continue;
        };
        if naming.has_extension(&name) {
            out.insert(name);
        }
    }
    Ok(out)
}

#[cfg(test)]
fn textures(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_map_skips_missing_texture() {
    let naming = Naming::default();
    let m = Matcher::new(&naming).unwrap();
    let out = m.map(
        &["Material_0.1000", "Material_0.1001"],
        &textures(&["Image_0.1000.png"]),
    );
    assert_eq!(out.len(), 1);
    assert_eq!(out["Material_0.1000"], "Image_0.1000.png");
}

#[test]
fn test_expected_texture() {
    let naming = Naming::default();
    let m = Matcher::new(&naming).unwrap();
    assert_eq!(
        m.expected_texture("Material_0.1000").as_deref(),
        Some("Image_0.1000.png")
    );
    // the pattern is searched, not anchored
    assert_eq!(
        m.expected_texture("Old_Material_7").as_deref(),
        Some("Image_7.png")
    );
    assert_eq!(m.expected_texture("Material_").as_deref(), Some("Image_.png"));
    assert_eq!(m.expected_texture("material_3"), None);
    assert_eq!(m.expected_texture("Glass"), None);
}

#[test]
fn test_empty_suffix_looked_up_literally() {
    let naming = Naming::default();
    let m = Matcher::new(&naming).unwrap();
    let out = m.map(&["Material_"], &textures(&["Image_.png"]));
    assert_eq!(out["Material_"], "Image_.png");
    assert!(m.map(&["Material_"], &textures(&["Image.png"])).is_empty());
}

#[test]
fn test_no_case_folding() {
    let naming = Naming::default();
    let m = Matcher::new(&naming).unwrap();
    let out = m.map(&["Material_A"], &textures(&["image_A.png", "Image_a.png", "Image_A.PNG"]));
    assert!(out.is_empty());
}

#[test]
fn test_custom_naming() {
    let naming = Naming {
        material_pattern: String::from("^mat-(\\d+)$"),
        texture_template: String::from("tex_{suffix}_diffuse"),
        extension: String::from("jpg"),
        ..Naming::default()
    };
    let m = Matcher::new(&naming).unwrap();
    let out = m.map(&["mat-12", "mat-x", "mat-3"], &textures(&["tex_12_diffuse.jpg"]));
    assert_eq!(out.len(), 1);
    assert_eq!(out["mat-12"], "tex_12_diffuse.jpg");
}

#[test]
fn test_duplicate_material_overwrites() {
    let naming = Naming::default();
    let m = Matcher::new(&naming).unwrap();
    let out = m.map(&["Material_1", "Material_1"], &textures(&["Image_1.png"]));
    assert_eq!(out.len(), 1);
    assert_eq!(out["Material_1"], "Image_1.png");
}
