use crate::error::{Error, PathContext, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Placeholder replaced by the captured material suffix in `texture_template`.
pub const SUFFIX_PLACEHOLDER: &str = "{suffix}";

/// Paths and naming conventions shared by every step of the workflow.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Model stem, the MTL file is `<model>.mtl`.
    pub model: String,
    /// Directory every relative path below is resolved against.
    pub work_dir: PathBuf,

    /// Scene to extract textures from, `<model>.glb` if unset.
    pub scene: Option<PathBuf>,
    /// Blender executable used for `.blend` scenes.
    pub blender: PathBuf,

    pub extracted_dir: PathBuf,
    pub renamed_dir: PathBuf,
    /// Where renamed textures finally land, `work_dir` if unset.
    pub relocate_dir: Option<PathBuf>,

    pub naming: Naming,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Naming {
    /// Regex searched in each material name, group 1 is the suffix.
    pub material_pattern: String,
    /// Texture stem expected for a material, with `{suffix}` substituted.
    pub texture_template: String,
    /// Texture extension, without the dot.
    pub extension: String,
    /// Keyword of the line inserted after `illum`.
    pub map_keyword: String,
    /// Appended to the MTL stem to name the rewritten copy.
    pub updated_suffix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: String::from("model"),
            work_dir: PathBuf::from("."),
            scene: None,
            blender: PathBuf::from("blender"),
            extracted_dir: PathBuf::from("extracted_textures"),
            renamed_dir: PathBuf::from("renamed_textures"),
            relocate_dir: None,
            naming: Naming::default(),
        }
    }
}

impl Default for Naming {
    fn default() -> Self {
        Self {
            material_pattern: String::from("Material_(.*)"),
            texture_template: format!("Image_{SUFFIX_PLACEHOLDER}"),
            extension: String::from("png"),
            map_keyword: String::from("map_Kd"),
            updated_suffix: String::from("_updated"),
        }
    }
}

impl Config {
    /// Reads a TOML config, missing fields keep their defaults.
    pub fn load(p: impl AsRef<Path>) -> Result<Self> {
        let p = p.as_ref();
        let contents = std::fs::read_to_string(p).at(p)?;
        let cfg: Self = toml::from_str(&contents).map_err(|e| Error::Config(p.into(), e))?;
        cfg.naming.validate()?;
        Ok(cfg)
    }

    fn resolve(&self, p: &Path) -> PathBuf {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.work_dir.join(p)
        }
    }

    pub fn mtl_path(&self) -> PathBuf {
        self.work_dir.join(format!("{}.mtl", self.model))
    }

    /// The rewritten MTL lives next to the original.
    pub fn updated_mtl_path(&self) -> PathBuf {
        crate::rewrite::updated_path(self.mtl_path(), &self.naming.updated_suffix)
    }

    pub fn scene_path(&self) -> PathBuf {
        match &self.scene {
            Some(s) => self.resolve(s),
            None => self.work_dir.join(format!("{}.glb", self.model)),
        }
    }

    pub fn extracted_dir(&self) -> PathBuf {
        self.resolve(&self.extracted_dir)
    }

    pub fn renamed_dir(&self) -> PathBuf {
        self.resolve(&self.renamed_dir)
    }

    pub fn relocate_dir(&self) -> PathBuf {
        match &self.relocate_dir {
            Some(d) => self.resolve(d),
            None => self.work_dir.clone(),
        }
    }
}

impl Naming {
    /// Compiles the material pattern, rejecting ones that cannot produce a suffix.
    pub fn pattern(&self) -> Result<Regex> {
        let re = Regex::new(&self.material_pattern)
            .map_err(|e| Error::Pattern(self.material_pattern.clone(), e))?;
        if re.captures_len() < 2 {
            return Err(Error::MissingCapture(self.material_pattern.clone()));
        }
        Ok(re)
    }

    pub fn validate(&self) -> Result<()> {
        self.pattern()?;
        if !self.texture_template.contains(SUFFIX_PLACEHOLDER) {
            return Err(Error::MissingPlaceholder(self.texture_template.clone()));
        }
        Ok(())
    }

    /// Filename a material's texture is expected to have, given its captured suffix.
    pub fn expected_texture(&self, suffix: &str) -> String {
        let stem = self.texture_template.replace(SUFFIX_PLACEHOLDER, suffix);
        format!("{stem}.{}", self.extension)
    }

    /// Filename a texture is renamed to for a given material.
    pub fn renamed_texture(&self, material: &str) -> String {
        format!("{material}.{}", self.extension)
    }

    pub fn has_extension(&self, file_name: &str) -> bool {
        file_name
            .strip_suffix(self.extension.as_str())
            .is_some_and(|stem| stem.ends_with('.'))
    }
}

#[test]
fn test_partial_config() {
    let cfg: Config = toml::from_str(
        r#"
        model = "ValeroRefinery"
        work_dir = "/data"
        [naming]
        extension = "jpg"
        "#,
    )
    .unwrap();
    assert_eq!(cfg.mtl_path(), Path::new("/data/ValeroRefinery.mtl"));
    assert_eq!(
        cfg.updated_mtl_path(),
        Path::new("/data/ValeroRefinery_updated.mtl")
    );
    assert_eq!(cfg.scene_path(), Path::new("/data/ValeroRefinery.glb"));
    assert_eq!(cfg.extracted_dir(), Path::new("/data/extracted_textures"));
    assert_eq!(cfg.relocate_dir(), Path::new("/data"));
    assert_eq!(cfg.naming.extension, "jpg");
    assert_eq!(cfg.naming.map_keyword, "map_Kd");
}

#[test]
fn test_unknown_field_rejected() {
    assert!(toml::from_str::<Config>("modle = \"typo\"").is_err());
}

#[test]
fn test_naming_validation() {
    let mut n = Naming::default();
    assert!(n.validate().is_ok());

    n.material_pattern = String::from("Material_.*");
    assert!(matches!(n.validate(), Err(Error::MissingCapture(_))));

    n.material_pattern = String::from("Material_(");
    assert!(matches!(n.validate(), Err(Error::Pattern(..))));

    n = Naming::default();
    n.texture_template = String::from("Image");
    assert!(matches!(n.validate(), Err(Error::MissingPlaceholder(_))));
}

#[test]
fn test_texture_names() {
    let n = Naming::default();
    assert_eq!(n.expected_texture("0.1000"), "Image_0.1000.png");
    assert_eq!(n.expected_texture(""), "Image_.png");
    assert_eq!(n.renamed_texture("Material_0.1000"), "Material_0.1000.png");
    assert!(n.has_extension("Image_0.png"));
    assert!(!n.has_extension("Image_0.PNG"));
    assert!(!n.has_extension("Image_0png"));
    assert!(!n.has_extension("Image_0.png.bak"));
}

#[test]
fn test_load_sample_config() {
    let cfg = Config::load(concat!(env!("CARGO_MANIFEST_DIR"), "/texmap.toml")).unwrap();
    assert_eq!(cfg.model, "ValeroRefinery");
    assert_eq!(cfg.naming, Naming::default());
}
