use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("could not read or write file")]
    Io(#[from] io::Error),
    #[error("{}: {}", .0.display(), .1)]
    File(PathBuf, #[source] io::Error),
    #[error("failed to copy {} to {}", .0.display(), .1.display())]
    Copy(PathBuf, PathBuf, #[source] io::Error),
    #[error("{} is both the source and the destination", .0.display())]
    SameDirectory(PathBuf),

    #[error("invalid config file {}", .0.display())]
    Config(PathBuf, #[source] toml::de::Error),
    #[error("invalid material pattern {0:?}")]
    Pattern(String, #[source] regex::Error),
    #[error("material pattern {0:?} has no capture group for the suffix")]
    MissingCapture(String),
    #[error("texture template {0:?} is missing the {{suffix}} placeholder")]
    MissingPlaceholder(String),

    #[error("don't know how to extract textures from {}", .0.display())]
    UnknownScene(PathBuf),
    #[cfg(feature = "gltf")]
    #[error("failed to load glTF scene")]
    Gltf(#[from] gltf::Error),
    #[error("failed to convert image")]
    Image(#[from] image::ImageError),
    #[error("failed to launch {}", .0.display())]
    Spawn(PathBuf, #[source] io::Error),
    #[error("blender exited with {0}")]
    Blender(std::process::ExitStatus),
}

/// Attaches the offending path to an io error.
pub(crate) trait PathContext<T> {
    fn at(self, p: impl Into<PathBuf>) -> Result<T>;
}

impl<T> PathContext<T> for io::Result<T> {
    fn at(self, p: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| Error::File(p.into(), e))
    }
}
