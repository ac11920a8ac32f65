use crate::config::Config;
use crate::error::Result;
use clap::Args;
use std::path::PathBuf;

/// Flags shared by every step, applied on top of the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// TOML file with paths and naming conventions
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory relative paths are resolved against
    #[arg(short, long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Model name, the MTL file is <MODEL>.mtl
    #[arg(short, long)]
    pub model: Option<String>,
}

impl CommonArgs {
    pub fn config(&self) -> Result<Config> {
        let mut cfg = match &self.config {
            Some(p) => Config::load(p)?,
            None => Config::default(),
        };
        if let Some(d) = &self.work_dir {
            cfg.work_dir = d.clone();
        }
        if let Some(m) = &self.model {
            cfg.model = m.clone();
        }
        Ok(cfg)
    }
}

/// Logs at `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();
}

#[test]
fn test_flags_override_defaults() {
    let args = CommonArgs {
        config: None,
        work_dir: Some(PathBuf::from("/models")),
        model: Some(String::from("ValeroWA02C")),
    };
    let cfg = args.config().unwrap();
    assert_eq!(cfg.mtl_path(), PathBuf::from("/models/ValeroWA02C.mtl"));
    assert_eq!(cfg.naming, crate::config::Naming::default());
}
