//! Load launcher settings: built-in defaults, yaml files, then `GOGRUN_*` variables.
use crate::error::Result;

use clap::crate_name;
use config::{Config, Environment, File};
use serde::Deserialize;

use std::env;
use std::path::{Path, PathBuf};

use log::debug;

pub const ENV_PREFIX: &str = "GOGRUN";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub output_dir: PathBuf,      // relative to the project root unless absolute
    pub binary_name: String,      // without platform suffix
    pub package: String,          // entry point handed to go build
    pub version_module: String,   // package holding version/commit/date
    pub go: String,               // go toolchain executable
    pub git: String,              // git executable
    pub debug: bool,              // debug events on terminal and in log file
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            output_dir: PathBuf::from("bin"),
            binary_name: "gog".to_string(),
            package: "./cmd/gog".to_string(),
            version_module: "github.com/steipete/gogcli/internal/cmd".to_string(),
            go: "go".to_string(),
            git: "git".to_string(),
            debug: false,
            log_file: None,
        }
    }
}

/// User level config file: `$GOGRUN_CONFIG`, or `gogrun.yaml` in the user config dir.
pub fn user_config_file() -> Option<PathBuf> {
    match env::var_os(format!("{ENV_PREFIX}_CONFIG")) {
        Some(v) => Some(PathBuf::from(v)),
        None => dirs::config_dir().map(|d| d.join(format!("{}.yaml", crate_name!()))),
    }
}

/// Config file checked into the project itself.
pub fn project_config_file(project_root: &Path) -> PathBuf {
    project_root.join(format!("{}.yaml", crate_name!()))
}

impl Settings {
    /// Merge `files` (missing ones are skipped, later ones win) and the process environment.
    pub fn load(files: &[PathBuf]) -> Result<Settings> {
        Settings::load_with(files, Environment::with_prefix(ENV_PREFIX))
    }

    pub fn load_with(files: &[PathBuf], environment: Environment) -> Result<Settings> {
        let mut builder = Config::builder();
        for file in files {
            debug!("config file {}", file.display());
            builder = builder.add_source(File::from(file.as_path()).required(false));
        }
        let settings = builder
            .add_source(environment)
            .build()?
            .try_deserialize::<Settings>()?;
        Ok(settings)
    }
}
