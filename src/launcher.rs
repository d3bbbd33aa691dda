//! Build the target program with fresh metadata, then hand it the caller's arguments.
//!
//! The steps run strictly in order and each one blocks until its subprocess is done:
//!
//! `Init -> DirectoryReady -> MetadataResolved -> Built -> Executed`
//!
//! A failing compiler stops the sequence after `MetadataResolved`, and its status becomes
//! the exit code. Concurrent launchers writing the same output path are not serialized.
use crate::config::Settings;
use crate::error::{LaunchError, Result};
use crate::metadata::BuildMetadata;
use crate::runner::{ProcessRunner, Status};

use log::{debug, info};
use std::cell::Cell;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::{env, fmt, fs};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    pub fn current() -> Platform {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    pub fn exe_suffix(&self) -> &'static str {
        match self {
            Platform::Windows => ".exe",
            Platform::Unix => "",
        }
    }
}

/// Process-wide state the launcher depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub project_root: PathBuf,
    pub platform: Platform,
    pub argv: Vec<OsString>, // forwarded as is to the built binary
}

impl Invocation {
    pub fn from_env() -> Result<Invocation> {
        Ok(Invocation {
            project_root: env::current_dir().map_err(LaunchError::ProjectRoot)?,
            platform: Platform::current(),
            argv: env::args_os().skip(1).collect(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    DirectoryReady,
    MetadataResolved,
    Built,
    Executed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::DirectoryReady => "directory ready",
            Stage::MetadataResolved => "metadata resolved",
            Stage::Built => "built",
            Stage::Executed => "executed",
        };
        write!(f, "{s}")
    }
}

pub struct Launcher {
    settings: Settings,
    invocation: Invocation,
    runner: Box<dyn ProcessRunner>,
    stage: Cell<Stage>,
}

impl Launcher {
    pub fn new(
        settings: Settings,
        invocation: Invocation,
        runner: Box<dyn ProcessRunner>,
    ) -> Launcher {
        Launcher {
            settings,
            invocation,
            runner,
            stage: Cell::new(Stage::Init),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage.get()
    }

    fn advance(&self, stage: Stage) {
        debug!("{} -> {}", self.stage.get(), stage);
        self.stage.set(stage);
    }

    pub fn output_dir(&self) -> PathBuf {
        self.invocation.project_root.join(&self.settings.output_dir)
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir().join(format!(
            "{}{}",
            self.settings.binary_name,
            self.invocation.platform.exe_suffix()
        ))
    }

    pub fn ensure_output_dir(&self) -> Result<PathBuf> {
        let dir = self.output_dir();
        fs::create_dir_all(&dir).map_err(|source| LaunchError::OutputDir {
            path: dir.clone(),
            source,
        })?;
        Ok(dir)
    }

    pub fn resolve_metadata(&self) -> BuildMetadata {
        BuildMetadata::resolve(self.runner.as_ref(), OsStr::new(&self.settings.git))
    }

    pub fn build_args(&self, metadata: &BuildMetadata, binary: &Path) -> Vec<OsString> {
        vec![
            "build".into(),
            "-ldflags".into(),
            metadata.ldflags(&self.settings.version_module).into(),
            "-o".into(),
            binary.as_os_str().to_os_string(),
            self.settings.package.clone().into(),
        ]
    }

    pub fn build(&self, metadata: &BuildMetadata, binary: &Path) -> Result<Status> {
        info!("build {} {}", self.settings.package, metadata);
        let go = OsStr::new(&self.settings.go);
        self.runner
            .run_inherited(go, &self.build_args(metadata, binary))
            .map_err(|source| LaunchError::Spawn {
                program: self.settings.go.clone(),
                source,
            })
    }

    pub fn execute(&self, binary: &Path) -> Result<Status> {
        info!("run {} {:?}", binary.display(), self.invocation.argv);
        self.runner
            .run_inherited(binary.as_os_str(), &self.invocation.argv)
            .map_err(|source| LaunchError::Spawn {
                program: binary.display().to_string(),
                source,
            })
    }

    /// Run every step and return the code the process must exit with.
    pub fn run(&self) -> Result<i32> {
        self.ensure_output_dir()?;
        self.advance(Stage::DirectoryReady);

        let metadata = self.resolve_metadata();
        self.advance(Stage::MetadataResolved);

        let binary = self.output_path();
        let status = self.build(&metadata, &binary)?;
        if !status.success() {
            info!("build failed with status {:?}", status.code());
            return Ok(status.exit_code());
        }
        self.advance(Stage::Built);

        let status = self.execute(&binary)?;
        self.advance(Stage::Executed);
        debug!("{} exited with {:?}", binary.display(), status.code());
        Ok(status.exit_code())
    }
}
