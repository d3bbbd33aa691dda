//! `gogrun` builds the `gog` command line program from the current checkout and runs it.
//!
//! Version, commit and build date are taken from git and injected with `-ldflags`, so the
//! freshly built binary reports where it comes from.
//! Every argument given to `gogrun` is passed unchanged to `gog`, and `gogrun` exits with
//! the same status.
//!
//! Settings come from `gogrun.yaml` (user config dir, then project root) and `GOGRUN_*`
//! environment variables.
mod config;
mod error;
mod launcher;
mod metadata;
mod runner;

use clap::{crate_name, crate_version};
use std::fs::OpenOptions;
use std::process;

use log::{SetLoggerError, debug, error, warn};
use simplelog::*;

use crate::config::Settings;
use crate::launcher::{Invocation, Launcher};
use crate::runner::SystemRunner;

fn init_logger(settings: &Settings) -> Result<(), SetLoggerError> {
    let conflog = ConfigBuilder::new().set_time_format_rfc3339().build();

    let mut log_level_term = LevelFilter::Warn;
    let mut log_level_file = LevelFilter::Info;
    if settings.debug {
        log_level_term = LevelFilter::Debug;
        log_level_file = LevelFilter::Debug;
    }
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        log_level_term,
        conflog.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    let mut unopened = None;
    if let Some(path) = &settings.log_file {
        match OpenOptions::new()
            .create(true) // to allow creating the file, if it doesn't exist
            .append(true) // to not truncate the file, but instead add to it
            .open(path)
        {
            Ok(f) => loggers.push(WriteLogger::new(log_level_file, conflog, f)),
            Err(e) => unopened = Some(format!("{}: {e}", path.display())),
        }
    }
    CombinedLogger::init(loggers)?;
    if let Some(msg) = unopened {
        warn!("Unable to open log file {msg}");
    }
    Ok(())
}

fn setup_logger(settings: &Settings) {
    if let Err(e) = init_logger(settings) {
        eprintln!("{}: unable to initialize logger: {e}", crate_name!());
    }
}

fn run() -> error::Result<i32> {
    let invocation = match Invocation::from_env() {
        Ok(v) => v,
        Err(e) => {
            setup_logger(&Settings::default());
            return Err(e);
        }
    };

    let mut files = Vec::new();
    if let Some(f) = config::user_config_file() {
        files.push(f);
    }
    files.push(config::project_config_file(&invocation.project_root));
    let settings = match Settings::load(&files) {
        Ok(s) => s,
        Err(e) => {
            setup_logger(&Settings::default());
            return Err(e);
        }
    };
    setup_logger(&settings);
    debug!(
        "{} {} ({} built {})",
        crate_name!(),
        crate_version!(),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP")
    );
    debug!("settings: {:?}", settings);

    let runner = SystemRunner::new(invocation.project_root.clone());
    let launcher = Launcher::new(settings, invocation, Box::new(runner));
    let result = launcher.run();
    debug!("stopped at stage: {}", launcher.stage());
    result
}

fn main() {
    match run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("{e}");
            process::exit(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::init_logger;
    use crate::config::Settings;

    #[test]
    fn test_second_logger_init_is_reported() {
        let _ = init_logger(&Settings::default());
        assert!(init_logger(&Settings::default()).is_err());
    }
}
