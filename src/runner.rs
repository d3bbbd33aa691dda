use log::debug;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

/// Completion status of a child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    code: Option<i32>,
}

impl Status {
    #[cfg(test)]
    pub fn from_code(code: i32) -> Status {
        Status { code: Some(code) }
    }

    // Killed by a signal, no numeric status.
    #[cfg(test)]
    pub fn without_code() -> Status {
        Status { code: None }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn code(&self) -> Option<i32> {
        self.code
    }

    /// Code the launcher terminates with: the child's own, or 1 when none is available.
    pub fn exit_code(&self) -> i32 {
        self.code.unwrap_or(1)
    }
}

impl From<ExitStatus> for Status {
    fn from(status: ExitStatus) -> Status {
        Status {
            code: status.code(),
        }
    }
}

pub trait ProcessRunner {
    /// Run with stdin, stdout and stderr inherited and wait for completion.
    fn run_inherited(&self, program: &OsStr, args: &[OsString]) -> io::Result<Status>;
    /// Run with stdout captured. Any failure (launch error or non-zero exit) yields `None`.
    fn run_captured(&self, program: &OsStr, args: &[OsString]) -> Option<String>;
}

/// Spawns real processes from the project root.
#[derive(Debug)]
pub struct SystemRunner {
    workdir: PathBuf,
}

impl SystemRunner {
    pub fn new(workdir: PathBuf) -> SystemRunner {
        SystemRunner { workdir }
    }
}

impl ProcessRunner for SystemRunner {
    fn run_inherited(&self, program: &OsStr, args: &[OsString]) -> io::Result<Status> {
        debug!("run_inherited {:?} {:?}", program, args);
        Command::new(program)
            .args(args)
            .current_dir(&self.workdir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map(Status::from)
    }

    fn run_captured(&self, program: &OsStr, args: &[OsString]) -> Option<String> {
        debug!("run_captured {:?} {:?}", program, args);
        match Command::new(program)
            .args(args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
        {
            Ok(out) if out.status.success() => {
                Some(String::from_utf8_lossy(&out.stdout).into_owned())
            }
            Ok(out) => {
                debug!(" {:?} exited with {}", program, out.status);
                None
            }
            Err(e) => {
                debug!(" {:?} could not be launched: {e}", program);
                None
            }
        }
    }
}
