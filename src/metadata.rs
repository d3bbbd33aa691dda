//! Version, commit and build date injected into the target binary.
use crate::runner::ProcessRunner;

use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;
use regex::Regex;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::sync::LazyLock;

pub const DEFAULT_VERSION: &str = "dev";

static FRACTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.\d{3}Z$").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub struct BuildMetadata {
    pub version: String,
    pub commit: String,
    pub date: String,
}

impl BuildMetadata {
    /// Query git from the project root. Never fails: unavailable values fall back to
    /// `"dev"` for the version and an empty commit.
    pub fn resolve(runner: &dyn ProcessRunner, git: &OsStr) -> BuildMetadata {
        let query = |args: &[&str]| {
            let args: Vec<OsString> = args.iter().map(OsString::from).collect();
            runner
                .run_captured(git, &args)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let version = query(&["describe", "--tags", "--always", "--dirty"]).unwrap_or_else(|| {
            debug!("git describe unavailable, using {DEFAULT_VERSION}");
            DEFAULT_VERSION.to_string()
        });
        let commit = query(&["rev-parse", "--short=12", "HEAD"]).unwrap_or_default();
        BuildMetadata {
            version,
            commit,
            date: build_timestamp(Utc::now()),
        }
    }

    /// Linker flags setting `version`, `commit` and `date` in `module`.
    pub fn ldflags(&self, module: &str) -> String {
        [
            format!("-X {module}.version={}", self.version),
            format!("-X {module}.commit={}", self.commit),
            format!("-X {module}.date={}", self.date),
        ]
        .join(" ")
    }
}

// Same rendering as the `version` command of the built binary.
impl fmt::Display for BuildMetadata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let commit = self.commit.trim();
        let date = self.date.trim();
        match (commit.is_empty(), date.is_empty()) {
            (true, true) => write!(f, "{}", self.version),
            (true, false) => write!(f, "{} ({date})", self.version),
            (false, true) => write!(f, "{} ({commit})", self.version),
            (false, false) => write!(f, "{} ({commit} {date})", self.version),
        }
    }
}

/// RFC 3339 in UTC with the millisecond fraction removed: `2026-10-19T08:30:05Z`.
pub fn build_timestamp(now: DateTime<Utc>) -> String {
    let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    FRACTION.replace(&stamp, "Z").into_owned()
}

#[cfg(test)]
mod tests {
    use super::{BuildMetadata, DEFAULT_VERSION, build_timestamp};
    use crate::runner::fake::FakeRunner;
    use chrono::{TimeZone, Utc};
    use regex::Regex;
    use std::ffi::OsStr;

    fn meta(version: &str, commit: &str, date: &str) -> BuildMetadata {
        BuildMetadata {
            version: version.to_string(),
            commit: commit.to_string(),
            date: date.to_string(),
        }
    }

    #[test]
    fn test_build_timestamp_strips_fraction() {
        let now = Utc
            .with_ymd_and_hms(2026, 10, 19, 8, 30, 5)
            .unwrap()
            .checked_add_signed(chrono::Duration::milliseconds(123))
            .unwrap();
        assert_eq!(build_timestamp(now), "2026-10-19T08:30:05Z");
    }

    #[test]
    fn test_build_timestamp_now() {
        let stamp = build_timestamp(Utc::now());
        let re = Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z$").unwrap();
        assert!(re.is_match(&stamp), "{stamp}");
        assert!(!stamp.contains('.'));
    }

    #[test]
    fn test_resolve_without_git() {
        let runner = FakeRunner::new();
        let m = BuildMetadata::resolve(&runner, OsStr::new("git"));
        assert_eq!(m.version, DEFAULT_VERSION);
        assert_eq!(m.commit, "");
        assert!(m.date.ends_with('Z'));
        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].args, vec!["describe", "--tags", "--always", "--dirty"]);
        assert_eq!(calls[1].args, vec!["rev-parse", "--short=12", "HEAD"]);
        assert!(calls.iter().all(|c| !c.inherited));
    }

    #[test]
    fn test_resolve_trims_output() {
        let runner = FakeRunner::new()
            .capture("git", "describe", "v0.4.1-3-gabc1234-dirty\n")
            .capture("git", "rev-parse", "  abc1234def56\n");
        let m = BuildMetadata::resolve(&runner, OsStr::new("git"));
        assert_eq!(m.version, "v0.4.1-3-gabc1234-dirty");
        assert_eq!(m.commit, "abc1234def56");
    }

    #[test]
    fn test_resolve_blank_describe_is_dev() {
        let runner = FakeRunner::new().capture("git", "describe", " \n");
        let m = BuildMetadata::resolve(&runner, OsStr::new("git"));
        assert_eq!(m.version, "dev");
    }

    #[test]
    fn test_ldflags() {
        let m = meta("v1.0.0", "abc", "2026-10-19T08:30:05Z");
        assert_eq!(
            m.ldflags("example.com/x/internal/cmd"),
            "-X example.com/x/internal/cmd.version=v1.0.0 \
             -X example.com/x/internal/cmd.commit=abc \
             -X example.com/x/internal/cmd.date=2026-10-19T08:30:05Z"
        );
        assert_eq!(
            meta("dev", "", "d").ldflags("m"),
            "-X m.version=dev -X m.commit= -X m.date=d"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(meta("dev", "", "").to_string(), "dev");
        assert_eq!(meta("dev", "", "D").to_string(), "dev (D)");
        assert_eq!(meta("v1", "abc", "").to_string(), "v1 (abc)");
        assert_eq!(meta("v1", "abc", "D").to_string(), "v1 (abc D)");
    }
}
