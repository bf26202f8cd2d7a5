use std::path::PathBuf;
use thiserror::Error;

use super::template::TemplateError;
use crate::archive::ArchiveError;
use crate::humanize::ParseError;

/// Raised while building a job from its project settings.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("invalid configuration for job '{job}': {source}")]
    InvalidSize {
        job: String,
        #[source]
        source: ParseError,
    },

    #[error("invalid configuration for job '{job}': {source}")]
    InvalidTemplate {
        job: String,
        #[source]
        source: TemplateError,
    },
}

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("cannot stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum EvictionError {
    #[error("invalid rotated-file pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("eviction task aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Failure of one step of the rotate sequence.
#[derive(Debug, Error)]
pub enum RotateError {
    #[error("failed to read source {path}: {source}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("failed to write rotated copy {path}: {source}")]
    WriteDestination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to truncate {path}: {source}")]
    Truncate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read pid file {path}: {source}")]
    PidFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("pid file {path} does not hold a process id: '{value}'")]
    InvalidPid { path: PathBuf, value: String },

    #[cfg(unix)]
    #[error("failed to signal process {pid}: {source}")]
    Signal {
        pid: i32,
        #[source]
        source: nix::Error,
    },

    #[cfg(not(unix))]
    #[error("cannot signal process {pid} on this platform")]
    SignalUnsupported { pid: i32 },

    #[error("archive failed: {0}")]
    Archive(#[from] ArchiveError),

    #[error("eviction failed: {0}")]
    Eviction(#[from] EvictionError),
}
