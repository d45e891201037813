//! solovideos - pull video files out of a directory tree
//!
//! This library walks a source directory, selects files by extension, and
//! copies or moves them into a destination tree that mirrors their original
//! relative paths. Runs can be simulated first; every planned or executed
//! action is recorded in a run summary that can be written to a log file.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod extensions;
pub mod output;
pub mod paths;
pub mod relocator;
pub mod report;
pub mod request;
pub mod traversal;

pub use config::{Config, ConfigError};
pub use engine::{RunHandle, RunSummary};
pub use error::{FileError, RelocateError, TraversalError};
pub use extensions::{ExtensionSet, VideoFormat};
pub use request::{Action, MatchRecord, Mode, RelocationRequest};

pub use cli::{Command, run_cli};
