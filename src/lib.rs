//! A tiny interactive shell focused on job control.
//!
//! This crate launches external programs as child processes, tracks which are
//! running in the foreground versus background, and reconciles asynchronous
//! child termination (SIGCHLD) with a bounded table of live jobs. Line
//! reading, tokenizing, and the couple of builtins are thin glue around that
//! core.
//!
//! The main entry points are [`JobControl`], which forks and registers jobs
//! and blocks on foreground ones, and [`Reaper`], which watches SIGCHLD from
//! a dedicated thread and drains every terminated child back out of the
//! table. The public modules [`notice`] and [`table`] expose the types a
//! collaborator needs to render job events or inspect tracked state.

pub mod builtin;
pub mod env;
pub mod jobs;
pub mod lexer;
pub mod notice;
pub mod reaper;
pub mod table;

pub use jobs::{JobControl, JobHandle, ParsedCommand, SpawnError};
pub use notice::{ConsoleSink, Notice, NoticeSink, RecordingSink};
pub use reaper::Reaper;
pub use table::{Job, JobId, ProcessTable, TableFull};
