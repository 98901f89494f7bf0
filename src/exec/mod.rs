// src/exec/mod.rs

//! Process execution layer.
//!
//! This module turns jobs into engine processes and runs them with
//! `tokio::process::Command`.
//!
//! - [`command`] holds `CommandBuilder`, which resolves program, argv,
//!   working directory and environment for a job.
//! - [`env`] implements the environment overrides the engine relies on.
//! - [`process`] runs one command to completion and classifies the result.
//! - [`backend`] provides the `ExecutorBackend` trait and the concrete
//!   `RealExecutorBackend` the registry uses in production, and which tests
//!   can replace with a fake implementation.

pub mod backend;
pub mod command;
pub mod env;
pub mod process;

pub use backend::{ExecutorBackend, JobOutcome, RealExecutorBackend};
pub use command::{CommandBuilder, EngineCommand};
pub use process::run_command;
