// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running one executable, using
//! `tokio::process::Command`, and getting its output into the event sink.
//!
//! - [`runner`] handles one spawn-to-exit attempt of a child process.
//! - [`drain`] owns the per-stream drain tasks that read and log child output.

pub mod drain;
pub mod runner;

pub use drain::DrainHandle;
pub use runner::{ProcessInstance, process_name, run};
