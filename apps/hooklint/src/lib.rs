//! hooklint core library.
//!
//! This crate exposes programmatic APIs for validating lifecycle hook scripts,
//! the layered settings files that register them, and where each script
//! ends up installed.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `models`: Event registry, settings layers, and report structs.
//! - `infer`: Event inference from script content.
//! - `inspect`: Static checks on a single script.
//! - `settings`: Loading and validating the three settings tiers.
//! - `locate`: Matching a script against registered hook commands.
//! - `probe`: Running a script once against a sample payload.
//! - `runner`: Subprocess execution with a deadline.
//! - `validate`: Report composition for scripts, settings, and projects.
//! - `output`: Human/JSON printers.
//! - `utils`: Supporting helpers.
pub mod cli;
pub mod config;
pub mod error;
pub mod infer;
pub mod inspect;
pub mod locate;
pub mod models;
pub mod output;
pub mod probe;
pub mod runner;
pub mod settings;
pub mod utils;
pub mod validate;
