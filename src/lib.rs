//! cartoon-camera library crate.
//!
//! Exposes the pipeline, session controller and I/O collaborators so they
//! can be driven from integration tests with synthetic inputs.

pub mod camera;
pub mod cartoon;
pub mod cli;
pub mod config;
pub mod display;
pub mod legend;
pub mod save;
pub mod session;
pub mod source;
