//! Ballast - a build pipeline for modern and legacy JavaScript bundles
//!
//! This crate provides the core library functionality for Ballast,
//! including the capability catalog, the source-transformation stages,
//! and the bundle assembly driver.

pub mod core;
pub mod driver;
pub mod ops;
pub mod stage;
pub mod util;

pub use self::core::{
    catalog::{CapabilityCatalog, ShimSymbols},
    config::BuildConfig,
    externals::ExternalModules,
    manifest::Manifest,
    project::Project,
    target::{BuildTarget, OutputFormat, OutputSpec},
};

pub use stage::{Stage, StageCapabilities, StagePipeline};
