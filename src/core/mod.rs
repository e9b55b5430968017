//! Core data model: manifests, project layout, catalogs, and build targets.

pub mod catalog;
pub mod config;
pub mod externals;
pub mod manifest;
pub mod project;
pub mod target;
