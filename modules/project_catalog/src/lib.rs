//! Project Catalog Module
//!
//! Catalog of educational software (tags, applications, tools, software) and
//! the student projects built with it. Projects keep an append-only history
//! of their previous data files, thumbnails and modification times.

// Public exports
pub mod contract;
pub use contract::{
    Application, CatalogError, Principal, Project, ProjectChanges, ProjectDetail, Software, SoftwareDetail,
    Tag, Tool, User,
};

pub mod module;
pub use module::CatalogModule;

pub use config::Config;

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
