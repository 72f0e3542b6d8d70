//! Contract layer - transport-agnostic models and errors
//!
//! NO serde derives on models - these are pure domain types. The REST layer
//! owns its DTOs and converts at the edge.

pub mod error;
pub mod model;

pub use error::CatalogError;
pub use model::{
    Actor, Application, ApplicationChanges, NewApplication, NewProject, NewSoftware, NewTag,
    NewTool, NewUser, Principal, Project, ProjectChanges, ProjectDetail, Software, SoftwareChanges,
    SoftwareDetail, Tag, Tool, ToolChanges, User, UserChanges,
};
