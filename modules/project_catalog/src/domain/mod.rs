//! Domain layer - business logic and services

pub mod access;
pub mod credentials;
pub mod filter;
pub mod history;
pub mod repository;
pub mod service;
pub mod upload;
pub mod validation;

pub use filter::{ProjectFilter, TagFilter};
pub use repository::{
    ApplicationRepository, ProjectRepository, Repositories, SoftwareRepository, TagRepository,
    ToolRepository, UserRepository,
};
pub use service::Service;
pub use upload::{MediaStorage, UploadKind, UploadedFile};
