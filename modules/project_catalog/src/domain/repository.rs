//! Repository traits for data access
//!
//! These traits define the interface for data access operations.
//! Implementations are in infra/storage/repositories.rs

use super::filter::{ProjectFilter, TagFilter};
use crate::contract::{
    Application, ApplicationChanges, NewApplication, NewProject, NewSoftware, NewTag, NewTool,
    NewUser, Project, ProjectChanges, Software, SoftwareChanges, Tag, Tool, ToolChanges, User,
    UserChanges,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// A write collided with a unique index
///
/// Repositories return this inside `anyhow::Error` so the service can report
/// the offending field instead of an internal error.
#[derive(Debug, thiserror::Error)]
#[error("unique constraint violated: {detail}")]
pub struct UniqueViolation {
    /// Database message; names the index or column
    pub detail: String,
}

impl UniqueViolation {
    /// First of `fields` the database message mentions, else the first one
    pub fn field<'a>(&self, fields: &[&'a str]) -> &'a str {
        fields
            .iter()
            .copied()
            .find(|field| self.detail.contains(field))
            .or_else(|| fields.first().copied())
            .unwrap_or("non_field_errors")
    }
}

/// Repository for user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &NewUser) -> Result<User>;

    async fn find_by_id(&self, id: i32) -> Result<Option<User>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn update(&self, id: i32, changes: &UserChanges) -> Result<Option<User>>;

    /// Delete a user; their projects are kept with no owner
    async fn delete(&self, id: i32) -> Result<bool>;
}

/// Repository for tags
#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn create(&self, tag: &NewTag) -> Result<Tag>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>>;

    /// Tags with the given ids; unknown ids are skipped
    async fn find_many(&self, ids: &[i32]) -> Result<Vec<Tag>>;

    /// Tags ordered by name descending
    async fn list(&self, filter: TagFilter) -> Result<Vec<Tag>>;
}

/// Repository for applications
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn create(&self, application: &NewApplication) -> Result<Application>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Application>>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Application>>;

    async fn find_by_link(&self, link: &str) -> Result<Option<Application>>;

    /// Applications ordered by id descending
    async fn list(&self) -> Result<Vec<Application>>;

    async fn update(&self, id: i32, changes: &ApplicationChanges) -> Result<Option<Application>>;

    async fn delete(&self, id: i32) -> Result<bool>;

    /// Whether any software or project still points at the application
    async fn is_referenced(&self, id: i32) -> Result<bool>;
}

/// Repository for tools
#[async_trait]
pub trait ToolRepository: Send + Sync {
    async fn create(&self, tool: &NewTool) -> Result<Tool>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Tool>>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Tool>>;

    /// Tools ordered by id descending
    async fn list(&self) -> Result<Vec<Tool>>;

    async fn update(&self, id: i32, changes: &ToolChanges) -> Result<Option<Tool>>;

    async fn delete(&self, id: i32) -> Result<bool>;

    /// Whether any software or project still points at the tool
    async fn is_referenced(&self, id: i32) -> Result<bool>;
}

/// Repository for software
#[async_trait]
pub trait SoftwareRepository: Send + Sync {
    async fn create(&self, software: &NewSoftware) -> Result<Software>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Software>>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Software>>;

    /// Software ordered by id descending
    async fn list(&self) -> Result<Vec<Software>>;

    async fn update(&self, id: i32, changes: &SoftwareChanges) -> Result<Option<Software>>;

    async fn delete(&self, id: i32) -> Result<bool>;
}

/// Repository for projects; every query is scoped to an owner
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn create(
        &self,
        owner_id: i32,
        project: &NewProject,
        now: DateTime<Utc>,
    ) -> Result<Project>;

    async fn find_owned(&self, id: i32, owner_id: i32) -> Result<Option<Project>>;

    /// Owner's projects matching `filter`, ordered by id descending, no duplicates
    async fn list_owned(&self, owner_id: i32, filter: &ProjectFilter) -> Result<Vec<Project>>;

    /// Run one update event atomically
    ///
    /// Loads the row, applies [`crate::domain::history::apply_update`] and
    /// persists fields, history arrays and tag links in one transaction.
    /// Returns `None` when the project does not exist for this owner.
    async fn update_owned(
        &self,
        id: i32,
        owner_id: i32,
        changes: ProjectChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Project>>;

    async fn delete_owned(&self, id: i32, owner_id: i32) -> Result<bool>;
}

/// Bundle of repositories the service is built from
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub applications: Arc<dyn ApplicationRepository>,
    pub tools: Arc<dyn ToolRepository>,
    pub softwares: Arc<dyn SoftwareRepository>,
    pub projects: Arc<dyn ProjectRepository>,
}
