//! Contract models for the project catalog
//!
//! These models are transport-agnostic and shared by the domain service,
//! the storage layer and the REST mappers.

use chrono::{DateTime, Utc};

// ===== Users =====

/// Registered account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    /// Unique, domain part lower-cased
    pub email: String,
    /// Unique login name
    pub username: String,
    pub name: String,
    /// `pbkdf2_sha256$<iterations>$<salt>$<hash>`
    pub password_hash: String,
    pub date_joined: DateTime<Utc>,
    pub is_active: bool,
    /// Gates catalog-management writes
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// User to be inserted; the password is already hashed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub name: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Self-service profile changes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password_hash: Option<String>,
}

// ===== Catalog =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTag {
    pub name: String,
    pub description: String,
}

/// Hosting application a project or software runs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    pub id: i32,
    pub name: String,
    pub link: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub name: String,
    pub link: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationChanges {
    pub name: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
}

/// Design tool (e.g. "Cornrow Curves")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTool {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolChanges {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Software {
    pub id: i32,
    pub name: String,
    pub tool_id: Option<i32>,
    /// Reference to the stored default file, empty when none was uploaded
    pub default_file: String,
    pub application_id: i32,
    pub description: String,
}

/// Software with its references resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftwareDetail {
    pub software: Software,
    pub application: Application,
    pub tool: Option<Tool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSoftware {
    pub name: String,
    pub tool_id: Option<i32>,
    pub default_file: String,
    pub application_id: i32,
    pub description: String,
}

/// `tool_id: Some(None)` clears the tool reference
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoftwareChanges {
    pub name: Option<String>,
    pub tool_id: Option<Option<i32>>,
    pub default_file: Option<String>,
    pub application_id: Option<i32>,
    pub description: Option<String>,
}

// ===== Projects =====

/// Student project with its append-only modification history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: i32,
    /// `None` once the owning user has been deleted
    pub owner_id: Option<i32>,
    pub title: String,
    pub application_id: i32,
    pub tool_id: Option<i32>,
    /// Reference to the stored project data
    pub data: String,
    /// Reference to the stored thumbnail image
    pub thumbnail: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    /// Ascending tag ids
    pub tag_ids: Vec<i32>,
    pub modified_date_history: Vec<DateTime<Utc>>,
    pub modified_data_history: Vec<String>,
    pub modified_thumbnail_history: Vec<String>,
}

/// Project to be created; the owner is always the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub title: String,
    pub application_id: i32,
    pub tool_id: Option<i32>,
    pub data: String,
    pub thumbnail: String,
    pub description: Option<String>,
    pub tag_ids: Vec<i32>,
}

/// Project with its tags resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDetail {
    pub project: Project,
    pub tags: Vec<Tag>,
}

/// Requested field changes for one update event
///
/// Double options distinguish "leave as is" (`None`) from "clear"
/// (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectChanges {
    pub title: Option<String>,
    pub application_id: Option<i32>,
    pub tool_id: Option<Option<i32>>,
    pub tag_ids: Option<Vec<i32>>,
    pub data: Option<String>,
    pub thumbnail: Option<String>,
    pub description: Option<Option<String>>,
}

// ===== Callers =====

/// Identity of the caller of a service operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Principal {
    /// No credentials were presented
    #[default]
    Anonymous,
    /// A valid token for an active user
    Authenticated(Actor),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i32,
    pub is_staff: bool,
}

impl Principal {
    pub const fn user(user_id: i32) -> Self {
        Self::Authenticated(Actor {
            user_id,
            is_staff: false,
        })
    }

    pub const fn staff(user_id: i32) -> Self {
        Self::Authenticated(Actor {
            user_id,
            is_staff: true,
        })
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self::Authenticated(Actor {
            user_id: user.id,
            is_staff: user.is_staff,
        })
    }
}
