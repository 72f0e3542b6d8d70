//! REST DTOs with serde derives for HTTP API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ===== User DTOs =====

/// User response DTO; never carries the password hash
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: i32,
    #[schema(example = "student@example.com")]
    pub email: String,
    #[schema(example = "student1")]
    pub username: String,
    pub name: String,
    pub date_joined: DateTime<Utc>,
    pub is_staff: bool,
}

/// Registration request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    pub email: String,
    pub username: String,
    /// At least 5 characters
    pub password: String,
    #[serde(default)]
    pub name: String,
}

/// Token request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// Issued bearer token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Profile update request; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateMeRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

// ===== Tag DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TagDto {
    pub id: i32,
    #[schema(example = "geometry")]
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTagRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Tag list query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagListQuery {
    /// `1` restricts the list to tags attached to at least one project
    pub assigned_only: Option<String>,
}

// ===== Application DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApplicationDto {
    pub id: i32,
    #[schema(example = "Cornrow Curves")]
    pub name: String,
    #[schema(example = "https://csdt.org/culture/cornrowcurves")]
    pub link: String,
    pub description: String,
}

/// Create or full-replace request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ApplicationRequest {
    pub name: String,
    pub link: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PatchApplicationRequest {
    pub name: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
}

// ===== Tool DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ToolDto {
    pub id: i32,
    #[schema(example = "Adinkra Grapher")]
    pub name: String,
}

/// Create or full-replace request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ToolRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PatchToolRequest {
    pub name: Option<String>,
}

// ===== Software DTOs =====

/// Software list item
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SoftwareDto {
    pub id: i32,
    pub name: String,
    /// Tool id
    pub tool: Option<i32>,
    /// Media reference of the default project file
    pub default_file: String,
    /// Application id
    pub application: i32,
    pub description: String,
}

/// Software detail with nested application and tool
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SoftwareDetailDto {
    pub id: i32,
    pub name: String,
    pub tool: Option<ToolDto>,
    pub default_file: String,
    pub application: ApplicationDto,
    pub description: String,
}

/// Create or full-replace request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SoftwareRequest {
    pub name: String,
    #[serde(default)]
    pub tool: Option<i32>,
    #[serde(default)]
    pub default_file: String,
    pub application: i32,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PatchSoftwareRequest {
    pub name: Option<String>,
    /// `null` detaches the tool
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub tool: Option<Option<i32>>,
    pub default_file: Option<String>,
    pub application: Option<i32>,
    pub description: Option<String>,
}

/// Result of a software file upload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SoftwareFileDto {
    pub id: i32,
    pub default_file: String,
}

// ===== Project DTOs =====

/// Project list item; tags are ids
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectDto {
    pub id: i32,
    /// Owner user id; `null` once the owner is deleted
    pub owner: Option<i32>,
    #[schema(example = "Cool Project")]
    pub title: String,
    /// Application id
    pub application: i32,
    /// Tool id
    pub tool: Option<i32>,
    pub tags: Vec<i32>,
    pub data: String,
    pub thumbnail: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    /// `modified_at` before each update, oldest first
    pub modified_date_history: Vec<DateTime<Utc>>,
    /// `data` before each update, oldest first
    pub modified_data_history: Vec<String>,
    /// `thumbnail` before each update, oldest first
    pub modified_thumbnail_history: Vec<String>,
}

/// Project detail; tags are nested
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectDetailDto {
    pub id: i32,
    pub owner: Option<i32>,
    pub title: String,
    pub application: i32,
    pub tool: Option<i32>,
    pub tags: Vec<TagDto>,
    pub data: String,
    pub thumbnail: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub modified_date_history: Vec<DateTime<Utc>>,
    pub modified_data_history: Vec<String>,
    pub modified_thumbnail_history: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    pub title: String,
    pub application: i32,
    #[serde(default)]
    pub tool: Option<i32>,
    #[serde(default)]
    pub tags: Vec<i32>,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// PUT body; title and application are required, other absent fields are kept
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReplaceProjectRequest {
    pub title: String,
    pub application: i32,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub tool: Option<Option<i32>>,
    pub tags: Option<Vec<i32>>,
    pub data: Option<String>,
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
}

/// PATCH body; absent fields are kept
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PatchProjectRequest {
    pub title: Option<String>,
    pub application: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub tool: Option<Option<i32>>,
    pub tags: Option<Vec<i32>>,
    pub data: Option<String>,
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
}

/// Project list query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectListQuery {
    /// Comma-separated tag ids
    pub tags: Option<String>,
    /// Comma-separated application ids
    pub applications: Option<String>,
}

/// Result of a thumbnail upload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectThumbnailDto {
    pub id: i32,
    pub thumbnail: String,
}

/// Result of a data file upload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectDataDto {
    pub id: i32,
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_distinguishes_null_from_absent() {
        let absent: PatchProjectRequest = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert_eq!(absent.tool, None);
        assert_eq!(absent.description, None);

        let cleared: PatchProjectRequest =
            serde_json::from_str(r#"{"tool": null, "description": null}"#).unwrap();
        assert_eq!(cleared.tool, Some(None));
        assert_eq!(cleared.description, Some(None));

        let set: PatchProjectRequest = serde_json::from_str(r#"{"tool": 4}"#).unwrap();
        assert_eq!(set.tool, Some(Some(4)));
    }

    #[test]
    fn test_replace_requires_title_and_application() {
        let missing = serde_json::from_str::<ReplaceProjectRequest>(r#"{"title": "x"}"#);
        assert!(missing.is_err());

        let ok: ReplaceProjectRequest =
            serde_json::from_str(r#"{"title": "x", "application": 1}"#).unwrap();
        assert_eq!(ok.tags, None);
    }
}
