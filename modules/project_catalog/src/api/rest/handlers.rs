//! HTTP request handlers - thin layer that delegates to domain service

use super::{
    dto::*,
    error::{map_domain_error, Problem},
    extract::{file_field, ApiJson, ApiPath, ApiQuery},
};
use crate::contract::Principal;
use crate::domain::filter::{ProjectFilter, TagFilter};
use crate::domain::upload::UploadKind;
use crate::domain::Service;
use axum::{extract::Multipart, http::StatusCode, Json};
use std::sync::Arc;

// ===== User Handlers =====

/// Register a new account
pub async fn register_user(
    service: Arc<Service>,
    ApiJson(req): ApiJson<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserDto>), Problem> {
    let user = service
        .register_user(&req.email, &req.username, &req.password, &req.name)
        .await
        .map_err(map_domain_error)?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Exchange credentials for a bearer token
pub async fn obtain_token(
    service: Arc<Service>,
    ApiJson(req): ApiJson<TokenRequest>,
) -> Result<Json<TokenResponse>, Problem> {
    let token = service
        .obtain_token(&req.username, &req.password)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(TokenResponse { token }))
}

pub async fn get_me(service: Arc<Service>, principal: Principal) -> Result<Json<UserDto>, Problem> {
    let user = service
        .current_user(&principal)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(user.into()))
}

pub async fn update_me(
    service: Arc<Service>,
    principal: Principal,
    ApiJson(req): ApiJson<UpdateMeRequest>,
) -> Result<Json<UserDto>, Problem> {
    let user = service
        .update_current_user(
            &principal,
            req.email.as_deref(),
            req.name.as_deref(),
            req.password.as_deref(),
        )
        .await
        .map_err(map_domain_error)?;

    Ok(Json(user.into()))
}

pub async fn delete_user(
    service: Arc<Service>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, Problem> {
    service
        .delete_user(&principal, id)
        .await
        .map_err(map_domain_error)?;

    Ok(StatusCode::NO_CONTENT)
}

// ===== Tag Handlers =====

/// List tags, optionally only those attached to a project
pub async fn list_tags(
    service: Arc<Service>,
    ApiQuery(query): ApiQuery<TagListQuery>,
) -> Result<Json<Vec<TagDto>>, Problem> {
    let filter = TagFilter::from_param(query.assigned_only.as_deref()).map_err(map_domain_error)?;
    let tags = service.list_tags(filter).await.map_err(map_domain_error)?;

    Ok(Json(tags.into_iter().map(Into::into).collect()))
}

pub async fn create_tag(
    service: Arc<Service>,
    principal: Principal,
    ApiJson(req): ApiJson<CreateTagRequest>,
) -> Result<(StatusCode, Json<TagDto>), Problem> {
    let tag = service
        .create_tag(&principal, req.into())
        .await
        .map_err(map_domain_error)?;

    Ok((StatusCode::CREATED, Json(tag.into())))
}

// ===== Application Handlers =====

pub async fn list_applications(service: Arc<Service>) -> Result<Json<Vec<ApplicationDto>>, Problem> {
    let applications = service.list_applications().await.map_err(map_domain_error)?;
    Ok(Json(applications.into_iter().map(Into::into).collect()))
}

pub async fn get_application(
    service: Arc<Service>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ApplicationDto>, Problem> {
    let application = service.get_application(id).await.map_err(map_domain_error)?;
    Ok(Json(application.into()))
}

pub async fn create_application(
    service: Arc<Service>,
    principal: Principal,
    ApiJson(req): ApiJson<ApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationDto>), Problem> {
    let application = service
        .create_application(&principal, req.into())
        .await
        .map_err(map_domain_error)?;

    Ok((StatusCode::CREATED, Json(application.into())))
}

pub async fn replace_application(
    service: Arc<Service>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(req): ApiJson<ApplicationRequest>,
) -> Result<Json<ApplicationDto>, Problem> {
    let application = service
        .update_application(&principal, id, req.into())
        .await
        .map_err(map_domain_error)?;

    Ok(Json(application.into()))
}

pub async fn patch_application(
    service: Arc<Service>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(req): ApiJson<PatchApplicationRequest>,
) -> Result<Json<ApplicationDto>, Problem> {
    let application = service
        .update_application(&principal, id, req.into())
        .await
        .map_err(map_domain_error)?;

    Ok(Json(application.into()))
}

pub async fn delete_application(
    service: Arc<Service>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, Problem> {
    service
        .delete_application(&principal, id)
        .await
        .map_err(map_domain_error)?;

    Ok(StatusCode::NO_CONTENT)
}

// ===== Tool Handlers =====

pub async fn list_tools(service: Arc<Service>) -> Result<Json<Vec<ToolDto>>, Problem> {
    let tools = service.list_tools().await.map_err(map_domain_error)?;
    Ok(Json(tools.into_iter().map(Into::into).collect()))
}

pub async fn get_tool(
    service: Arc<Service>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ToolDto>, Problem> {
    let tool = service.get_tool(id).await.map_err(map_domain_error)?;
    Ok(Json(tool.into()))
}

pub async fn create_tool(
    service: Arc<Service>,
    principal: Principal,
    ApiJson(req): ApiJson<ToolRequest>,
) -> Result<(StatusCode, Json<ToolDto>), Problem> {
    let tool = service
        .create_tool(&principal, req.into())
        .await
        .map_err(map_domain_error)?;

    Ok((StatusCode::CREATED, Json(tool.into())))
}

pub async fn replace_tool(
    service: Arc<Service>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(req): ApiJson<ToolRequest>,
) -> Result<Json<ToolDto>, Problem> {
    let tool = service
        .update_tool(&principal, id, req.into())
        .await
        .map_err(map_domain_error)?;

    Ok(Json(tool.into()))
}

pub async fn patch_tool(
    service: Arc<Service>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(req): ApiJson<PatchToolRequest>,
) -> Result<Json<ToolDto>, Problem> {
    let tool = service
        .update_tool(&principal, id, req.into())
        .await
        .map_err(map_domain_error)?;

    Ok(Json(tool.into()))
}

pub async fn delete_tool(
    service: Arc<Service>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, Problem> {
    service
        .delete_tool(&principal, id)
        .await
        .map_err(map_domain_error)?;

    Ok(StatusCode::NO_CONTENT)
}

// ===== Software Handlers =====

pub async fn list_softwares(service: Arc<Service>) -> Result<Json<Vec<SoftwareDto>>, Problem> {
    let softwares = service.list_softwares().await.map_err(map_domain_error)?;
    Ok(Json(softwares.into_iter().map(Into::into).collect()))
}

/// Software with its application and tool resolved
pub async fn get_software(
    service: Arc<Service>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<SoftwareDetailDto>, Problem> {
    let software = service.get_software(id).await.map_err(map_domain_error)?;
    Ok(Json(software.into()))
}

pub async fn create_software(
    service: Arc<Service>,
    principal: Principal,
    ApiJson(req): ApiJson<SoftwareRequest>,
) -> Result<(StatusCode, Json<SoftwareDto>), Problem> {
    let software = service
        .create_software(&principal, req.into())
        .await
        .map_err(map_domain_error)?;

    Ok((StatusCode::CREATED, Json(software.into())))
}

pub async fn replace_software(
    service: Arc<Service>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(req): ApiJson<SoftwareRequest>,
) -> Result<Json<SoftwareDto>, Problem> {
    let software = service
        .update_software(&principal, id, req.into())
        .await
        .map_err(map_domain_error)?;

    Ok(Json(software.into()))
}

pub async fn patch_software(
    service: Arc<Service>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(req): ApiJson<PatchSoftwareRequest>,
) -> Result<Json<SoftwareDto>, Problem> {
    let software = service
        .update_software(&principal, id, req.into())
        .await
        .map_err(map_domain_error)?;

    Ok(Json(software.into()))
}

pub async fn delete_software(
    service: Arc<Service>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, Problem> {
    service
        .delete_software(&principal, id)
        .await
        .map_err(map_domain_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Upload the default project file of a software (multipart field `default_file`)
pub async fn upload_software_file(
    service: Arc<Service>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    multipart: Multipart,
) -> Result<Json<SoftwareFileDto>, Problem> {
    let file = file_field(multipart, UploadKind::SoftwareDefaultFile.field()).await?;
    let software = service
        .upload_software_file(&principal, id, file)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(SoftwareFileDto {
        id: software.id,
        default_file: software.default_file,
    }))
}

// ===== Project Handlers =====

/// List the caller's projects filtered by `tags` and `applications`
pub async fn list_projects(
    service: Arc<Service>,
    principal: Principal,
    ApiQuery(query): ApiQuery<ProjectListQuery>,
) -> Result<Json<Vec<ProjectDto>>, Problem> {
    let filter = ProjectFilter::from_params(query.tags.as_deref(), query.applications.as_deref())
        .map_err(map_domain_error)?;
    let projects = service
        .list_projects(&principal, &filter)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(projects.into_iter().map(Into::into).collect()))
}

pub async fn get_project(
    service: Arc<Service>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ProjectDetailDto>, Problem> {
    let project = service
        .get_project(&principal, id)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(project.into()))
}

pub async fn create_project(
    service: Arc<Service>,
    principal: Principal,
    ApiJson(req): ApiJson<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectDto>), Problem> {
    let project = service
        .create_project(&principal, req.into())
        .await
        .map_err(map_domain_error)?;

    Ok((StatusCode::CREATED, Json(project.into())))
}

pub async fn replace_project(
    service: Arc<Service>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(req): ApiJson<ReplaceProjectRequest>,
) -> Result<Json<ProjectDto>, Problem> {
    let project = service
        .update_project(&principal, id, req.into())
        .await
        .map_err(map_domain_error)?;

    Ok(Json(project.into()))
}

pub async fn patch_project(
    service: Arc<Service>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    ApiJson(req): ApiJson<PatchProjectRequest>,
) -> Result<Json<ProjectDto>, Problem> {
    let project = service
        .update_project(&principal, id, req.into())
        .await
        .map_err(map_domain_error)?;

    Ok(Json(project.into()))
}

pub async fn delete_project(
    service: Arc<Service>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, Problem> {
    service
        .delete_project(&principal, id)
        .await
        .map_err(map_domain_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Upload a thumbnail image (multipart field `thumbnail`)
pub async fn upload_project_image(
    service: Arc<Service>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    multipart: Multipart,
) -> Result<Json<ProjectThumbnailDto>, Problem> {
    let kind = UploadKind::ProjectThumbnail;
    let file = file_field(multipart, kind.field()).await?;
    let project = service
        .upload_project_file(&principal, id, kind, file)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(ProjectThumbnailDto {
        id: project.id,
        thumbnail: project.thumbnail,
    }))
}

/// Upload a project data file (multipart field `data`)
pub async fn upload_project_data(
    service: Arc<Service>,
    principal: Principal,
    ApiPath(id): ApiPath<i32>,
    multipart: Multipart,
) -> Result<Json<ProjectDataDto>, Problem> {
    let kind = UploadKind::ProjectData;
    let file = file_field(multipart, kind.field()).await?;
    let project = service
        .upload_project_file(&principal, id, kind, file)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(ProjectDataDto {
        id: project.id,
        data: project.data,
    }))
}
