//! Route registration
//!
//! Every route sits under `/api/v1`. The service travels as an `Extension`,
//! which is also where the [`Principal`] extractor finds it.

use super::{dto::*, error::Problem, extract::ApiJson, extract::ApiPath, extract::ApiQuery};
use super::{handlers, openapi::ApiDoc};
use crate::contract::Principal;
use crate::domain::Service;
use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        DefaultBodyLimit,
    },
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

/// Room for multipart framing around the largest accepted file
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Register all REST routes
pub fn register_routes(router: Router, service: Arc<Service>, max_upload_size: usize) -> Router {
    let api = Router::new()
        // User endpoints
        .route("/users", post(register_user_handler))
        .route("/users/token", post(obtain_token_handler))
        .route("/users/me", get(get_me_handler).patch(update_me_handler))
        .route("/users/{id}", axum::routing::delete(delete_user_handler))
        // Tag endpoints
        .route("/tags", get(list_tags_handler).post(create_tag_handler))
        // Application endpoints
        .route(
            "/applications",
            get(list_applications_handler).post(create_application_handler),
        )
        .route(
            "/applications/{id}",
            get(get_application_handler)
                .put(replace_application_handler)
                .patch(patch_application_handler)
                .delete(delete_application_handler),
        )
        // Tool endpoints
        .route("/tools", get(list_tools_handler).post(create_tool_handler))
        .route(
            "/tools/{id}",
            get(get_tool_handler)
                .put(replace_tool_handler)
                .patch(patch_tool_handler)
                .delete(delete_tool_handler),
        )
        // Software endpoints
        .route(
            "/softwares",
            get(list_softwares_handler).post(create_software_handler),
        )
        .route(
            "/softwares/{id}",
            get(get_software_handler)
                .put(replace_software_handler)
                .patch(patch_software_handler)
                .delete(delete_software_handler),
        )
        .route("/softwares/{id}/upload-data", post(upload_software_file_handler))
        // Project endpoints
        .route(
            "/projects",
            get(list_projects_handler).post(create_project_handler),
        )
        .route(
            "/projects/{id}",
            get(get_project_handler)
                .put(replace_project_handler)
                .patch(patch_project_handler)
                .delete(delete_project_handler),
        )
        .route("/projects/{id}/upload-image", post(upload_project_image_handler))
        .route("/projects/{id}/upload-data", post(upload_project_data_handler))
        // OpenAPI document
        .route("/openapi.json", get(openapi_handler))
        .layer(DefaultBodyLimit::max(max_upload_size.saturating_add(MULTIPART_OVERHEAD)))
        // Add service as extension for handlers
        .layer(Extension(service));

    router.nest("/api/v1", api)
}

// ===== Handler wrappers that extract service from Extension =====

async fn register_user_handler(
    Extension(service): Extension<Arc<Service>>,
    json: ApiJson<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserDto>), Problem> {
    handlers::register_user(service, json).await
}

async fn obtain_token_handler(
    Extension(service): Extension<Arc<Service>>,
    json: ApiJson<TokenRequest>,
) -> Result<Json<TokenResponse>, Problem> {
    handlers::obtain_token(service, json).await
}

async fn get_me_handler(
    Extension(service): Extension<Arc<Service>>,
    principal: Principal,
) -> Result<Json<UserDto>, Problem> {
    handlers::get_me(service, principal).await
}

async fn update_me_handler(
    Extension(service): Extension<Arc<Service>>,
    principal: Principal,
    json: ApiJson<UpdateMeRequest>,
) -> Result<Json<UserDto>, Problem> {
    handlers::update_me(service, principal, json).await
}

async fn delete_user_handler(
    Extension(service): Extension<Arc<Service>>,
    principal: Principal,
    path: ApiPath<i32>,
) -> Result<StatusCode, Problem> {
    handlers::delete_user(service, principal, path).await
}

async fn list_tags_handler(
    Extension(service): Extension<Arc<Service>>,
    _principal: Principal,
    query: ApiQuery<TagListQuery>,
) -> Result<Json<Vec<TagDto>>, Problem> {
    handlers::list_tags(service, query).await
}

async fn create_tag_handler(
    Extension(service): Extension<Arc<Service>>,
    principal: Principal,
    json: ApiJson<CreateTagRequest>,
) -> Result<(StatusCode, Json<TagDto>), Problem> {
    handlers::create_tag(service, principal, json).await
}

async fn list_applications_handler(
    Extension(service): Extension<Arc<Service>>,
    _principal: Principal,
) -> Result<Json<Vec<ApplicationDto>>, Problem> {
    handlers::list_applications(service).await
}

async fn get_application_handler(
    Extension(service): Extension<Arc<Service>>,
    _principal: Principal,
    path: ApiPath<i32>,
) -> Result<Json<ApplicationDto>, Problem> {
    handlers::get_application(service, path).await
}

async fn create_application_handler(
    Extension(service): Extension<Arc<Service>>,
    principal: Principal,
    json: ApiJson<ApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationDto>), Problem> {
    handlers::create_application(service, principal, json).await
}

async fn replace_application_handler(
    Extension(service): Extension<Arc<Service>>,
    principal: Principal,
    path: ApiPath<i32>,
    json: ApiJson<ApplicationRequest>,
) -> Result<Json<ApplicationDto>, Problem> {
    handlers::replace_application(service, principal, path, json).await
}

async fn patch_application_handler(
    Extension(service): Extension<Arc<Service>>,
    principal: Principal,
    path: ApiPath<i32>,
    json: ApiJson<PatchApplicationRequest>,
) -> Result<Json<ApplicationDto>, Problem> {
    handlers::patch_application(service, principal, path, json).await
}

async fn delete_application_handler(
    Extension(service): Extension<Arc<Service>>,
    principal: Principal,
    path: ApiPath<i32>,
) -> Result<StatusCode, Problem> {
    handlers::delete_application(service, principal, path).await
}

async fn list_tools_handler(
    Extension(service): Extension<Arc<Service>>,
    _principal: Principal,
) -> Result<Json<Vec<ToolDto>>, Problem> {
    handlers::list_tools(service).await
}

async fn get_tool_handler(
    Extension(service): Extension<Arc<Service>>,
    _principal: Principal,
    path: ApiPath<i32>,
) -> Result<Json<ToolDto>, Problem> {
    handlers::get_tool(service, path).await
}

async fn create_tool_handler(
    Extension(service): Extension<Arc<Service>>,
    principal: Principal,
    json: ApiJson<ToolRequest>,
) -> Result<(StatusCode, Json<ToolDto>), Problem> {
    handlers::create_tool(service, principal, json).await
}

async fn replace_tool_handler(
    Extension(service): Extension<Arc<Service>>,
    principal: Principal,
    path: ApiPath<i32>,
    json: ApiJson<ToolRequest>,
) -> Result<Json<ToolDto>, Problem> {
    handlers::replace_tool(service, principal, path, json).await
}

async fn patch_tool_handler(
    Extension(service): Extension<Arc<Service>>,
    principal: Principal,
    path: ApiPath<i32>,
    json: ApiJson<PatchToolRequest>,
) -> Result<Json<ToolDto>, Problem> {
    handlers::patch_tool(service, principal, path, json).await
}

async fn delete_tool_handler(
    Extension(service): Extension<Arc<Service>>,
    principal: Principal,
    path: ApiPath<i32>,
) -> Result<StatusCode, Problem> {
    handlers::delete_tool(service, principal, path).await
}

async fn list_softwares_handler(
    Extension(service): Extension<Arc<Service>>,
    _principal: Principal,
) -> Result<Json<Vec<SoftwareDto>>, Problem> {
    handlers::list_softwares(service).await
}

async fn get_software_handler(
    Extension(service): Extension<Arc<Service>>,
    _principal: Principal,
    path: ApiPath<i32>,
) -> Result<Json<SoftwareDetailDto>, Problem> {
    handlers::get_software(service, path).await
}

async fn create_software_handler(
    Extension(service): Extension<Arc<Service>>,
    principal: Principal,
    json: ApiJson<SoftwareRequest>,
) -> Result<(StatusCode, Json<SoftwareDto>), Problem> {
    handlers::create_software(service, principal, json).await
}

async fn replace_software_handler(
    Extension(service): Extension<Arc<Service>>,
    principal: Principal,
    path: ApiPath<i32>,
    json: ApiJson<SoftwareRequest>,
) -> Result<Json<SoftwareDto>, Problem> {
    handlers::replace_software(service, principal, path, json).await
}

async fn patch_software_handler(
    Extension(service): Extension<Arc<Service>>,
    principal: Principal,
    path: ApiPath<i32>,
    json: ApiJson<PatchSoftwareRequest>,
) -> Result<Json<SoftwareDto>, Problem> {
    handlers::patch_software(service, principal, path, json).await
}

async fn delete_software_handler(
    Extension(service): Extension<Arc<Service>>,
    principal: Principal,
    path: ApiPath<i32>,
) -> Result<StatusCode, Problem> {
    handlers::delete_software(service, principal, path).await
}

async fn upload_software_file_handler(
    Extension(service): Extension<Arc<Service>>,
    principal: Principal,
    path: ApiPath<i32>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SoftwareFileDto>, Problem> {
    handlers::upload_software_file(service, principal, path, multipart?).await
}

async fn list_projects_handler(
    Extension(service): Extension<Arc<Service>>,
    principal: Principal,
    query: ApiQuery<ProjectListQuery>,
) -> Result<Json<Vec<ProjectDto>>, Problem> {
    handlers::list_projects(service, principal, query).await
}

async fn get_project_handler(
    Extension(service): Extension<Arc<Service>>,
    principal: Principal,
    path: ApiPath<i32>,
) -> Result<Json<ProjectDetailDto>, Problem> {
    handlers::get_project(service, principal, path).await
}

async fn create_project_handler(
    Extension(service): Extension<Arc<Service>>,
    principal: Principal,
    json: ApiJson<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectDto>), Problem> {
    handlers::create_project(service, principal, json).await
}

async fn replace_project_handler(
    Extension(service): Extension<Arc<Service>>,
    principal: Principal,
    path: ApiPath<i32>,
    json: ApiJson<ReplaceProjectRequest>,
) -> Result<Json<ProjectDto>, Problem> {
    handlers::replace_project(service, principal, path, json).await
}

async fn patch_project_handler(
    Extension(service): Extension<Arc<Service>>,
    principal: Principal,
    path: ApiPath<i32>,
    json: ApiJson<PatchProjectRequest>,
) -> Result<Json<ProjectDto>, Problem> {
    handlers::patch_project(service, principal, path, json).await
}

async fn delete_project_handler(
    Extension(service): Extension<Arc<Service>>,
    principal: Principal,
    path: ApiPath<i32>,
) -> Result<StatusCode, Problem> {
    handlers::delete_project(service, principal, path).await
}

async fn upload_project_image_handler(
    Extension(service): Extension<Arc<Service>>,
    principal: Principal,
    path: ApiPath<i32>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ProjectThumbnailDto>, Problem> {
    handlers::upload_project_image(service, principal, path, multipart?).await
}

async fn upload_project_data_handler(
    Extension(service): Extension<Arc<Service>>,
    principal: Principal,
    path: ApiPath<i32>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ProjectDataDto>, Problem> {
    handlers::upload_project_data(service, principal, path, multipart?).await
}

async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
