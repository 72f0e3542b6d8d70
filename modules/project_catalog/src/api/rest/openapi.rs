//! OpenAPI document of the REST schemas

use super::dto::*;
use super::error::Problem;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Project Catalog API", description = "Tags, applications, tools, software and student projects"),
    components(schemas(
        Problem,
        UserDto,
        RegisterUserRequest,
        TokenRequest,
        TokenResponse,
        UpdateMeRequest,
        TagDto,
        CreateTagRequest,
        ApplicationDto,
        ApplicationRequest,
        PatchApplicationRequest,
        ToolDto,
        ToolRequest,
        PatchToolRequest,
        SoftwareDto,
        SoftwareDetailDto,
        SoftwareRequest,
        PatchSoftwareRequest,
        SoftwareFileDto,
        ProjectDto,
        ProjectDetailDto,
        CreateProjectRequest,
        ReplaceProjectRequest,
        PatchProjectRequest,
        ProjectThumbnailDto,
        ProjectDataDto,
    )),
    tags(
        (name = "users", description = "Accounts and tokens"),
        (name = "catalog", description = "Tags, applications, tools and software"),
        (name = "projects", description = "Student projects owned by the caller"),
    ),
)]
pub struct ApiDoc;
