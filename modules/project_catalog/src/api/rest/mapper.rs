//! Mapper implementations for converting between DTOs and contract models
//!
//! This module contains all From/Into implementations for bidirectional
//! conversion between REST DTOs and transport-agnostic contract models.

use super::dto::*;
use crate::contract;

// ===== User conversions =====

impl From<contract::User> for UserDto {
    fn from(user: contract::User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            name: user.name,
            date_joined: user.date_joined,
            is_staff: user.is_staff,
        }
    }
}

// ===== Catalog conversions =====

impl From<contract::Tag> for TagDto {
    fn from(tag: contract::Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            description: tag.description,
        }
    }
}

impl From<CreateTagRequest> for contract::NewTag {
    fn from(req: CreateTagRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
        }
    }
}

impl From<contract::Application> for ApplicationDto {
    fn from(application: contract::Application) -> Self {
        Self {
            id: application.id,
            name: application.name,
            link: application.link,
            description: application.description,
        }
    }
}

impl From<ApplicationRequest> for contract::NewApplication {
    fn from(req: ApplicationRequest) -> Self {
        Self {
            name: req.name,
            link: req.link,
            description: req.description,
        }
    }
}

impl From<ApplicationRequest> for contract::ApplicationChanges {
    fn from(req: ApplicationRequest) -> Self {
        Self {
            name: Some(req.name),
            link: Some(req.link),
            description: Some(req.description),
        }
    }
}

impl From<PatchApplicationRequest> for contract::ApplicationChanges {
    fn from(req: PatchApplicationRequest) -> Self {
        Self {
            name: req.name,
            link: req.link,
            description: req.description,
        }
    }
}

impl From<contract::Tool> for ToolDto {
    fn from(tool: contract::Tool) -> Self {
        Self {
            id: tool.id,
            name: tool.name,
        }
    }
}

impl From<ToolRequest> for contract::NewTool {
    fn from(req: ToolRequest) -> Self {
        Self { name: req.name }
    }
}

impl From<ToolRequest> for contract::ToolChanges {
    fn from(req: ToolRequest) -> Self {
        Self {
            name: Some(req.name),
        }
    }
}

impl From<PatchToolRequest> for contract::ToolChanges {
    fn from(req: PatchToolRequest) -> Self {
        Self { name: req.name }
    }
}

// ===== Software conversions =====

impl From<contract::Software> for SoftwareDto {
    fn from(software: contract::Software) -> Self {
        Self {
            id: software.id,
            name: software.name,
            tool: software.tool_id,
            default_file: software.default_file,
            application: software.application_id,
            description: software.description,
        }
    }
}

impl From<contract::SoftwareDetail> for SoftwareDetailDto {
    fn from(detail: contract::SoftwareDetail) -> Self {
        Self {
            id: detail.software.id,
            name: detail.software.name,
            tool: detail.tool.map(Into::into),
            default_file: detail.software.default_file,
            application: detail.application.into(),
            description: detail.software.description,
        }
    }
}

impl From<SoftwareRequest> for contract::NewSoftware {
    fn from(req: SoftwareRequest) -> Self {
        Self {
            name: req.name,
            tool_id: req.tool,
            default_file: req.default_file,
            application_id: req.application,
            description: req.description,
        }
    }
}

impl From<SoftwareRequest> for contract::SoftwareChanges {
    fn from(req: SoftwareRequest) -> Self {
        Self {
            name: Some(req.name),
            tool_id: Some(req.tool),
            default_file: Some(req.default_file),
            application_id: Some(req.application),
            description: Some(req.description),
        }
    }
}

impl From<PatchSoftwareRequest> for contract::SoftwareChanges {
    fn from(req: PatchSoftwareRequest) -> Self {
        Self {
            name: req.name,
            tool_id: req.tool,
            default_file: req.default_file,
            application_id: req.application,
            description: req.description,
        }
    }
}

// ===== Project conversions =====

impl From<contract::Project> for ProjectDto {
    fn from(project: contract::Project) -> Self {
        Self {
            id: project.id,
            owner: project.owner_id,
            title: project.title,
            application: project.application_id,
            tool: project.tool_id,
            tags: project.tag_ids,
            data: project.data,
            thumbnail: project.thumbnail,
            description: project.description,
            created_at: project.created_at,
            modified_at: project.modified_at,
            modified_date_history: project.modified_date_history,
            modified_data_history: project.modified_data_history,
            modified_thumbnail_history: project.modified_thumbnail_history,
        }
    }
}

impl From<contract::ProjectDetail> for ProjectDetailDto {
    fn from(detail: contract::ProjectDetail) -> Self {
        let project = detail.project;
        Self {
            id: project.id,
            owner: project.owner_id,
            title: project.title,
            application: project.application_id,
            tool: project.tool_id,
            tags: detail.tags.into_iter().map(Into::into).collect(),
            data: project.data,
            thumbnail: project.thumbnail,
            description: project.description,
            created_at: project.created_at,
            modified_at: project.modified_at,
            modified_date_history: project.modified_date_history,
            modified_data_history: project.modified_data_history,
            modified_thumbnail_history: project.modified_thumbnail_history,
        }
    }
}

impl From<CreateProjectRequest> for contract::NewProject {
    fn from(req: CreateProjectRequest) -> Self {
        Self {
            title: req.title,
            application_id: req.application,
            tool_id: req.tool,
            data: req.data,
            thumbnail: req.thumbnail,
            description: req.description,
            tag_ids: req.tags,
        }
    }
}

impl From<ReplaceProjectRequest> for contract::ProjectChanges {
    fn from(req: ReplaceProjectRequest) -> Self {
        Self {
            title: Some(req.title),
            application_id: Some(req.application),
            tool_id: req.tool,
            tag_ids: req.tags,
            data: req.data,
            thumbnail: req.thumbnail,
            description: req.description,
        }
    }
}

impl From<PatchProjectRequest> for contract::ProjectChanges {
    fn from(req: PatchProjectRequest) -> Self {
        Self {
            title: req.title,
            application_id: req.application,
            tool_id: req.tool,
            tag_ids: req.tags,
            data: req.data,
            thumbnail: req.thumbnail,
            description: req.description,
        }
    }
}
