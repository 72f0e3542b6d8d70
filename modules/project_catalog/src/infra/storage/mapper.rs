//! Entity to model mappers
//!
//! Conversions between SeaORM entities and contract models

use super::entity::{application, project, software, tag, tool, user};
use crate::contract::{Application, Project, Software, Tag, Tool, User};
use anyhow::{Context, Result};
use sea_orm::entity::prelude::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;

// ===== Catalog Conversions =====

impl From<user::Model> for User {
    fn from(entity: user::Model) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            username: entity.username,
            name: entity.name,
            password_hash: entity.password_hash,
            date_joined: entity.date_joined,
            is_active: entity.is_active,
            is_staff: entity.is_staff,
            is_superuser: entity.is_superuser,
        }
    }
}

impl From<tag::Model> for Tag {
    fn from(entity: tag::Model) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
        }
    }
}

impl From<application::Model> for Application {
    fn from(entity: application::Model) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            link: entity.link,
            description: entity.description,
        }
    }
}

impl From<tool::Model> for Tool {
    fn from(entity: tool::Model) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
        }
    }
}

impl From<software::Model> for Software {
    fn from(entity: software::Model) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            tool_id: entity.tool_id,
            default_file: entity.default_file,
            application_id: entity.application_id,
            description: entity.description,
        }
    }
}

// ===== Project Conversions =====

/// Build a project from its row and its tag links
pub fn project_from_entity(entity: project::Model, tag_ids: Vec<i32>) -> Result<Project> {
    Ok(Project {
        id: entity.id,
        owner_id: entity.owner_id,
        title: entity.title,
        application_id: entity.application_id,
        tool_id: entity.tool_id,
        data: entity.data,
        thumbnail: entity.thumbnail,
        description: entity.description,
        created_at: entity.created_at,
        modified_at: entity.modified_at,
        tag_ids,
        modified_date_history: from_json(entity.modified_date_history)
            .context("modified_date_history")?,
        modified_data_history: from_json(entity.modified_data_history)
            .context("modified_data_history")?,
        modified_thumbnail_history: from_json(entity.modified_thumbnail_history)
            .context("modified_thumbnail_history")?,
    })
}

/// Full active model for a project row; tag links are stored separately
pub fn project_to_active_model(model: &Project) -> Result<project::ActiveModel> {
    use sea_orm::ActiveValue::Set;

    Ok(project::ActiveModel {
        id: Set(model.id),
        owner_id: Set(model.owner_id),
        title: Set(model.title.clone()),
        application_id: Set(model.application_id),
        tool_id: Set(model.tool_id),
        data: Set(model.data.clone()),
        thumbnail: Set(model.thumbnail.clone()),
        description: Set(model.description.clone()),
        created_at: Set(model.created_at),
        modified_at: Set(model.modified_at),
        modified_date_history: Set(to_json(&model.modified_date_history)?),
        modified_data_history: Set(to_json(&model.modified_data_history)?),
        modified_thumbnail_history: Set(to_json(&model.modified_thumbnail_history)?),
    })
}

fn from_json<T: DeserializeOwned>(value: Json) -> Result<Vec<T>> {
    Ok(serde_json::from_value(value)?)
}

pub(crate) fn to_json<T: Serialize>(values: &[T]) -> Result<Json> {
    Ok(serde_json::to_value(values)?)
}
