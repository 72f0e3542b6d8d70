//! Student projects
//!
//! Every project operation is scoped to the caller's own projects; a project
//! owned by someone else is reported as not found.

use super::{now, who, Service};
use crate::contract::{CatalogError, NewProject, Principal, Project, ProjectChanges, ProjectDetail};
use crate::domain::access;
use crate::domain::filter::ProjectFilter;
use crate::domain::upload::{self, UploadKind, UploadedFile};
use crate::domain::validation::{bounded_text, required_text, MAX_CHAR_LEN};

impl Service {
    /// List the caller's projects, newest first
    pub async fn list_projects(
        &self,
        principal: &Principal,
        filter: &ProjectFilter,
    ) -> Result<Vec<Project>, CatalogError> {
        let owner_id = access::project_scope(principal)?;
        self.repos
            .projects
            .list_owned(owner_id, filter)
            .await
            .map_err(CatalogError::internal)
    }

    /// One of the caller's projects with its tags resolved
    pub async fn get_project(
        &self,
        principal: &Principal,
        id: i32,
    ) -> Result<ProjectDetail, CatalogError> {
        let project = self.find_project(principal, id).await?;
        let tags = self
            .repos
            .tags
            .find_many(&project.tag_ids)
            .await
            .map_err(CatalogError::internal)?;
        Ok(ProjectDetail { project, tags })
    }

    pub async fn create_project(
        &self,
        principal: &Principal,
        project: NewProject,
    ) -> Result<Project, CatalogError> {
        let owner_id = access::project_scope(principal)?;

        let title = required_text("title", &project.title, MAX_CHAR_LEN)?;
        let data = bounded_text("data", &project.data, MAX_CHAR_LEN)?;
        let thumbnail = bounded_text("thumbnail", &project.thumbnail, MAX_CHAR_LEN)?;
        self.ensure_application(project.application_id).await?;
        self.ensure_tool(project.tool_id).await?;
        self.ensure_tags(&project.tag_ids).await?;

        let mut tag_ids = project.tag_ids;
        tag_ids.sort_unstable();
        tag_ids.dedup();

        let created = self
            .repos
            .projects
            .create(
                owner_id,
                &NewProject {
                    title,
                    data,
                    thumbnail,
                    tag_ids,
                    ..project
                },
                now(),
            )
            .await
            .map_err(CatalogError::internal)?;

        tracing::info!(project_id = created.id, owner_id, "project created");
        Ok(created)
    }

    /// Apply one update event, appending the prior state to the history arrays
    pub async fn update_project(
        &self,
        principal: &Principal,
        id: i32,
        changes: ProjectChanges,
    ) -> Result<Project, CatalogError> {
        let owner_id = access::project_scope(principal)?;
        self.find_project(principal, id).await?;

        let changes = ProjectChanges {
            title: changes
                .title
                .map(|t| required_text("title", &t, MAX_CHAR_LEN))
                .transpose()?,
            data: changes
                .data
                .map(|d| bounded_text("data", &d, MAX_CHAR_LEN))
                .transpose()?,
            thumbnail: changes
                .thumbnail
                .map(|t| bounded_text("thumbnail", &t, MAX_CHAR_LEN))
                .transpose()?,
            ..changes
        };
        if let Some(application_id) = changes.application_id {
            self.ensure_application(application_id).await?;
        }
        if let Some(tool_id) = changes.tool_id {
            self.ensure_tool(tool_id).await?;
        }
        if let Some(tag_ids) = &changes.tag_ids {
            self.ensure_tags(tag_ids).await?;
        }

        let updated = self.commit_update(owner_id, id, changes).await?;
        tracing::debug!(
            project_id = id,
            by = %who(principal),
            revisions = updated.modified_date_history.len(),
            "project updated"
        );
        Ok(updated)
    }

    pub async fn delete_project(&self, principal: &Principal, id: i32) -> Result<(), CatalogError> {
        let owner_id = access::project_scope(principal)?;

        let deleted = self
            .repos
            .projects
            .delete_owned(id, owner_id)
            .await
            .map_err(CatalogError::internal)?;
        if !deleted {
            return Err(CatalogError::not_found("project", id));
        }
        tracing::info!(project_id = id, owner_id, "project deleted");
        Ok(())
    }

    /// Store an uploaded thumbnail or data file and point the project at it
    ///
    /// Counts as an update event. The stored file is removed again when the
    /// record update does not commit.
    pub async fn upload_project_file(
        &self,
        principal: &Principal,
        id: i32,
        kind: UploadKind,
        file: Option<UploadedFile>,
    ) -> Result<Project, CatalogError> {
        let owner_id = access::project_scope(principal)?;
        let assign: fn(&mut ProjectChanges, String) = match kind {
            UploadKind::ProjectThumbnail => |changes, reference| changes.thumbnail = Some(reference),
            UploadKind::ProjectData => |changes, reference| changes.data = Some(reference),
            UploadKind::SoftwareDefaultFile => {
                return Err(CatalogError::validation(
                    kind.field(),
                    "This upload is not accepted for projects.",
                ))
            }
        };
        self.find_project(principal, id).await?;

        let extension = upload::validate(kind, file.as_ref(), self.max_upload_size)?;
        let contents = file.map(|f| f.contents).unwrap_or_default();
        let reference = self.store_media(kind, &extension, contents).await?;

        let mut changes = ProjectChanges::default();
        assign(&mut changes, reference.clone());

        match self.commit_update(owner_id, id, changes).await {
            Ok(project) => {
                tracing::info!(project_id = id, reference = %reference, "project file uploaded");
                Ok(project)
            }
            Err(e) => {
                self.discard_media(&reference).await;
                Err(e)
            }
        }
    }

    async fn commit_update(
        &self,
        owner_id: i32,
        id: i32,
        changes: ProjectChanges,
    ) -> Result<Project, CatalogError> {
        self.repos
            .projects
            .update_owned(id, owner_id, changes, now())
            .await
            .map_err(CatalogError::internal)?
            .ok_or_else(|| CatalogError::not_found("project", id))
    }

    async fn find_project(&self, principal: &Principal, id: i32) -> Result<Project, CatalogError> {
        let owner_id = access::project_scope(principal)?;
        self.repos
            .projects
            .find_owned(id, owner_id)
            .await
            .map_err(CatalogError::internal)?
            .ok_or_else(|| CatalogError::not_found("project", id))
    }
}
