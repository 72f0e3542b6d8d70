//! Catalog entities: tags, applications, tools and software
//!
//! Reads are public. Writes require a staff caller.

use super::{already_exists, who, write_failed, Service};
use crate::contract::{
    Application, ApplicationChanges, CatalogError, NewApplication, NewSoftware, NewTag, NewTool,
    Principal, Software, SoftwareChanges, SoftwareDetail, Tag, Tool, ToolChanges,
};
use crate::domain::access;
use crate::domain::filter::TagFilter;
use crate::domain::upload::{self, UploadKind, UploadedFile};
use crate::domain::validation::{bounded_text, required_text, MAX_CHAR_LEN};

impl Service {
    // ===== Tags =====

    /// List tags, ordered by name descending
    pub async fn list_tags(&self, filter: TagFilter) -> Result<Vec<Tag>, CatalogError> {
        self.repos
            .tags
            .list(filter)
            .await
            .map_err(CatalogError::internal)
    }

    pub async fn create_tag(&self, principal: &Principal, tag: NewTag) -> Result<Tag, CatalogError> {
        access::require_catalog_writer(principal)?;

        let name = required_text("name", &tag.name, MAX_CHAR_LEN)?;
        if self
            .repos
            .tags
            .find_by_name(&name)
            .await
            .map_err(CatalogError::internal)?
            .is_some()
        {
            return Err(already_exists("tag", "name"));
        }

        let created = self
            .repos
            .tags
            .create(&NewTag {
                name,
                description: tag.description,
            })
            .await
            .map_err(|e| write_failed(e, "tag", &["name"]))?;

        tracing::info!(tag_id = created.id, by = %who(principal), "tag created");
        Ok(created)
    }

    // ===== Applications =====

    /// List applications, newest first
    pub async fn list_applications(&self) -> Result<Vec<Application>, CatalogError> {
        self.repos
            .applications
            .list()
            .await
            .map_err(CatalogError::internal)
    }

    pub async fn get_application(&self, id: i32) -> Result<Application, CatalogError> {
        self.repos
            .applications
            .find_by_id(id)
            .await
            .map_err(CatalogError::internal)?
            .ok_or_else(|| CatalogError::not_found("application", id))
    }

    pub async fn create_application(
        &self,
        principal: &Principal,
        application: NewApplication,
    ) -> Result<Application, CatalogError> {
        access::require_catalog_writer(principal)?;

        let name = required_text("name", &application.name, MAX_CHAR_LEN)?;
        let link = required_text("link", &application.link, MAX_CHAR_LEN)?;
        self.ensure_application_unique(&name, &link, None).await?;

        let created = self
            .repos
            .applications
            .create(&NewApplication {
                name,
                link,
                description: application.description,
            })
            .await
            .map_err(|e| write_failed(e, "application", &["name", "link"]))?;

        tracing::info!(application_id = created.id, by = %who(principal), "application created");
        Ok(created)
    }

    pub async fn update_application(
        &self,
        principal: &Principal,
        id: i32,
        changes: ApplicationChanges,
    ) -> Result<Application, CatalogError> {
        access::require_catalog_writer(principal)?;
        let current = self.get_application(id).await?;

        let changes = ApplicationChanges {
            name: changes
                .name
                .map(|n| required_text("name", &n, MAX_CHAR_LEN))
                .transpose()?,
            link: changes
                .link
                .map(|l| required_text("link", &l, MAX_CHAR_LEN))
                .transpose()?,
            description: changes.description,
        };
        self.ensure_application_unique(
            changes.name.as_deref().unwrap_or(&current.name),
            changes.link.as_deref().unwrap_or(&current.link),
            Some(id),
        )
        .await?;

        let updated = self
            .repos
            .applications
            .update(id, &changes)
            .await
            .map_err(|e| write_failed(e, "application", &["name", "link"]))?
            .ok_or_else(|| CatalogError::not_found("application", id))?;

        tracing::debug!(application_id = id, by = %who(principal), "application updated");
        Ok(updated)
    }

    /// Delete an application that nothing refers to any more
    pub async fn delete_application(&self, principal: &Principal, id: i32) -> Result<(), CatalogError> {
        access::require_catalog_writer(principal)?;
        self.get_application(id).await?;

        if self
            .repos
            .applications
            .is_referenced(id)
            .await
            .map_err(CatalogError::internal)?
        {
            return Err(CatalogError::Conflict {
                reason: format!("application {} is still referenced by software or projects", id),
            });
        }

        self.repos
            .applications
            .delete(id)
            .await
            .map_err(CatalogError::internal)?;
        tracing::info!(application_id = id, by = %who(principal), "application deleted");
        Ok(())
    }

    async fn ensure_application_unique(
        &self,
        name: &str,
        link: &str,
        except: Option<i32>,
    ) -> Result<(), CatalogError> {
        let by_name = self
            .repos
            .applications
            .find_by_name(name)
            .await
            .map_err(CatalogError::internal)?;
        if by_name.is_some_and(|a| Some(a.id) != except) {
            return Err(already_exists("application", "name"));
        }

        let by_link = self
            .repos
            .applications
            .find_by_link(link)
            .await
            .map_err(CatalogError::internal)?;
        if by_link.is_some_and(|a| Some(a.id) != except) {
            return Err(already_exists("application", "link"));
        }
        Ok(())
    }

    // ===== Tools =====

    /// List tools, newest first
    pub async fn list_tools(&self) -> Result<Vec<Tool>, CatalogError> {
        self.repos.tools.list().await.map_err(CatalogError::internal)
    }

    pub async fn get_tool(&self, id: i32) -> Result<Tool, CatalogError> {
        self.repos
            .tools
            .find_by_id(id)
            .await
            .map_err(CatalogError::internal)?
            .ok_or_else(|| CatalogError::not_found("tool", id))
    }

    pub async fn create_tool(&self, principal: &Principal, tool: NewTool) -> Result<Tool, CatalogError> {
        access::require_catalog_writer(principal)?;

        let name = required_text("name", &tool.name, MAX_CHAR_LEN)?;
        self.ensure_tool_name_free(&name, None).await?;

        let created = self
            .repos
            .tools
            .create(&NewTool { name })
            .await
            .map_err(|e| write_failed(e, "tool", &["name"]))?;

        tracing::info!(tool_id = created.id, by = %who(principal), "tool created");
        Ok(created)
    }

    pub async fn update_tool(
        &self,
        principal: &Principal,
        id: i32,
        changes: ToolChanges,
    ) -> Result<Tool, CatalogError> {
        access::require_catalog_writer(principal)?;
        self.get_tool(id).await?;

        let name = changes
            .name
            .map(|n| required_text("name", &n, MAX_CHAR_LEN))
            .transpose()?;
        if let Some(name) = &name {
            self.ensure_tool_name_free(name, Some(id)).await?;
        }

        self.repos
            .tools
            .update(id, &ToolChanges { name })
            .await
            .map_err(|e| write_failed(e, "tool", &["name"]))?
            .ok_or_else(|| CatalogError::not_found("tool", id))
    }

    /// Delete a tool that nothing refers to any more
    pub async fn delete_tool(&self, principal: &Principal, id: i32) -> Result<(), CatalogError> {
        access::require_catalog_writer(principal)?;
        self.get_tool(id).await?;

        if self
            .repos
            .tools
            .is_referenced(id)
            .await
            .map_err(CatalogError::internal)?
        {
            return Err(CatalogError::Conflict {
                reason: format!("tool {} is still referenced by software or projects", id),
            });
        }

        self.repos
            .tools
            .delete(id)
            .await
            .map_err(CatalogError::internal)?;
        tracing::info!(tool_id = id, by = %who(principal), "tool deleted");
        Ok(())
    }

    async fn ensure_tool_name_free(&self, name: &str, except: Option<i32>) -> Result<(), CatalogError> {
        let existing = self
            .repos
            .tools
            .find_by_name(name)
            .await
            .map_err(CatalogError::internal)?;
        if existing.is_some_and(|t| Some(t.id) != except) {
            return Err(already_exists("tool", "name"));
        }
        Ok(())
    }

    // ===== Software =====

    /// List software, newest first
    pub async fn list_softwares(&self) -> Result<Vec<Software>, CatalogError> {
        self.repos
            .softwares
            .list()
            .await
            .map_err(CatalogError::internal)
    }

    /// Software with its application and tool resolved
    pub async fn get_software(&self, id: i32) -> Result<SoftwareDetail, CatalogError> {
        let software = self.find_software(id).await?;
        let application = self
            .repos
            .applications
            .find_by_id(software.application_id)
            .await
            .map_err(CatalogError::internal)?
            .ok_or_else(|| {
                // referential cleanup is left to operators
                CatalogError::not_found("application", software.application_id)
            })?;
        let tool = match software.tool_id {
            Some(tool_id) => self
                .repos
                .tools
                .find_by_id(tool_id)
                .await
                .map_err(CatalogError::internal)?,
            None => None,
        };

        Ok(SoftwareDetail {
            software,
            application,
            tool,
        })
    }

    pub async fn create_software(
        &self,
        principal: &Principal,
        software: NewSoftware,
    ) -> Result<Software, CatalogError> {
        access::require_catalog_writer(principal)?;

        let name = required_text("name", &software.name, MAX_CHAR_LEN)?;
        let default_file = bounded_text("default_file", &software.default_file, MAX_CHAR_LEN)?;
        self.ensure_software_name_free(&name, None).await?;
        self.ensure_application(software.application_id).await?;
        self.ensure_tool(software.tool_id).await?;

        let created = self
            .repos
            .softwares
            .create(&NewSoftware {
                name,
                default_file,
                ..software
            })
            .await
            .map_err(|e| write_failed(e, "software", &["name"]))?;

        tracing::info!(software_id = created.id, by = %who(principal), "software created");
        Ok(created)
    }

    pub async fn update_software(
        &self,
        principal: &Principal,
        id: i32,
        changes: SoftwareChanges,
    ) -> Result<Software, CatalogError> {
        access::require_catalog_writer(principal)?;
        self.find_software(id).await?;

        let name = changes
            .name
            .map(|n| required_text("name", &n, MAX_CHAR_LEN))
            .transpose()?;
        if let Some(name) = &name {
            self.ensure_software_name_free(name, Some(id)).await?;
        }
        let default_file = changes
            .default_file
            .map(|f| bounded_text("default_file", &f, MAX_CHAR_LEN))
            .transpose()?;
        if let Some(application_id) = changes.application_id {
            self.ensure_application(application_id).await?;
        }
        if let Some(tool_id) = changes.tool_id {
            self.ensure_tool(tool_id).await?;
        }

        let changes = SoftwareChanges {
            name,
            default_file,
            ..changes
        };
        self.repos
            .softwares
            .update(id, &changes)
            .await
            .map_err(|e| write_failed(e, "software", &["name"]))?
            .ok_or_else(|| CatalogError::not_found("software", id))
    }

    pub async fn delete_software(&self, principal: &Principal, id: i32) -> Result<(), CatalogError> {
        access::require_catalog_writer(principal)?;

        let deleted = self
            .repos
            .softwares
            .delete(id)
            .await
            .map_err(CatalogError::internal)?;
        if !deleted {
            return Err(CatalogError::not_found("software", id));
        }
        tracing::info!(software_id = id, by = %who(principal), "software deleted");
        Ok(())
    }

    /// Store a new default file for a software entry
    ///
    /// The reference is only written after the file is stored; a failed
    /// record update removes the stored file again.
    pub async fn upload_software_file(
        &self,
        principal: &Principal,
        id: i32,
        file: Option<UploadedFile>,
    ) -> Result<Software, CatalogError> {
        access::require_catalog_writer(principal)?;
        self.find_software(id).await?;

        let kind = UploadKind::SoftwareDefaultFile;
        let extension = upload::validate(kind, file.as_ref(), self.max_upload_size)?;
        let contents = file.map(|f| f.contents).unwrap_or_default();
        let reference = self.store_media(kind, &extension, contents).await?;

        let changes = SoftwareChanges {
            default_file: Some(reference.clone()),
            ..Default::default()
        };
        let updated = self.repos.softwares.update(id, &changes).await;
        match updated {
            Ok(Some(software)) => {
                tracing::info!(software_id = id, reference = %reference, "software file uploaded");
                Ok(software)
            }
            Ok(None) => {
                self.discard_media(&reference).await;
                Err(CatalogError::not_found("software", id))
            }
            Err(e) => {
                self.discard_media(&reference).await;
                Err(CatalogError::internal(e))
            }
        }
    }

    async fn find_software(&self, id: i32) -> Result<Software, CatalogError> {
        self.repos
            .softwares
            .find_by_id(id)
            .await
            .map_err(CatalogError::internal)?
            .ok_or_else(|| CatalogError::not_found("software", id))
    }

    async fn ensure_software_name_free(
        &self,
        name: &str,
        except: Option<i32>,
    ) -> Result<(), CatalogError> {
        let existing = self
            .repos
            .softwares
            .find_by_name(name)
            .await
            .map_err(CatalogError::internal)?;
        if existing.is_some_and(|s| Some(s.id) != except) {
            return Err(already_exists("software", "name"));
        }
        Ok(())
    }
}
