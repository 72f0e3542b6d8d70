//! SeaORM repository implementations

use super::entity::{application, project, project_tag, software, tag, tool, user};
use super::mapper::{project_from_entity, project_to_active_model};
use crate::contract::{
    Application, ApplicationChanges, NewApplication, NewProject, NewSoftware, NewTag, NewTool,
    NewUser, Project, ProjectChanges, Software, SoftwareChanges, Tag, Tool, ToolChanges, User,
    UserChanges,
};
use crate::domain::filter::{ProjectFilter, TagFilter};
use crate::domain::history;
use crate::domain::repository::{
    ApplicationRepository, ProjectRepository, SoftwareRepository, TagRepository, ToolRepository,
    UniqueViolation, UserRepository,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sea_orm::entity::prelude::Json;
use sea_orm::{
    prelude::Expr, ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait,
    ConnectionTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait, SqlErr, TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;

// ===== User Repository =====

pub struct SeaOrmUserRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmUserRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn create(&self, new: &NewUser) -> Result<User> {
        let model = user::ActiveModel {
            id: NotSet,
            email: Set(new.email.clone()),
            username: Set(new.username.clone()),
            name: Set(new.name.clone()),
            password_hash: Set(new.password_hash.clone()),
            date_joined: Set(Utc::now().trunc_subsecs(6)),
            is_active: Set(true),
            is_staff: Set(new.is_staff),
            is_superuser: Set(new.is_superuser),
        }
        .insert(&*self.db)
        .await
        .map_err(unique_violation)?;

        Ok(model.into())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>> {
        let result = user::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let result = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let result = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn update(&self, id: i32, changes: &UserChanges) -> Result<Option<User>> {
        let Some(existing) = user::Entity::find_by_id(id).one(&*self.db).await? else {
            return Ok(None);
        };

        let mut active = existing.clone().into_active_model();
        if let Some(email) = &changes.email {
            active.email = Set(email.clone());
        }
        if let Some(name) = &changes.name {
            active.name = Set(name.clone());
        }
        if let Some(password_hash) = &changes.password_hash {
            active.password_hash = Set(password_hash.clone());
        }

        if !active.is_changed() {
            return Ok(Some(existing.into()));
        }

        let updated = active
            .update(&*self.db)
            .await
            .map_err(unique_violation)?;
        Ok(Some(updated.into()))
    }

    async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.db.begin().await?;

        // Projects survive their owner
        project::Entity::update_many()
            .col_expr(project::Column::OwnerId, Expr::value(Option::<i32>::None))
            .filter(project::Column::OwnerId.eq(id))
            .exec(&txn)
            .await?;

        let result = user::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        Ok(result.rows_affected > 0)
    }
}

// ===== Tag Repository =====

pub struct SeaOrmTagRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmTagRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TagRepository for SeaOrmTagRepository {
    async fn create(&self, new: &NewTag) -> Result<Tag> {
        let model = tag::ActiveModel {
            id: NotSet,
            name: Set(new.name.clone()),
            description: Set(new.description.clone()),
        }
        .insert(&*self.db)
        .await
        .map_err(unique_violation)?;

        Ok(model.into())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let result = tag::Entity::find()
            .filter(tag::Column::Name.eq(name))
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn find_many(&self, ids: &[i32]) -> Result<Vec<Tag>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let results = tag::Entity::find()
            .filter(tag::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(tag::Column::Id)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn list(&self, filter: TagFilter) -> Result<Vec<Tag>> {
        let mut query = tag::Entity::find();

        if filter.assigned_only {
            // A subquery keeps each tag once however many projects carry it
            query = query.filter(
                tag::Column::Id.in_subquery(
                    project_tag::Entity::find()
                        .select_only()
                        .column(project_tag::Column::TagId)
                        .into_query(),
                ),
            );
        }

        let results = query
            .order_by_desc(tag::Column::Name)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }
}

// ===== Application Repository =====

pub struct SeaOrmApplicationRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmApplicationRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ApplicationRepository for SeaOrmApplicationRepository {
    async fn create(&self, new: &NewApplication) -> Result<Application> {
        let model = application::ActiveModel {
            id: NotSet,
            name: Set(new.name.clone()),
            link: Set(new.link.clone()),
            description: Set(new.description.clone()),
        }
        .insert(&*self.db)
        .await
        .map_err(unique_violation)?;

        Ok(model.into())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Application>> {
        let result = application::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(result.map(Into::into))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Application>> {
        let result = application::Entity::find()
            .filter(application::Column::Name.eq(name))
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn find_by_link(&self, link: &str) -> Result<Option<Application>> {
        let result = application::Entity::find()
            .filter(application::Column::Link.eq(link))
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Application>> {
        let results = application::Entity::find()
            .order_by_desc(application::Column::Id)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: i32, changes: &ApplicationChanges) -> Result<Option<Application>> {
        let Some(existing) = application::Entity::find_by_id(id).one(&*self.db).await? else {
            return Ok(None);
        };

        let mut active = existing.clone().into_active_model();
        if let Some(name) = &changes.name {
            active.name = Set(name.clone());
        }
        if let Some(link) = &changes.link {
            active.link = Set(link.clone());
        }
        if let Some(description) = &changes.description {
            active.description = Set(description.clone());
        }

        if !active.is_changed() {
            return Ok(Some(existing.into()));
        }

        let updated = active
            .update(&*self.db)
            .await
            .map_err(unique_violation)?;
        Ok(Some(updated.into()))
    }

    async fn delete(&self, id: i32) -> Result<bool> {
        let result = application::Entity::delete_by_id(id).exec(&*self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn is_referenced(&self, id: i32) -> Result<bool> {
        let softwares = software::Entity::find()
            .filter(software::Column::ApplicationId.eq(id))
            .count(&*self.db)
            .await?;
        let projects = project::Entity::find()
            .filter(project::Column::ApplicationId.eq(id))
            .count(&*self.db)
            .await?;

        Ok(softwares + projects > 0)
    }
}

// ===== Tool Repository =====

pub struct SeaOrmToolRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmToolRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ToolRepository for SeaOrmToolRepository {
    async fn create(&self, new: &NewTool) -> Result<Tool> {
        let model = tool::ActiveModel {
            id: NotSet,
            name: Set(new.name.clone()),
        }
        .insert(&*self.db)
        .await
        .map_err(unique_violation)?;

        Ok(model.into())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Tool>> {
        let result = tool::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(result.map(Into::into))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Tool>> {
        let result = tool::Entity::find()
            .filter(tool::Column::Name.eq(name))
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Tool>> {
        let results = tool::Entity::find()
            .order_by_desc(tool::Column::Id)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: i32, changes: &ToolChanges) -> Result<Option<Tool>> {
        let Some(existing) = tool::Entity::find_by_id(id).one(&*self.db).await? else {
            return Ok(None);
        };

        let mut active = existing.clone().into_active_model();
        if let Some(name) = &changes.name {
            active.name = Set(name.clone());
        }

        if !active.is_changed() {
            return Ok(Some(existing.into()));
        }

        let updated = active
            .update(&*self.db)
            .await
            .map_err(unique_violation)?;
        Ok(Some(updated.into()))
    }

    async fn delete(&self, id: i32) -> Result<bool> {
        let result = tool::Entity::delete_by_id(id).exec(&*self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn is_referenced(&self, id: i32) -> Result<bool> {
        let softwares = software::Entity::find()
            .filter(software::Column::ToolId.eq(id))
            .count(&*self.db)
            .await?;
        let projects = project::Entity::find()
            .filter(project::Column::ToolId.eq(id))
            .count(&*self.db)
            .await?;

        Ok(softwares + projects > 0)
    }
}

// ===== Software Repository =====

pub struct SeaOrmSoftwareRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmSoftwareRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SoftwareRepository for SeaOrmSoftwareRepository {
    async fn create(&self, new: &NewSoftware) -> Result<Software> {
        let model = software::ActiveModel {
            id: NotSet,
            name: Set(new.name.clone()),
            tool_id: Set(new.tool_id),
            default_file: Set(new.default_file.clone()),
            application_id: Set(new.application_id),
            description: Set(new.description.clone()),
        }
        .insert(&*self.db)
        .await
        .map_err(unique_violation)?;

        Ok(model.into())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Software>> {
        let result = software::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(result.map(Into::into))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Software>> {
        let result = software::Entity::find()
            .filter(software::Column::Name.eq(name))
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Software>> {
        let results = software::Entity::find()
            .order_by_desc(software::Column::Id)
            .all(&*self.db)
            .await?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: i32, changes: &SoftwareChanges) -> Result<Option<Software>> {
        let Some(existing) = software::Entity::find_by_id(id).one(&*self.db).await? else {
            return Ok(None);
        };

        let mut active = existing.clone().into_active_model();
        if let Some(name) = &changes.name {
            active.name = Set(name.clone());
        }
        if let Some(tool_id) = changes.tool_id {
            active.tool_id = Set(tool_id);
        }
        if let Some(default_file) = &changes.default_file {
            active.default_file = Set(default_file.clone());
        }
        if let Some(application_id) = changes.application_id {
            active.application_id = Set(application_id);
        }
        if let Some(description) = &changes.description {
            active.description = Set(description.clone());
        }

        if !active.is_changed() {
            return Ok(Some(existing.into()));
        }

        let updated = active
            .update(&*self.db)
            .await
            .map_err(unique_violation)?;
        Ok(Some(updated.into()))
    }

    async fn delete(&self, id: i32) -> Result<bool> {
        let result = software::Entity::delete_by_id(id).exec(&*self.db).await?;
        Ok(result.rows_affected > 0)
    }
}

// ===== Project Repository =====

pub struct SeaOrmProjectRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmProjectRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProjectRepository for SeaOrmProjectRepository {
    async fn create(
        &self,
        owner_id: i32,
        new: &NewProject,
        now: DateTime<Utc>,
    ) -> Result<Project> {
        let txn = self.db.begin().await?;

        let model = project::ActiveModel {
            id: NotSet,
            owner_id: Set(Some(owner_id)),
            title: Set(new.title.clone()),
            application_id: Set(new.application_id),
            tool_id: Set(new.tool_id),
            data: Set(new.data.clone()),
            thumbnail: Set(new.thumbnail.clone()),
            description: Set(new.description.clone()),
            created_at: Set(now),
            modified_at: Set(now),
            modified_date_history: Set(Json::Array(Vec::new())),
            modified_data_history: Set(Json::Array(Vec::new())),
            modified_thumbnail_history: Set(Json::Array(Vec::new())),
        }
        .insert(&txn)
        .await?;

        replace_tags(&txn, model.id, &new.tag_ids).await?;
        txn.commit().await?;

        project_from_entity(model, new.tag_ids.clone())
    }

    async fn find_owned(&self, id: i32, owner_id: i32) -> Result<Option<Project>> {
        let Some(model) = project::Entity::find_by_id(id)
            .filter(project::Column::OwnerId.eq(owner_id))
            .one(&*self.db)
            .await?
        else {
            return Ok(None);
        };

        let tag_ids = tag_ids_of(&*self.db, &[id])
            .await?
            .remove(&id)
            .unwrap_or_default();
        Ok(Some(project_from_entity(model, tag_ids)?))
    }

    async fn list_owned(&self, owner_id: i32, filter: &ProjectFilter) -> Result<Vec<Project>> {
        let mut query = project::Entity::find().filter(project::Column::OwnerId.eq(owner_id));

        if let Some(tag_ids) = &filter.tag_ids {
            query = query.filter(
                project::Column::Id.in_subquery(
                    project_tag::Entity::find()
                        .select_only()
                        .column(project_tag::Column::ProjectId)
                        .filter(project_tag::Column::TagId.is_in(tag_ids.iter().copied()))
                        .into_query(),
                ),
            );
        }
        if let Some(application_ids) = &filter.application_ids {
            query = query.filter(
                project::Column::ApplicationId.is_in(application_ids.iter().copied()),
            );
        }

        let models = query
            .order_by_desc(project::Column::Id)
            .all(&*self.db)
            .await?;

        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let mut tags = tag_ids_of(&*self.db, &ids).await?;

        models
            .into_iter()
            .map(|model| {
                let tag_ids = tags.remove(&model.id).unwrap_or_default();
                project_from_entity(model, tag_ids)
            })
            .collect()
    }

    async fn update_owned(
        &self,
        id: i32,
        owner_id: i32,
        changes: ProjectChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Project>> {
        let txn = self.db.begin().await?;

        let mut select = project::Entity::find_by_id(id)
            .filter(project::Column::OwnerId.eq(owner_id));
        if txn.get_database_backend() == DbBackend::Postgres {
            // Concurrent updates of one project must not lose history entries
            select = select.lock_exclusive();
        }
        let Some(model) = select.one(&txn).await? else {
            return Ok(None);
        };

        let tag_ids = tag_ids_of(&txn, &[id]).await?.remove(&id).unwrap_or_default();
        let mut project = project_from_entity(model, tag_ids)?;

        let retag = changes.tag_ids.is_some();
        history::apply_update(&mut project, changes, now);

        project_to_active_model(&project)?.update(&txn).await?;
        if retag {
            replace_tags(&txn, id, &project.tag_ids).await?;
        }
        txn.commit().await?;

        Ok(Some(project))
    }

    async fn delete_owned(&self, id: i32, owner_id: i32) -> Result<bool> {
        let txn = self.db.begin().await?;

        let owned = project::Entity::find_by_id(id)
            .filter(project::Column::OwnerId.eq(owner_id))
            .count(&txn)
            .await?;
        if owned == 0 {
            return Ok(false);
        }

        project_tag::Entity::delete_many()
            .filter(project_tag::Column::ProjectId.eq(id))
            .exec(&txn)
            .await?;
        let result = project::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        Ok(result.rows_affected > 0)
    }
}

/// Surface unique-index collisions as [`UniqueViolation`]
fn unique_violation(err: DbErr) -> anyhow::Error {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => UniqueViolation { detail }.into(),
        _ => err.into(),
    }
}

/// Tag ids per project, ascending
async fn tag_ids_of<C: ConnectionTrait>(
    db: &C,
    project_ids: &[i32],
) -> Result<HashMap<i32, Vec<i32>>> {
    if project_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let links = project_tag::Entity::find()
        .filter(project_tag::Column::ProjectId.is_in(project_ids.iter().copied()))
        .order_by_asc(project_tag::Column::TagId)
        .all(db)
        .await?;

    let mut by_project: HashMap<i32, Vec<i32>> = HashMap::new();
    for link in links {
        by_project.entry(link.project_id).or_default().push(link.tag_id);
    }
    Ok(by_project)
}

async fn replace_tags<C: ConnectionTrait>(db: &C, project_id: i32, tag_ids: &[i32]) -> Result<()> {
    project_tag::Entity::delete_many()
        .filter(project_tag::Column::ProjectId.eq(project_id))
        .exec(db)
        .await?;

    if tag_ids.is_empty() {
        return Ok(());
    }

    let links = tag_ids.iter().map(|&tag_id| project_tag::ActiveModel {
        project_id: Set(project_id),
        tag_id: Set(tag_id),
    });
    project_tag::Entity::insert_many(links)
        .exec_without_returning(db)
        .await?;

    Ok(())
}
