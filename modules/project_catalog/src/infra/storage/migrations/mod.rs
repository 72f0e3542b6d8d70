//! Database migrations for the project catalog

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251020_000001_create_users::Migration),
            Box::new(m20251020_000002_create_catalog::Migration),
            Box::new(m20251020_000003_create_softwares::Migration),
            Box::new(m20251020_000004_create_projects::Migration),
        ]
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    Username,
    Name,
    PasswordHash,
    DateJoined,
    IsActive,
    IsStaff,
    IsSuperuser,
}

#[derive(DeriveIden)]
enum Tags {
    Table,
    Id,
    Name,
    Description,
}

#[derive(DeriveIden)]
enum Applications {
    Table,
    Id,
    Name,
    Link,
    Description,
}

#[derive(DeriveIden)]
enum Tools {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Softwares {
    Table,
    Id,
    Name,
    ToolId,
    DefaultFile,
    ApplicationId,
    Description,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
    OwnerId,
    Title,
    ApplicationId,
    ToolId,
    Data,
    Thumbnail,
    Description,
    CreatedAt,
    ModifiedAt,
    ModifiedDateHistory,
    ModifiedDataHistory,
    ModifiedThumbnailHistory,
}

#[derive(DeriveIden)]
enum ProjectTags {
    Table,
    ProjectId,
    TagId,
}

mod m20251020_000001_create_users {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20251020_000001_create_users"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Users::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Users::Email).string_len(255).not_null().unique_key())
                        .col(
                            ColumnDef::new(Users::Username)
                                .string_len(40)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::Name).string_len(255).not_null())
                        .col(ColumnDef::new(Users::PasswordHash).string_len(255).not_null())
                        .col(
                            ColumnDef::new(Users::DateJoined)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(Users::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Users::IsStaff)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Users::IsSuperuser)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }
}

mod m20251020_000002_create_catalog {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20251020_000002_create_catalog"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Tags::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Tags::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Tags::Name).string_len(255).not_null().unique_key())
                        .col(ColumnDef::new(Tags::Description).text().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Applications::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Applications::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Applications::Name)
                                .string_len(255)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Applications::Link)
                                .string_len(255)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Applications::Description).text().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Tools::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Tools::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Tools::Name).string_len(255).not_null().unique_key())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Tools::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Applications::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Tags::Table).to_owned())
                .await
        }
    }
}

mod m20251020_000003_create_softwares {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20251020_000003_create_softwares"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Softwares::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Softwares::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Softwares::Name)
                                .string_len(255)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Softwares::ToolId).integer())
                        .col(
                            ColumnDef::new(Softwares::DefaultFile)
                                .string_len(255)
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(Softwares::ApplicationId).integer().not_null())
                        .col(ColumnDef::new(Softwares::Description).text().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_softwares_application")
                                .from(Softwares::Table, Softwares::ApplicationId)
                                .to(Applications::Table, Applications::Id)
                                .on_delete(ForeignKeyAction::NoAction),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_softwares_tool")
                                .from(Softwares::Table, Softwares::ToolId)
                                .to(Tools::Table, Tools::Id)
                                .on_delete(ForeignKeyAction::NoAction),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Softwares::Table).to_owned())
                .await
        }
    }
}

mod m20251020_000004_create_projects {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20251020_000004_create_projects"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Projects::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Projects::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Projects::OwnerId).integer())
                        .col(ColumnDef::new(Projects::Title).string_len(255).not_null())
                        .col(ColumnDef::new(Projects::ApplicationId).integer().not_null())
                        .col(ColumnDef::new(Projects::ToolId).integer())
                        .col(
                            ColumnDef::new(Projects::Data)
                                .string_len(255)
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(Projects::Thumbnail)
                                .string_len(255)
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(Projects::Description).text())
                        .col(
                            ColumnDef::new(Projects::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(Projects::ModifiedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(ColumnDef::new(Projects::ModifiedDateHistory).json().not_null())
                        .col(ColumnDef::new(Projects::ModifiedDataHistory).json().not_null())
                        .col(
                            ColumnDef::new(Projects::ModifiedThumbnailHistory)
                                .json()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_projects_owner")
                                .from(Projects::Table, Projects::OwnerId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_projects_application")
                                .from(Projects::Table, Projects::ApplicationId)
                                .to(Applications::Table, Applications::Id)
                                .on_delete(ForeignKeyAction::NoAction),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_projects_tool")
                                .from(Projects::Table, Projects::ToolId)
                                .to(Tools::Table, Tools::Id)
                                .on_delete(ForeignKeyAction::NoAction),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_projects_owner_id")
                        .table(Projects::Table)
                        .col(Projects::OwnerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ProjectTags::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(ProjectTags::ProjectId).integer().not_null())
                        .col(ColumnDef::new(ProjectTags::TagId).integer().not_null())
                        .primary_key(
                            Index::create()
                                .col(ProjectTags::ProjectId)
                                .col(ProjectTags::TagId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_project_tags_project")
                                .from(ProjectTags::Table, ProjectTags::ProjectId)
                                .to(Projects::Table, Projects::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_project_tags_tag")
                                .from(ProjectTags::Table, ProjectTags::TagId)
                                .to(Tags::Table, Tags::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_project_tags_tag_id")
                        .table(ProjectTags::Table)
                        .col(ProjectTags::TagId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProjectTags::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Projects::Table).to_owned())
                .await
        }
    }
}
