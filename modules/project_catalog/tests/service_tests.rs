//! Service tests over in-memory repositories
//!
//! Exercise permissions, owner scoping, filters and the update history
//! without a database.

mod common;

use bytes::Bytes;
use chrono::Timelike;
use common::{mock_service, mock_service_with, print_test_header, test_config, PNG};
use project_catalog::contract::{
    ApplicationChanges, NewApplication, NewProject, NewSoftware, NewTag, NewTool,
};
use project_catalog::domain::{ProjectFilter, Service, TagFilter, UploadKind, UploadedFile};
use project_catalog::{CatalogError, Principal, ProjectChanges};
use std::path::PathBuf;
use std::sync::Arc;

const STAFF: Principal = Principal::staff(1_000);

async fn seed_application(service: &Service, name: &str) -> i32 {
    service
        .create_application(
            &STAFF,
            NewApplication {
                name: name.to_string(),
                link: format!("https://{}.example.com", name.to_lowercase()),
                description: String::new(),
            },
        )
        .await
        .unwrap()
        .id
}

async fn seed_tag(service: &Service, name: &str) -> i32 {
    service
        .create_tag(
            &STAFF,
            NewTag {
                name: name.to_string(),
                description: String::new(),
            },
        )
        .await
        .unwrap()
        .id
}

async fn seed_user(service: &Service, username: &str) -> Principal {
    let user = service
        .register_user(
            &format!("{}@example.com", username),
            username,
            "testpass123",
            username,
        )
        .await
        .unwrap();
    Principal::user(user.id)
}

async fn seed_project(
    service: &Service,
    owner: &Principal,
    title: &str,
    application_id: i32,
    tag_ids: Vec<i32>,
) -> i32 {
    service
        .create_project(
            owner,
            NewProject {
                title: title.to_string(),
                application_id,
                tool_id: None,
                data: "data-v0".to_string(),
                thumbnail: "thumb-v0".to_string(),
                description: None,
                tag_ids,
            },
        )
        .await
        .unwrap()
        .id
}

fn png_file() -> Option<UploadedFile> {
    Some(UploadedFile {
        file_name: Some("cover.png".to_string()),
        contents: Bytes::from_static(PNG),
    })
}

// ===== History =====

#[tokio::test]
async fn test_each_update_appends_one_history_entry() {
    print_test_header(
        "test_each_update_appends_one_history_entry",
        &[
            "N updates leave N entries in each history array",
            "Entries hold the pre-update values in update order",
        ],
    );

    let (service, store, _) = mock_service();
    let app = seed_application(&service, "Scratch").await;
    let owner = seed_user(&service, "alice").await;
    let id = seed_project(&service, &owner, "Cool Project", app, vec![]).await;
    let created_at = service.get_project(&owner, id).await.unwrap().project.modified_at;

    for version in 1..=3 {
        service
            .update_project(
                &owner,
                id,
                ProjectChanges {
                    data: Some(format!("data-v{}", version)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }
    store.print_projects("after three updates");

    let project = service.get_project(&owner, id).await.unwrap().project;
    assert_eq!(project.data, "data-v3");
    assert_eq!(
        project.modified_data_history,
        vec!["data-v0", "data-v1", "data-v2"]
    );
    assert_eq!(project.modified_thumbnail_history.len(), 3);
    assert_eq!(project.modified_date_history.len(), 3);
    assert_eq!(project.modified_date_history[0], created_at);
    assert!(project
        .modified_date_history
        .windows(2)
        .all(|pair| pair[0] <= pair[1]));
    println!("✓ History has one entry per update");
}

#[tokio::test]
async fn test_project_timestamps_have_microsecond_precision() {
    print_test_header(
        "test_project_timestamps_have_microsecond_precision",
        &[
            "Timestamps are cut to what the database column keeps",
            "so the value returned by a write equals the value read back later",
        ],
    );

    let (service, _, _) = mock_service();
    let app = seed_application(&service, "Scratch").await;
    let owner = seed_user(&service, "alice").await;
    let id = seed_project(&service, &owner, "Cool Project", app, vec![]).await;

    let created = service.get_project(&owner, id).await.unwrap().project;
    assert_eq!(created.modified_at.nanosecond() % 1_000, 0);

    let updated = service
        .update_project(
            &owner,
            id,
            ProjectChanges {
                title: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.modified_at.nanosecond() % 1_000, 0);
    assert_eq!(updated.modified_date_history, vec![created.modified_at]);
    println!("✓ Timestamps truncated to microseconds");
}

#[tokio::test]
async fn test_title_only_update_still_logs_data_and_thumbnail() {
    print_test_header(
        "test_title_only_update_still_logs_data_and_thumbnail",
        &["Untouched data and thumbnail are logged unchanged"],
    );

    let (service, _, _) = mock_service();
    let app = seed_application(&service, "Scratch").await;
    let owner = seed_user(&service, "alice").await;
    let id = seed_project(&service, &owner, "Cool Project", app, vec![]).await;

    let updated = service
        .update_project(
            &owner,
            id,
            ProjectChanges {
                title: Some("Patched Project".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Patched Project");
    assert_eq!(updated.data, "data-v0");
    assert_eq!(updated.modified_data_history, vec!["data-v0"]);
    assert_eq!(updated.modified_thumbnail_history, vec!["thumb-v0"]);
    println!("✓ Unchanged values were recorded");
}

#[tokio::test]
async fn test_update_rejects_unknown_references() {
    print_test_header(
        "test_update_rejects_unknown_references",
        &[
            "Unknown application or tag ids are validation errors",
            "A rejected update leaves no history behind",
        ],
    );

    let (service, _, _) = mock_service();
    let app = seed_application(&service, "Scratch").await;
    let owner = seed_user(&service, "alice").await;
    let id = seed_project(&service, &owner, "Cool Project", app, vec![]).await;

    let err = service
        .update_project(
            &owner,
            id,
            ProjectChanges {
                application_id: Some(9_999),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Validation { ref field, .. } if field == "application"));

    let err = service
        .update_project(
            &owner,
            id,
            ProjectChanges {
                tag_ids: Some(vec![9_999]),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Validation { ref field, .. } if field == "tags"));

    let project = service.get_project(&owner, id).await.unwrap().project;
    assert!(project.modified_date_history.is_empty());
    println!("✓ Invalid references rejected without side effects");
}

// ===== Filters =====

#[tokio::test]
async fn test_project_filters() {
    print_test_header(
        "test_project_filters",
        &[
            "tags keeps projects with any listed tag",
            "applications keeps projects for any listed application",
            "Both filters combine; results are newest first without duplicates",
        ],
    );

    let (service, _, _) = mock_service();
    let scratch = seed_application(&service, "Scratch").await;
    let tinkercad = seed_application(&service, "Tinkercad").await;
    let games = seed_tag(&service, "games").await;
    let math = seed_tag(&service, "math").await;
    let owner = seed_user(&service, "alice").await;

    let both = seed_project(&service, &owner, "Both", scratch, vec![games, math]).await;
    let only_math = seed_project(&service, &owner, "Math", tinkercad, vec![math]).await;
    let untagged = seed_project(&service, &owner, "Plain", scratch, vec![]).await;

    let ids = |projects: Vec<project_catalog::Project>| {
        projects.into_iter().map(|p| p.id).collect::<Vec<_>>()
    };

    let all = service
        .list_projects(&owner, &ProjectFilter::default())
        .await
        .unwrap();
    assert_eq!(ids(all), vec![untagged, only_math, both]);

    let filter = ProjectFilter::from_params(Some(&format!("{},{}", games, math)), None).unwrap();
    let tagged = service.list_projects(&owner, &filter).await.unwrap();
    assert_eq!(ids(tagged), vec![only_math, both]);

    let filter = ProjectFilter::from_params(None, Some(&scratch.to_string())).unwrap();
    let by_app = service.list_projects(&owner, &filter).await.unwrap();
    assert_eq!(ids(by_app), vec![untagged, both]);

    let filter =
        ProjectFilter::from_params(Some(&math.to_string()), Some(&tinkercad.to_string())).unwrap();
    let combined = service.list_projects(&owner, &filter).await.unwrap();
    assert_eq!(ids(combined), vec![only_math]);
    println!("✓ Filters applied");
}

#[tokio::test]
async fn test_assigned_only_tags() {
    print_test_header(
        "test_assigned_only_tags",
        &["assigned_only lists each used tag once, ordered by name descending"],
    );

    let (service, _, _) = mock_service();
    let app = seed_application(&service, "Scratch").await;
    let games = seed_tag(&service, "games").await;
    let math = seed_tag(&service, "math").await;
    seed_tag(&service, "unused").await;
    let owner = seed_user(&service, "alice").await;
    seed_project(&service, &owner, "One", app, vec![games, math]).await;
    seed_project(&service, &owner, "Two", app, vec![games]).await;

    let names = |tags: Vec<project_catalog::Tag>| {
        tags.into_iter().map(|t| t.name).collect::<Vec<_>>()
    };

    let all = service.list_tags(TagFilter::default()).await.unwrap();
    assert_eq!(names(all), vec!["unused", "math", "games"]);

    let assigned = service
        .list_tags(TagFilter::from_param(Some("1")).unwrap())
        .await
        .unwrap();
    assert_eq!(names(assigned), vec!["math", "games"]);

    let off = service
        .list_tags(TagFilter::from_param(Some("0")).unwrap())
        .await
        .unwrap();
    assert_eq!(off.len(), 3);
    println!("✓ assigned_only de-duplicated");
}

// ===== Permissions and scoping =====

#[tokio::test]
async fn test_catalog_writes_require_staff() {
    print_test_header(
        "test_catalog_writes_require_staff",
        &[
            "Anonymous writes are unauthenticated",
            "Regular users are forbidden; staff may write",
        ],
    );

    let (service, _, _) = mock_service();
    let user = seed_user(&service, "alice").await;
    let tool = || NewTool {
        name: "Blockly".to_string(),
    };

    let err = service
        .create_tool(&Principal::Anonymous, tool())
        .await
        .unwrap_err();
    assert_eq!(err, CatalogError::Unauthenticated);

    let err = service.create_tool(&user, tool()).await.unwrap_err();
    assert_eq!(err, CatalogError::Forbidden);

    let created = service.create_tool(&STAFF, tool()).await.unwrap();
    assert_eq!(created.name, "Blockly");

    // Reads are public
    assert_eq!(service.list_tools().await.unwrap().len(), 1);
    println!("✓ Catalog writes gated on staff");
}

#[tokio::test]
async fn test_projects_are_scoped_to_owner() {
    print_test_header(
        "test_projects_are_scoped_to_owner",
        &[
            "Another user's project behaves as missing",
            "Anonymous callers are unauthenticated, staff get no bypass",
        ],
    );

    let (service, _, _) = mock_service();
    let app = seed_application(&service, "Scratch").await;
    let alice = seed_user(&service, "alice").await;
    let bob = seed_user(&service, "bob").await;
    let id = seed_project(&service, &alice, "Cool Project", app, vec![]).await;

    let err = service.get_project(&bob, id).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));
    let err = service.get_project(&STAFF, id).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));

    let err = service
        .update_project(
            &bob,
            id,
            ProjectChanges {
                application_id: Some(9_999),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));

    let err = service.delete_project(&bob, id).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));

    let err = service
        .list_projects(&Principal::Anonymous, &ProjectFilter::default())
        .await
        .unwrap_err();
    assert_eq!(err, CatalogError::Unauthenticated);

    assert!(service
        .list_projects(&bob, &ProjectFilter::default())
        .await
        .unwrap()
        .is_empty());
    service.delete_project(&alice, id).await.unwrap();
    println!("✓ Projects visible to their owner only");
}

#[tokio::test]
async fn test_deleting_user_keeps_projects_without_owner() {
    print_test_header(
        "test_deleting_user_keeps_projects_without_owner",
        &["Projects survive their owner with owner set to none"],
    );

    let (service, store, _) = mock_service();
    let app = seed_application(&service, "Scratch").await;
    let alice = seed_user(&service, "alice").await;
    let id = seed_project(&service, &alice, "Cool Project", app, vec![]).await;
    let Principal::Authenticated(actor) = alice else {
        panic!("seeded user is authenticated");
    };

    let bob = seed_user(&service, "bob").await;
    let err = service.delete_user(&bob, actor.user_id).await.unwrap_err();
    assert_eq!(err, CatalogError::Forbidden);

    service.delete_user(&alice, actor.user_id).await.unwrap();
    store.print_projects("after owner deletion");

    let project = store.projects.read().get(&id).cloned().unwrap();
    assert_eq!(project.owner_id, None);
    assert!(store.users.read().get(&actor.user_id).is_none());
    println!("✓ Project kept with no owner");
}

// ===== Uploads =====

#[tokio::test]
async fn test_project_uploads() {
    print_test_header(
        "test_project_uploads",
        &[
            "Thumbnails must be images",
            "A successful upload is an update event",
        ],
    );

    let (service, _, media) = mock_service();
    let app = seed_application(&service, "Scratch").await;
    let owner = seed_user(&service, "alice").await;
    let id = seed_project(&service, &owner, "Cool Project", app, vec![]).await;

    let text = Some(UploadedFile {
        file_name: Some("notes.txt".to_string()),
        contents: Bytes::from_static(b"just some text"),
    });
    let err = service
        .upload_project_file(&owner, id, UploadKind::ProjectThumbnail, text.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Validation { ref field, .. } if field == "thumbnail"));

    let err = service
        .upload_project_file(&owner, id, UploadKind::ProjectData, None)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Validation { ref field, .. } if field == "data"));
    assert!(media.stored.read().is_empty());

    let project = service
        .upload_project_file(&owner, id, UploadKind::ProjectThumbnail, png_file())
        .await
        .unwrap();
    assert_eq!(project.thumbnail, "uploads/project/file-1.png");
    assert_eq!(project.modified_thumbnail_history, vec!["thumb-v0"]);

    let project = service
        .upload_project_file(&owner, id, UploadKind::ProjectData, text)
        .await
        .unwrap();
    assert_eq!(project.data, "uploads/project/file-2.txt");
    assert_eq!(
        project.modified_thumbnail_history,
        vec!["thumb-v0", "uploads/project/file-1.png"]
    );
    println!("✓ Uploads validated and recorded");
}

#[tokio::test]
async fn test_upload_failures_leave_project_untouched() {
    print_test_header(
        "test_upload_failures_leave_project_untouched",
        &[
            "Uploading to a missing project stores nothing",
            "A storage failure surfaces as a storage error",
        ],
    );

    let (service, _, media) = mock_service();
    let app = seed_application(&service, "Scratch").await;
    let owner = seed_user(&service, "alice").await;
    let id = seed_project(&service, &owner, "Cool Project", app, vec![]).await;

    let err = service
        .upload_project_file(&owner, 9_999, UploadKind::ProjectThumbnail, png_file())
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));
    assert!(media.stored.read().is_empty());

    media.fail_writes();
    let err = service
        .upload_project_file(&owner, id, UploadKind::ProjectThumbnail, png_file())
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Storage { .. }));

    let project = service.get_project(&owner, id).await.unwrap().project;
    assert_eq!(project.thumbnail, "thumb-v0");
    assert!(project.modified_date_history.is_empty());
    println!("✓ Failed uploads change nothing");
}

#[tokio::test]
async fn test_software_upload_is_staff_only() {
    print_test_header(
        "test_software_upload_is_staff_only",
        &["Only staff replace a software default file"],
    );

    let (service, _, _) = mock_service();
    let app = seed_application(&service, "Scratch").await;
    let user = seed_user(&service, "alice").await;
    let software = service
        .create_software(
            &STAFF,
            NewSoftware {
                name: "Scratch Desktop".to_string(),
                tool_id: None,
                default_file: String::new(),
                application_id: app,
                description: String::new(),
            },
        )
        .await
        .unwrap();

    let file = Some(UploadedFile {
        file_name: Some("template.sb3".to_string()),
        contents: Bytes::from_static(b"PK\x03\x04"),
    });
    let err = service
        .upload_software_file(&user, software.id, file.clone())
        .await
        .unwrap_err();
    assert_eq!(err, CatalogError::Forbidden);

    let updated = service
        .upload_software_file(&STAFF, software.id, file)
        .await
        .unwrap();
    assert_eq!(updated.default_file, "uploads/software/file-1.sb3");
    println!("✓ Software upload gated on staff");
}

// ===== Catalog integrity =====

#[tokio::test]
async fn test_referenced_application_cannot_be_deleted() {
    print_test_header(
        "test_referenced_application_cannot_be_deleted",
        &["Deleting an application still used by a project is a conflict"],
    );

    let (service, _, _) = mock_service();
    let app = seed_application(&service, "Scratch").await;
    let spare = seed_application(&service, "Spare").await;
    let owner = seed_user(&service, "alice").await;
    seed_project(&service, &owner, "Cool Project", app, vec![]).await;

    let err = service.delete_application(&STAFF, app).await.unwrap_err();
    assert!(matches!(err, CatalogError::Conflict { .. }));

    service.delete_application(&STAFF, spare).await.unwrap();
    let err = service.get_application(spare).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));
    println!("✓ Referenced application kept");
}

#[tokio::test]
async fn test_duplicate_names_are_validation_errors() {
    print_test_header(
        "test_duplicate_names_are_validation_errors",
        &["Unique catalog fields report the offending field"],
    );

    let (service, _, _) = mock_service();
    let app = seed_application(&service, "Scratch").await;
    seed_application(&service, "Tinkercad").await;

    seed_tag(&service, "games").await;
    let err = service
        .create_tag(
            &STAFF,
            NewTag {
                name: "games".to_string(),
                description: "again".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Validation { ref field, .. } if field == "name"));

    let err = service
        .update_application(
            &STAFF,
            app,
            ApplicationChanges {
                name: Some("Tinkercad".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Validation { ref field, .. } if field == "name"));

    // Renaming to its own name is not a duplicate
    let same = service
        .update_application(
            &STAFF,
            app,
            ApplicationChanges {
                name: Some("Scratch".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(same.name, "Scratch");
    println!("✓ Duplicates rejected");
}

// ===== Accounts =====

#[tokio::test]
async fn test_token_lifecycle() {
    print_test_header(
        "test_token_lifecycle",
        &[
            "A registered user exchanges credentials for a token",
            "The token authenticates; bad credentials and garbage tokens do not",
        ],
    );

    let (service, _, _) = mock_service();
    let user = service
        .register_user("alice@Example.COM", "alice", "testpass123", "Alice")
        .await
        .unwrap();
    assert_eq!(user.email, "alice@example.com");
    assert!(!user.is_staff);

    let token = service.obtain_token("alice", "testpass123").await.unwrap();
    let principal = service.authenticate(&token).await.unwrap();
    assert_eq!(principal, Principal::user(user.id));
    assert_eq!(service.current_user(&principal).await.unwrap().id, user.id);

    let err = service.obtain_token("alice", "wrong-pass").await.unwrap_err();
    assert!(
        matches!(err, CatalogError::Validation { ref field, .. } if field == "non_field_errors")
    );

    let err = service.authenticate("not-a-token").await.unwrap_err();
    assert_eq!(err, CatalogError::Unauthenticated);

    let err = service
        .register_user("other@example.com", "alice", "testpass123", "")
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Validation { ref field, .. } if field == "username"));
    println!("✓ Tokens issued and verified");
}

#[tokio::test]
async fn test_update_current_user_changes_password() {
    print_test_header(
        "test_update_current_user_changes_password",
        &["The new password works and the old one stops working"],
    );

    let (service, _, _) = mock_service();
    let alice = seed_user(&service, "alice").await;

    let updated = service
        .update_current_user(&alice, None, Some("Alice A."), Some("new-secret"))
        .await
        .unwrap();
    assert_eq!(updated.name, "Alice A.");

    assert!(service.obtain_token("alice", "testpass123").await.is_err());
    assert!(service.obtain_token("alice", "new-secret").await.is_ok());

    let err = service
        .update_current_user(&Principal::Anonymous, Some("x@example.com"), None, None)
        .await
        .unwrap_err();
    assert_eq!(err, CatalogError::Unauthenticated);
    println!("✓ Profile updated");
}

#[tokio::test]
async fn test_unknown_username_fails_like_wrong_password() {
    print_test_header(
        "test_unknown_username_fails_like_wrong_password",
        &["A missing account and a bad password produce the same error"],
    );

    let (service, _, _) = mock_service();
    seed_user(&service, "alice").await;

    let wrong_password = service.obtain_token("alice", "wrong-pass").await.unwrap_err();
    let unknown_user = service.obtain_token("nobody", "testpass123").await.unwrap_err();
    assert_eq!(unknown_user, wrong_password);
    assert!(
        matches!(unknown_user, CatalogError::Validation { ref field, .. } if field == "non_field_errors")
    );
    println!("✓ Unknown usernames are indistinguishable");
}

#[tokio::test]
async fn test_login_does_not_stall_other_requests() {
    print_test_header(
        "test_login_does_not_stall_other_requests",
        &[
            "Password hashing runs off the async workers",
            "On a single-threaded runtime a pending login leaves room for other calls",
        ],
    );

    let config = project_catalog::Config {
        password_iterations: 50_000,
        ..test_config(PathBuf::from("unused"))
    };
    let (service, _, _) = mock_service_with(config);
    let service = Arc::new(service);
    seed_tag(&service, "python").await;
    seed_user(&service, "alice").await;

    let login = tokio::spawn({
        let service = service.clone();
        async move { service.obtain_token("alice", "testpass123").await }
    });
    // let the login task start its key derivation
    tokio::task::yield_now().await;

    let tags = service.list_tags(TagFilter::default()).await.unwrap();
    assert_eq!(tags.len(), 1);
    assert!(!login.is_finished(), "login finished before the concurrent call ran");

    let token = login.await.unwrap().unwrap();
    assert!(service.authenticate(&token).await.is_ok());
    println!("✓ Concurrent call served during login");
}
