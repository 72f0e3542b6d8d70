//! Common test utilities: in-memory repositories and an HTTP test harness

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use project_catalog::domain::Service;
use project_catalog::{CatalogModule, Config};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const PNG: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13, b'I', b'H', b'D', b'R',
];

pub fn print_test_header(test_name: &str, purpose: &[&str]) {
    println!("\n🧪 TEST: {}", test_name);
    if let Some(first) = purpose.first() {
        println!("📋 PURPOSE: {}", first);
    }
    for line in purpose.iter().skip(1) {
        println!("   {}", line);
    }
}

/// Module config with cheap password hashing
pub fn test_config(media_root: PathBuf) -> Config {
    Config {
        media_root,
        password_iterations: 1_000,
        token_secret: "integration-test-secret-0123456789abcdef".to_string(),
        ..Config::default()
    }
}

/// Service over in-memory repositories and media storage
pub fn mock_service() -> (Service, Arc<mocks::MockCatalog>, Arc<mocks::MockMediaStorage>) {
    mock_service_with(test_config(PathBuf::from("unused")))
}

pub fn mock_service_with(
    config: Config,
) -> (Service, Arc<mocks::MockCatalog>, Arc<mocks::MockMediaStorage>) {
    let store = Arc::new(mocks::MockCatalog::new());
    let media = Arc::new(mocks::MockMediaStorage::new());
    let service = Service::new(store.repositories(), media.clone(), &config);
    (service, store, media)
}

pub mod mocks {
    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::{DateTime, Utc};
    use parking_lot::RwLock;
    use project_catalog::contract::*;
    use project_catalog::domain::filter::{ProjectFilter, TagFilter};
    use project_catalog::domain::history;
    use project_catalog::domain::repository::*;
    use project_catalog::domain::upload::{MediaStorage, UploadKind};
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
    use std::sync::Arc;

    /// All catalog tables in memory; implements every repository trait
    pub struct MockCatalog {
        next_id: AtomicI32,
        pub users: RwLock<BTreeMap<i32, User>>,
        pub tags: RwLock<BTreeMap<i32, Tag>>,
        pub applications: RwLock<BTreeMap<i32, Application>>,
        pub tools: RwLock<BTreeMap<i32, Tool>>,
        pub softwares: RwLock<BTreeMap<i32, Software>>,
        pub projects: RwLock<BTreeMap<i32, Project>>,
    }

    impl MockCatalog {
        pub fn new() -> Self {
            Self {
                next_id: AtomicI32::new(1),
                users: RwLock::new(BTreeMap::new()),
                tags: RwLock::new(BTreeMap::new()),
                applications: RwLock::new(BTreeMap::new()),
                tools: RwLock::new(BTreeMap::new()),
                softwares: RwLock::new(BTreeMap::new()),
                projects: RwLock::new(BTreeMap::new()),
            }
        }

        pub fn repositories(self: &Arc<Self>) -> Repositories {
            Repositories {
                users: self.clone(),
                tags: self.clone(),
                applications: self.clone(),
                tools: self.clone(),
                softwares: self.clone(),
                projects: self.clone(),
            }
        }

        fn next_id(&self) -> i32 {
            self.next_id.fetch_add(1, Ordering::SeqCst)
        }

        /// Print verbose information about stored projects
        pub fn print_projects(&self, context: &str) {
            let projects = self.projects.read();
            println!("\n========== Projects: {} ==========", context);
            if projects.is_empty() {
                println!("  (empty)");
            }
            for project in projects.values() {
                println!(
                    "  #{} '{}' owner={:?} app={} tags={:?} revisions={}",
                    project.id,
                    project.title,
                    project.owner_id,
                    project.application_id,
                    project.tag_ids,
                    project.modified_date_history.len()
                );
            }
            println!("==================================\n");
        }
    }

    impl Default for MockCatalog {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl UserRepository for MockCatalog {
        async fn create(&self, user: &NewUser) -> anyhow::Result<User> {
            let created = User {
                id: self.next_id(),
                email: user.email.clone(),
                username: user.username.clone(),
                name: user.name.clone(),
                password_hash: user.password_hash.clone(),
                date_joined: Utc::now(),
                is_active: true,
                is_staff: user.is_staff,
                is_superuser: user.is_superuser,
            };
            self.users.write().insert(created.id, created.clone());
            Ok(created)
        }

        async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<User>> {
            Ok(self.users.read().get(&id).cloned())
        }

        async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
            Ok(self
                .users
                .read()
                .values()
                .find(|u| u.username == username)
                .cloned())
        }

        async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
            Ok(self.users.read().values().find(|u| u.email == email).cloned())
        }

        async fn update(&self, id: i32, changes: &UserChanges) -> anyhow::Result<Option<User>> {
            let mut users = self.users.write();
            let Some(user) = users.get_mut(&id) else {
                return Ok(None);
            };
            if let Some(email) = &changes.email {
                user.email = email.clone();
            }
            if let Some(name) = &changes.name {
                user.name = name.clone();
            }
            if let Some(password_hash) = &changes.password_hash {
                user.password_hash = password_hash.clone();
            }
            Ok(Some(user.clone()))
        }

        async fn delete(&self, id: i32) -> anyhow::Result<bool> {
            for project in self.projects.write().values_mut() {
                if project.owner_id == Some(id) {
                    project.owner_id = None;
                }
            }
            Ok(self.users.write().remove(&id).is_some())
        }
    }

    #[async_trait]
    impl TagRepository for MockCatalog {
        async fn create(&self, tag: &NewTag) -> anyhow::Result<Tag> {
            let created = Tag {
                id: self.next_id(),
                name: tag.name.clone(),
                description: tag.description.clone(),
            };
            self.tags.write().insert(created.id, created.clone());
            Ok(created)
        }

        async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Tag>> {
            Ok(self.tags.read().values().find(|t| t.name == name).cloned())
        }

        async fn find_many(&self, ids: &[i32]) -> anyhow::Result<Vec<Tag>> {
            let tags = self.tags.read();
            Ok(tags
                .values()
                .filter(|t| ids.contains(&t.id))
                .cloned()
                .collect())
        }

        async fn list(&self, filter: TagFilter) -> anyhow::Result<Vec<Tag>> {
            let projects = self.projects.read();
            let mut tags: Vec<Tag> = self
                .tags
                .read()
                .values()
                .filter(|t| {
                    !filter.assigned_only
                        || projects.values().any(|p| p.tag_ids.contains(&t.id))
                })
                .cloned()
                .collect();
            tags.sort_by(|a, b| b.name.cmp(&a.name));
            Ok(tags)
        }
    }

    #[async_trait]
    impl ApplicationRepository for MockCatalog {
        async fn create(&self, application: &NewApplication) -> anyhow::Result<Application> {
            let created = Application {
                id: self.next_id(),
                name: application.name.clone(),
                link: application.link.clone(),
                description: application.description.clone(),
            };
            self.applications.write().insert(created.id, created.clone());
            Ok(created)
        }

        async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Application>> {
            Ok(self.applications.read().get(&id).cloned())
        }

        async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Application>> {
            Ok(self
                .applications
                .read()
                .values()
                .find(|a| a.name == name)
                .cloned())
        }

        async fn find_by_link(&self, link: &str) -> anyhow::Result<Option<Application>> {
            Ok(self
                .applications
                .read()
                .values()
                .find(|a| a.link == link)
                .cloned())
        }

        async fn list(&self) -> anyhow::Result<Vec<Application>> {
            Ok(self.applications.read().values().rev().cloned().collect())
        }

        async fn update(
            &self,
            id: i32,
            changes: &ApplicationChanges,
        ) -> anyhow::Result<Option<Application>> {
            let mut applications = self.applications.write();
            let Some(application) = applications.get_mut(&id) else {
                return Ok(None);
            };
            if let Some(name) = &changes.name {
                application.name = name.clone();
            }
            if let Some(link) = &changes.link {
                application.link = link.clone();
            }
            if let Some(description) = &changes.description {
                application.description = description.clone();
            }
            Ok(Some(application.clone()))
        }

        async fn delete(&self, id: i32) -> anyhow::Result<bool> {
            Ok(self.applications.write().remove(&id).is_some())
        }

        async fn is_referenced(&self, id: i32) -> anyhow::Result<bool> {
            let by_software = self
                .softwares
                .read()
                .values()
                .any(|s| s.application_id == id);
            let by_project = self
                .projects
                .read()
                .values()
                .any(|p| p.application_id == id);
            Ok(by_software || by_project)
        }
    }

    #[async_trait]
    impl ToolRepository for MockCatalog {
        async fn create(&self, tool: &NewTool) -> anyhow::Result<Tool> {
            let created = Tool {
                id: self.next_id(),
                name: tool.name.clone(),
            };
            self.tools.write().insert(created.id, created.clone());
            Ok(created)
        }

        async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Tool>> {
            Ok(self.tools.read().get(&id).cloned())
        }

        async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Tool>> {
            Ok(self.tools.read().values().find(|t| t.name == name).cloned())
        }

        async fn list(&self) -> anyhow::Result<Vec<Tool>> {
            Ok(self.tools.read().values().rev().cloned().collect())
        }

        async fn update(&self, id: i32, changes: &ToolChanges) -> anyhow::Result<Option<Tool>> {
            let mut tools = self.tools.write();
            let Some(tool) = tools.get_mut(&id) else {
                return Ok(None);
            };
            if let Some(name) = &changes.name {
                tool.name = name.clone();
            }
            Ok(Some(tool.clone()))
        }

        async fn delete(&self, id: i32) -> anyhow::Result<bool> {
            Ok(self.tools.write().remove(&id).is_some())
        }

        async fn is_referenced(&self, id: i32) -> anyhow::Result<bool> {
            let by_software = self
                .softwares
                .read()
                .values()
                .any(|s| s.tool_id == Some(id));
            let by_project = self
                .projects
                .read()
                .values()
                .any(|p| p.tool_id == Some(id));
            Ok(by_software || by_project)
        }
    }

    #[async_trait]
    impl SoftwareRepository for MockCatalog {
        async fn create(&self, software: &NewSoftware) -> anyhow::Result<Software> {
            let created = Software {
                id: self.next_id(),
                name: software.name.clone(),
                tool_id: software.tool_id,
                default_file: software.default_file.clone(),
                application_id: software.application_id,
                description: software.description.clone(),
            };
            self.softwares.write().insert(created.id, created.clone());
            Ok(created)
        }

        async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Software>> {
            Ok(self.softwares.read().get(&id).cloned())
        }

        async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Software>> {
            Ok(self
                .softwares
                .read()
                .values()
                .find(|s| s.name == name)
                .cloned())
        }

        async fn list(&self) -> anyhow::Result<Vec<Software>> {
            Ok(self.softwares.read().values().rev().cloned().collect())
        }

        async fn update(
            &self,
            id: i32,
            changes: &SoftwareChanges,
        ) -> anyhow::Result<Option<Software>> {
            let mut softwares = self.softwares.write();
            let Some(software) = softwares.get_mut(&id) else {
                return Ok(None);
            };
            if let Some(name) = &changes.name {
                software.name = name.clone();
            }
            if let Some(tool_id) = changes.tool_id {
                software.tool_id = tool_id;
            }
            if let Some(default_file) = &changes.default_file {
                software.default_file = default_file.clone();
            }
            if let Some(application_id) = changes.application_id {
                software.application_id = application_id;
            }
            if let Some(description) = &changes.description {
                software.description = description.clone();
            }
            Ok(Some(software.clone()))
        }

        async fn delete(&self, id: i32) -> anyhow::Result<bool> {
            Ok(self.softwares.write().remove(&id).is_some())
        }
    }

    #[async_trait]
    impl ProjectRepository for MockCatalog {
        async fn create(
            &self,
            owner_id: i32,
            project: &NewProject,
            now: DateTime<Utc>,
        ) -> anyhow::Result<Project> {
            let created = Project {
                id: self.next_id(),
                owner_id: Some(owner_id),
                title: project.title.clone(),
                application_id: project.application_id,
                tool_id: project.tool_id,
                data: project.data.clone(),
                thumbnail: project.thumbnail.clone(),
                description: project.description.clone(),
                created_at: now,
                modified_at: now,
                tag_ids: project.tag_ids.clone(),
                modified_date_history: Vec::new(),
                modified_data_history: Vec::new(),
                modified_thumbnail_history: Vec::new(),
            };
            self.projects.write().insert(created.id, created.clone());
            Ok(created)
        }

        async fn find_owned(&self, id: i32, owner_id: i32) -> anyhow::Result<Option<Project>> {
            Ok(self
                .projects
                .read()
                .get(&id)
                .filter(|p| p.owner_id == Some(owner_id))
                .cloned())
        }

        async fn list_owned(
            &self,
            owner_id: i32,
            filter: &ProjectFilter,
        ) -> anyhow::Result<Vec<Project>> {
            Ok(self
                .projects
                .read()
                .values()
                .rev()
                .filter(|p| p.owner_id == Some(owner_id) && filter.matches(p))
                .cloned()
                .collect())
        }

        async fn update_owned(
            &self,
            id: i32,
            owner_id: i32,
            changes: ProjectChanges,
            now: DateTime<Utc>,
        ) -> anyhow::Result<Option<Project>> {
            let mut projects = self.projects.write();
            let Some(project) = projects
                .get_mut(&id)
                .filter(|p| p.owner_id == Some(owner_id))
            else {
                return Ok(None);
            };
            history::apply_update(project, changes, now);
            Ok(Some(project.clone()))
        }

        async fn delete_owned(&self, id: i32, owner_id: i32) -> anyhow::Result<bool> {
            let mut projects = self.projects.write();
            if projects.get(&id).is_some_and(|p| p.owner_id == Some(owner_id)) {
                projects.remove(&id);
                return Ok(true);
            }
            Ok(false)
        }
    }

    /// Media storage that keeps references in memory
    pub struct MockMediaStorage {
        pub stored: RwLock<Vec<String>>,
        pub removed: RwLock<Vec<String>>,
        fail: AtomicBool,
    }

    impl MockMediaStorage {
        pub fn new() -> Self {
            Self {
                stored: RwLock::new(Vec::new()),
                removed: RwLock::new(Vec::new()),
                fail: AtomicBool::new(false),
            }
        }

        /// Make every following `store` call fail
        pub fn fail_writes(&self) {
            self.fail.store(true, Ordering::SeqCst);
        }
    }

    impl Default for MockMediaStorage {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl MediaStorage for MockMediaStorage {
        async fn store(
            &self,
            kind: UploadKind,
            extension: &str,
            _contents: Bytes,
        ) -> anyhow::Result<String> {
            if self.fail.load(Ordering::SeqCst) {
                anyhow::bail!("disk full");
            }
            let mut stored = self.stored.write();
            let reference = format!(
                "uploads/{}/file-{}{}",
                kind.directory(),
                stored.len() + 1,
                extension
            );
            stored.push(reference.clone());
            Ok(reference)
        }

        async fn remove(&self, reference: &str) -> anyhow::Result<()> {
            self.removed.write().push(reference.to_string());
            Ok(())
        }
    }
}

// ===== HTTP harness =====

/// Router over a migrated SQLite database in a temporary directory
pub struct TestApp {
    pub router: Router,
    pub module: CatalogModule,
    pub db: DatabaseConnection,
    pub dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("catalog.db").display());
        let db = sea_orm::Database::connect(&url).await.unwrap();
        CatalogModule::migrate(&db).await.unwrap();

        let module =
            CatalogModule::init(db.clone(), test_config(dir.path().join("media"))).unwrap();
        let router = module.register_rest(Router::new());
        Self {
            router,
            module,
            db,
            dir,
        }
    }

    pub fn media_root(&self) -> PathBuf {
        self.dir.path().join("media")
    }

    /// Send a JSON request; the response body is parsed as JSON (`Null` when empty)
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    /// Send a single-part multipart upload
    pub async fn upload(
        &self,
        uri: &str,
        token: Option<&str>,
        field: &str,
        file_name: Option<&str>,
        contents: &[u8],
    ) -> (StatusCode, Value) {
        const BOUNDARY: &str = "catalog-test-boundary";

        let disposition = match file_name {
            Some(file_name) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n",
                field, file_name
            ),
            None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", field),
        };
        let mut body = format!("--{}\r\n{}\r\n", BOUNDARY, disposition).into_bytes();
        body.extend_from_slice(contents);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        let mut builder = Request::builder().method(Method::POST).uri(uri).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    /// Register a regular user over HTTP and log in; returns (user id, token)
    pub async fn user(&self, username: &str) -> (i32, String) {
        let (status, user) = self
            .request(
                Method::POST,
                "/api/v1/users",
                None,
                Some(serde_json::json!({
                    "email": format!("{}@example.com", username),
                    "username": username,
                    "password": "testpass123",
                    "name": username,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register {}: {}", username, user);
        let id = user["id"].as_i64().unwrap() as i32;
        (id, self.token(username).await)
    }

    /// Create a staff user through the service and log in; returns (user id, token)
    pub async fn staff(&self, username: &str) -> (i32, String) {
        let user = self
            .module
            .service()
            .create_staff_user(
                &format!("{}@example.com", username),
                username,
                "testpass123",
                username,
            )
            .await
            .unwrap();
        (user.id, self.token(username).await)
    }

    async fn token(&self, username: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/v1/users/token",
                None,
                Some(serde_json::json!({"username": username, "password": "testpass123"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "token for {}: {}", username, body);
        body["token"].as_str().unwrap().to_string()
    }
}
