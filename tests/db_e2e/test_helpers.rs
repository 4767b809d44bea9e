//! Shared helpers: a pooled app wired like `main.rs`, users and events.

use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, test, web};
use department_site::auth::AdminKey;
use department_site::config::{
    Config, ContactSettings, Environment, GitHubOAuthSettings, StorageSettings,
};
use department_site::configure_api;
use department_site::db::DbPool;
use department_site::db::users::GitHubProfile;
use department_site::models::{ContentEventMessage, Role, User};
use department_site::services::EventBroadcaster;
use department_site::services::github_oauth::create_access_token;
use secrecy::SecretString;
use serde_json::Value;
use tokio::sync::OnceCell;
use tokio::sync::broadcast::Receiver;
use uuid::Uuid;

pub const TEST_ADMIN_KEY: &str = "db-e2e-admin-key";
pub const TEST_SESSION_SECRET: &str = "db-e2e-session-secret";

static MIGRATIONS_RUN: OnceCell<()> = OnceCell::const_new();

fn test_config(database_url: String) -> Config {
    Config {
        environment: Environment::Development,
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url,
        static_dir: None,
        admin_key: Some(TEST_ADMIN_KEY.to_string()),
        max_upload_size: 1024 * 1024,
        public_url: "/".to_string(),
        github_oauth: GitHubOAuthSettings {
            enabled: false,
            client_id: None,
            client_secret: None,
            redirect_url: None,
            session_secret: SecretString::from(TEST_SESSION_SECRET.to_string()),
            access_token_ttl_secs: 900,
            refresh_token_ttl_secs: 3600,
        },
        storage: StorageSettings {
            endpoint: None,
            bucket: "unused".to_string(),
            region: "us-east-1".to_string(),
            access_key: "unused".to_string(),
            secret_key: SecretString::from("unused".to_string()),
        },
        contacts: ContactSettings::default(),
    }
}

/// Connect to `DATABASE_URL`, running migrations once per test binary.
/// `None` when no database is configured.
pub async fn test_pool() -> Option<DbPool> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL is not set; skipping database test");
        return None;
    };

    let pool = DbPool::new(&test_config(database_url))
        .await
        .expect("Failed to connect to database");

    MIGRATIONS_RUN
        .get_or_init(|| async {
            pool.run_migrations()
                .await
                .expect("Failed to run migrations");
        })
        .await;

    Some(pool)
}

pub async fn create_test_app(
    pool: &DbPool,
    broadcaster: &EventBroadcaster,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    let config = test_config(String::new());
    test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(AdminKey::new(config.admin_key.clone())))
            .app_data(web::Data::new(broadcaster.clone()))
            .app_data(web::Data::new(config))
            .configure(configure_api),
    )
    .await
}

/// Short random suffix so tests sharing one database never collide.
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, &Uuid::new_v4().simple().to_string()[..8])
}

/// Send a request and return the status and JSON body (`Null` when empty).
pub async fn send<S>(app: &S, req: test::TestRequest) -> (u16, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status().as_u16();
    let bytes = test::read_body(resp).await;
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Same as [`send`], authenticated with the bootstrap admin key.
pub async fn send_as_admin<S>(app: &S, req: test::TestRequest) -> (u16, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    send(app, req.insert_header(("X-Admin-Key", TEST_ADMIN_KEY))).await
}

/// Same as [`send`], authenticated with `user`'s session token.
pub async fn send_as<S>(app: &S, user: &User, req: test::TestRequest) -> (u16, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let token = create_access_token(
        user,
        &SecretString::from(TEST_SESSION_SECRET.to_string()),
        300,
    )
    .expect("token should sign");
    send(
        app,
        req.insert_header(("Authorization", format!("Bearer {}", token))),
    )
    .await
}

/// Create a GitHub-backed user and give it `role`.
pub async fn create_user(pool: &DbPool, role: Role) -> User {
    let username = unique("gh");
    let user = pool
        .upsert_user_from_github(GitHubProfile {
            github_id: (rand::random::<u32>() as i64) + 1_000_000,
            username: &username,
            display_name: None,
            avatar_url: None,
            email: None,
        })
        .await
        .expect("Failed to create user");

    let (_, user) = pool
        .change_user_role(user.id, role, |_, _| Ok(()))
        .await
        .expect("Failed to set role");
    user
}

/// Everything broadcast since the last call, as wire JSON.
pub fn drain_events(rx: &mut Receiver<ContentEventMessage>) -> Vec<Value> {
    let mut events = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        events.push(serde_json::to_value(&msg).expect("event serializes"));
    }
    events
}

/// `(resource, action, id)` of a `content_changed` event.
pub fn event_parts(event: &Value) -> (&str, &str, Option<&str>) {
    assert_eq!(event["type"], "content_changed");
    let payload = &event["payload"];
    (
        payload["resource"].as_str().unwrap_or_default(),
        payload["action"].as_str().unwrap_or_default(),
        payload["id"].as_str(),
    )
}
