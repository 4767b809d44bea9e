//! Shared helpers: an app wired like `main.rs` minus the database and S3.

use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, test, web};
use chrono::Utc;
use department_site::auth::AdminKey;
use department_site::config::{
    Config, ContactSettings, Environment, GitHubOAuthSettings, StorageSettings,
};
use department_site::configure_api;
use department_site::models::{Role, User};
use department_site::services::EventBroadcaster;
use department_site::services::github_oauth::create_access_token;
use secrecy::SecretString;
use uuid::Uuid;

pub const TEST_ADMIN_KEY: &str = "integration-admin-key";
pub const TEST_SESSION_SECRET: &str = "integration-session-secret";

pub fn test_config() -> Config {
    Config {
        environment: Environment::Development,
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "postgres://unused".to_string(),
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
        contacts: ContactSettings {
            address: Some("1 University Ave, Room 402".to_string()),
            email: Some("office@dept.example.edu".to_string()),
            phone: None,
            hours: Some("Mon-Fri 9:00-17:00".to_string()),
        },
    }
}

pub async fn create_test_app(
    config: Config,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    let admin_key = AdminKey::new(config.admin_key.clone());
    test::init_service(
        App::new()
            .app_data(web::Data::new(config))
            .app_data(web::Data::new(admin_key))
            .app_data(web::Data::new(EventBroadcaster::new()))
            .configure(configure_api),
    )
    .await
}

/// A signed session token for a user that only exists in the token.
pub fn session_token(role: Role) -> String {
    let user = User {
        id: Uuid::now_v7(),
        github_id: 42,
        username: format!("{}-tester", role),
        display_name: None,
        avatar_url: None,
        email: None,
        role,
        last_login_at: None,
        created_at: Utc::now(),
    };
    create_access_token(&user, &SecretString::from(TEST_SESSION_SECRET.to_string()), 300)
        .expect("token should sign")
}
