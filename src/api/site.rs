//! Landing-site composition endpoints.

use actix_web::{HttpResponse, web};

use crate::config::{Config, ContactSettings};
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::site::HOME_LATEST_ARTICLES;
use crate::models::{HomeResponse, ListArticlesQuery, SiteStats};

/// Everything the home page shows in one round trip.
#[utoipa::path(
    get,
    path = "/api/v1/site/home",
    tag = "Site",
    responses(
        (status = 200, description = "Home page data", body = HomeResponse),
    )
)]
pub async fn home(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let query = ListArticlesQuery {
        limit: Some(HOME_LATEST_ARTICLES),
        ..Default::default()
    };
    let (articles, _, _) = pool.list_articles(&query, true).await?;
    let latest_articles = pool.article_summaries(&articles).await?;

    let tags = pool.list_tags_with_counts().await?;

    let stats = SiteStats {
        employees: pool.count_employees().await?,
        subjects: pool.count_subjects().await?,
        published_articles: pool.count_published_articles().await?,
    };

    Ok(HttpResponse::Ok().json(HomeResponse {
        latest_articles,
        tags,
        stats,
    }))
}

/// Department contact details.
#[utoipa::path(
    get,
    path = "/api/v1/site/contacts",
    tag = "Site",
    responses(
        (status = 200, description = "Contact details", body = ContactSettings),
    )
)]
pub async fn contacts(config: web::Data<Config>) -> HttpResponse {
    HttpResponse::Ok().json(&config.contacts)
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/site/home").route(web::get().to(home)))
        .service(web::resource("/site/contacts").route(web::get().to(contacts)));
}
