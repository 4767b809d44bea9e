//! Article handlers: the public news feed and dashboard management.

use actix_web::{HttpResponse, web};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::auth::SessionAuth;
use crate::db::DbPool;
use crate::db::articles::ArticleFields;
use crate::error::{AppError, AppResult};
use crate::models::{
    ARTICLE_SLUG_MAX_LEN, ArticleDetail, ArticleListResponse, ArticleRequest, ContentEvent,
    ContentEventMessage, ListArticlesQuery, MessageResponse, Resource, make_slug, non_blank,
};
use crate::services::EventBroadcaster;

/// Validate and normalize a request body into storable fields.
///
/// Checks that every tag exists and that the slug is free; `exclude` is the
/// article being updated.
async fn article_fields(
    pool: &DbPool,
    body: ArticleRequest,
    exclude: Option<Uuid>,
) -> AppResult<ArticleFields> {
    body.validate()?;

    let title = body.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::InvalidInput("Title cannot be blank".to_string()));
    }
    if body.content.trim().is_empty() {
        return Err(AppError::InvalidInput("Content cannot be empty".to_string()));
    }

    let slug = match non_blank(body.slug) {
        Some(explicit) => make_slug(&explicit, ARTICLE_SLUG_MAX_LEN),
        None => make_slug(&title, ARTICLE_SLUG_MAX_LEN),
    };
    if slug.is_empty() {
        return Err(AppError::InvalidInput(
            "Slug must contain at least one letter or digit".to_string(),
        ));
    }
    if pool.article_slug_taken(&slug, exclude).await? {
        return Err(AppError::Conflict(format!(
            "Article slug '{}' is already in use",
            slug
        )));
    }

    let tag_ids = crate::db::dedup_ids(&body.tag_ids);
    if pool.count_active_tags(&tag_ids).await? != tag_ids.len() as u64 {
        return Err(AppError::InvalidInput(
            "One or more tags do not exist".to_string(),
        ));
    }

    Ok(ArticleFields {
        title,
        slug,
        summary: non_blank(body.summary),
        content: body.content,
        cover_image_key: non_blank(body.cover_image_key),
        tag_ids,
        is_published: body.is_published,
    })
}

async fn article_detail(
    pool: &DbPool,
    article: crate::entity::article::Model,
) -> AppResult<ArticleDetail> {
    let mut summaries = pool.article_summaries(std::slice::from_ref(&article)).await?;
    let summary = summaries
        .pop()
        .ok_or_else(|| AppError::NotFound(format!("Article {}", article.id)))?;
    Ok(ArticleDetail {
        summary,
        content: article.content,
    })
}

async fn article_list(
    pool: &DbPool,
    query: &ListArticlesQuery,
    published_only: bool,
) -> AppResult<ArticleListResponse> {
    let (articles, total, page) = pool.list_articles(query, published_only).await?;
    let articles = pool.article_summaries(&articles).await?;
    Ok(ArticleListResponse {
        articles,
        total,
        limit: page.limit,
        offset: page.offset,
    })
}

// ============================================================================
// Public
// ============================================================================

/// List published articles, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/articles",
    tag = "Articles",
    params(ListArticlesQuery),
    responses(
        (status = 200, description = "Published articles", body = ArticleListResponse),
    )
)]
pub async fn list_published_articles(
    pool: web::Data<DbPool>,
    query: web::Query<ListArticlesQuery>,
) -> AppResult<HttpResponse> {
    let response = article_list(pool.get_ref(), &query, true).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Get a published article by slug.
#[utoipa::path(
    get,
    path = "/api/v1/articles/{slug}",
    tag = "Articles",
    params(
        ("slug" = String, Path, description = "Article slug")
    ),
    responses(
        (status = 200, description = "Article", body = ArticleDetail),
        (status = 404, description = "No published article with this slug", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_published_article(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let article = pool
        .get_published_article_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Article '{}'", slug)))?;

    Ok(HttpResponse::Ok().json(article_detail(pool.get_ref(), article).await?))
}

// ============================================================================
// Dashboard
// ============================================================================

/// List articles including drafts.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/articles",
    tag = "Dashboard",
    params(ListArticlesQuery),
    responses(
        (status = 200, description = "Articles", body = ArticleListResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Editor role required", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn list_articles(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    query: web::Query<ListArticlesQuery>,
) -> AppResult<HttpResponse> {
    auth.caller.require_editor()?;
    let response = article_list(pool.get_ref(), &query, false).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/articles/{id}",
    tag = "Dashboard",
    params(("id" = Uuid, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Article", body = ArticleDetail),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn get_article(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    auth.caller.require_editor()?;
    let id = path.into_inner();
    let article = pool
        .get_article(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Article {}", id)))?;

    Ok(HttpResponse::Ok().json(article_detail(pool.get_ref(), article).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/dashboard/articles",
    tag = "Dashboard",
    request_body = ArticleRequest,
    responses(
        (status = 201, description = "Article created", body = ArticleDetail),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Slug already in use", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn create_article(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    broadcaster: web::Data<EventBroadcaster>,
    body: web::Json<ArticleRequest>,
) -> AppResult<HttpResponse> {
    auth.caller.require_editor()?;

    let fields = article_fields(pool.get_ref(), body.into_inner(), None).await?;
    let article = pool.insert_article(fields, auth.caller.user_id).await?;

    info!(
        article_id = %article.id,
        slug = %article.slug,
        user = %auth.caller.username,
        "Article created"
    );
    broadcaster.send(ContentEventMessage::new(ContentEvent::created(
        Resource::Articles,
        article.id,
    )));

    Ok(HttpResponse::Created().json(article_detail(pool.get_ref(), article).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/dashboard/articles/{id}",
    tag = "Dashboard",
    params(("id" = Uuid, Path, description = "Article ID")),
    request_body = ArticleRequest,
    responses(
        (status = 200, description = "Article updated", body = ArticleDetail),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Slug already in use", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn update_article(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    broadcaster: web::Data<EventBroadcaster>,
    path: web::Path<Uuid>,
    body: web::Json<ArticleRequest>,
) -> AppResult<HttpResponse> {
    auth.caller.require_editor()?;
    let id = path.into_inner();

    if pool.get_article(id).await?.is_none() {
        return Err(AppError::NotFound(format!("Article {}", id)));
    }

    let fields = article_fields(pool.get_ref(), body.into_inner(), Some(id)).await?;
    let article = pool.update_article(id, fields).await?;

    info!(article_id = %id, user = %auth.caller.username, "Article updated");
    broadcaster.send(ContentEventMessage::new(ContentEvent::updated(
        Resource::Articles,
        id,
    )));

    Ok(HttpResponse::Ok().json(article_detail(pool.get_ref(), article).await?))
}

async fn set_published(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    broadcaster: web::Data<EventBroadcaster>,
    id: Uuid,
    publish: bool,
) -> AppResult<HttpResponse> {
    auth.caller.require_editor()?;

    let article = pool.set_article_published(id, publish).await?;

    info!(
        article_id = %id,
        published = publish,
        user = %auth.caller.username,
        "Article publication changed"
    );
    broadcaster.send(ContentEventMessage::new(ContentEvent::updated(
        Resource::Articles,
        id,
    )));

    Ok(HttpResponse::Ok().json(article_detail(pool.get_ref(), article).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/dashboard/articles/{id}/publish",
    tag = "Dashboard",
    params(("id" = Uuid, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Article published", body = ArticleDetail),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn publish_article(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    broadcaster: web::Data<EventBroadcaster>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    set_published(auth, pool, broadcaster, path.into_inner(), true).await
}

#[utoipa::path(
    post,
    path = "/api/v1/dashboard/articles/{id}/unpublish",
    tag = "Dashboard",
    params(("id" = Uuid, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Article moved back to drafts", body = ArticleDetail),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn unpublish_article(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    broadcaster: web::Data<EventBroadcaster>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    set_published(auth, pool, broadcaster, path.into_inner(), false).await
}

#[utoipa::path(
    delete,
    path = "/api/v1/dashboard/articles/{id}",
    tag = "Dashboard",
    params(("id" = Uuid, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Article deleted", body = MessageResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    ),
    security(("session" = []))
)]
pub async fn delete_article(
    auth: SessionAuth,
    pool: web::Data<DbPool>,
    broadcaster: web::Data<EventBroadcaster>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    auth.caller.require_editor()?;
    let id = path.into_inner();

    if !pool.delete_article(id).await? {
        return Err(AppError::NotFound(format!("Article {}", id)));
    }

    info!(article_id = %id, user = %auth.caller.username, "Article deleted");
    broadcaster.send(ContentEventMessage::new(ContentEvent::deleted(
        Resource::Articles,
        id,
    )));

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Article deleted".to_string(),
        id,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/articles").route(web::get().to(list_published_articles)))
        .service(web::resource("/articles/{slug}").route(web::get().to(get_published_article)))
        .service(
            web::resource("/dashboard/articles")
                .route(web::get().to(list_articles))
                .route(web::post().to(create_article)),
        )
        .service(
            web::resource("/dashboard/articles/{id}")
                .route(web::get().to(get_article))
                .route(web::put().to(update_article))
                .route(web::delete().to(delete_article)),
        )
        .service(
            web::resource("/dashboard/articles/{id}/publish").route(web::post().to(publish_article)),
        )
        .service(
            web::resource("/dashboard/articles/{id}/unpublish")
                .route(web::post().to(unpublish_article)),
        );
}
