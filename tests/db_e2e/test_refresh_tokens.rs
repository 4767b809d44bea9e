//! Refresh token rotation against a real database.

use department_site::db::refresh_tokens::{generate_token, hash_token};
use department_site::models::Role;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_concurrent_consume_succeeds_once() {
    let Some(pool) = test_pool().await else { return };
    let user = create_user(&pool, Role::Editor).await;

    let hash = hash_token(&generate_token());
    pool.insert_refresh_token(user.id, &hash, 3600)
        .await
        .expect("insert token");

    let (first, second) = tokio::join!(
        pool.consume_refresh_token(&hash),
        pool.consume_refresh_token(&hash),
    );
    let winners: Vec<_> = [first.unwrap(), second.unwrap()]
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(winners, vec![user.id]);

    assert_eq!(pool.consume_refresh_token(&hash).await.unwrap(), None);
}

#[actix_rt::test]
async fn test_expired_token_is_not_consumed() {
    let Some(pool) = test_pool().await else { return };
    let user = create_user(&pool, Role::User).await;

    let hash = hash_token(&generate_token());
    pool.insert_refresh_token(user.id, &hash, 0)
        .await
        .expect("insert token");

    assert_eq!(pool.consume_refresh_token(&hash).await.unwrap(), None);
}

#[actix_rt::test]
async fn test_revoke_only_once() {
    let Some(pool) = test_pool().await else { return };
    let user = create_user(&pool, Role::User).await;

    let hash = hash_token(&generate_token());
    pool.insert_refresh_token(user.id, &hash, 3600)
        .await
        .expect("insert token");

    assert!(pool.revoke_refresh_token(&hash).await.unwrap());
    assert!(!pool.revoke_refresh_token(&hash).await.unwrap());
    assert_eq!(pool.consume_refresh_token(&hash).await.unwrap(), None);
}
