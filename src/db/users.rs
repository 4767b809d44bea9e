//! Database operations for users.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entity::user::{self, ActiveModel, Entity as UserEntity};
use crate::error::{AppError, AppResult};
use crate::models::{ListUsersQuery, Page, Role, User, non_blank};

use super::{DbPool, like_pattern};

/// Profile fields copied from GitHub on every login.
#[derive(Debug, Clone)]
pub struct GitHubProfile<'a> {
    pub github_id: i64,
    pub username: &'a str,
    pub display_name: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
    pub email: Option<&'a str>,
}

impl DbPool {
    /// Find or create a user by GitHub ID. Updates profile on each login.
    ///
    /// The very first account becomes `admin` so a fresh install can be
    /// managed without the bootstrap key; everyone after starts as `user`.
    pub async fn upsert_user_from_github(&self, profile: GitHubProfile<'_>) -> AppResult<User> {
        let now = Utc::now();
        let existing = UserEntity::find()
            .filter(user::Column::GithubId.eq(profile.github_id))
            .filter(user::Column::DeletedAt.is_null())
            .one(self.connection())
            .await?;

        if let Some(m) = existing {
            let mut active: ActiveModel = m.into();
            active.username = Set(profile.username.to_string());
            active.display_name = Set(profile.display_name.map(str::to_string));
            active.avatar_url = Set(profile.avatar_url.map(str::to_string));
            active.email = Set(profile.email.map(str::to_string));
            active.last_login_at = Set(Some(now));
            active.updated_at = Set(now);
            let updated = active.update(self.connection()).await?;
            return Ok(updated.into());
        }

        let existing_users = UserEntity::find()
            .filter(user::Column::DeletedAt.is_null())
            .count(self.connection())
            .await?;
        let role = if existing_users == 0 {
            Role::Admin
        } else {
            Role::User
        };

        let model = ActiveModel {
            id: Set(Uuid::now_v7()),
            github_id: Set(profile.github_id),
            username: Set(profile.username.to_string()),
            display_name: Set(profile.display_name.map(str::to_string)),
            avatar_url: Set(profile.avatar_url.map(str::to_string)),
            email: Set(profile.email.map(str::to_string)),
            role: Set(role.as_str().to_string()),
            last_login_at: Set(Some(now)),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        let inserted = model.insert(self.connection()).await?;
        Ok(inserted.into())
    }

    /// Find an active user by ID.
    pub async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_null())
            .one(self.connection())
            .await?;

        Ok(result.map(User::from))
    }

    /// Find an active user by GitHub login (case-insensitive).
    pub async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::DeletedAt.is_null())
            .filter(Expr::cust_with_values(
                "LOWER(users.username) = LOWER($1)",
                [username.to_string()],
            ))
            .one(self.connection())
            .await?;

        Ok(result.map(User::from))
    }

    /// List users for the dashboard, newest first.
    pub async fn list_users(&self, query: &ListUsersQuery) -> AppResult<(Vec<User>, u64, Page)> {
        let page = Page::new(query.limit, query.offset, 50);
        let mut select = UserEntity::find().filter(user::Column::DeletedAt.is_null());

        if let Some(role) = query.role {
            select = select.filter(user::Column::Role.eq(role.as_str()));
        }

        if let Some(search) = non_blank(query.search.clone()) {
            select = select.filter(Expr::cust_with_values(
                "(users.username ILIKE $1 OR users.display_name ILIKE $1 OR users.email ILIKE $1)",
                [like_pattern(&search)],
            ));
        }

        let total = select.clone().count(self.connection()).await?;

        let users = select
            .order_by_desc(user::Column::CreatedAt)
            .offset(page.offset)
            .limit(page.limit)
            .all(self.connection())
            .await?;

        Ok((users.into_iter().map(User::from).collect(), total, page))
    }

    /// Change a user's role after `check` approves it.
    ///
    /// Runs in one transaction holding row locks on every active admin and on
    /// the target, so concurrent demotions are serialized and `check` always
    /// sees the current admin count. Returns the user before and after.
    pub async fn change_user_role<F>(&self, id: Uuid, role: Role, check: F) -> AppResult<(User, User)>
    where
        F: FnOnce(&User, u64) -> AppResult<()>,
    {
        let txn = self.connection().begin().await?;

        let admins = UserEntity::find()
            .filter(user::Column::DeletedAt.is_null())
            .filter(user::Column::Role.eq(Role::Admin.as_str()))
            .lock_exclusive()
            .all(&txn)
            .await?;

        let existing = UserEntity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_null())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", id)))?;

        let before = User::from(existing.clone());
        check(&before, admins.len() as u64)?;

        let mut active: ActiveModel = existing.into();
        active.role = Set(role.as_str().to_string());
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok((before, updated.into()))
    }
}
