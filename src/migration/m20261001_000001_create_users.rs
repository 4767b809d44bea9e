//! Migration: Create users table.
//!
//! Dashboard accounts signed in through GitHub OAuth. Also installs the
//! shared `updated_at` trigger function used by every later table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                -- Shared trigger function for updated_at
                CREATE OR REPLACE FUNCTION update_updated_at_column()
                RETURNS TRIGGER AS $$
                BEGIN
                    NEW.updated_at = NOW();
                    RETURN NEW;
                END;
                $$ LANGUAGE plpgsql;

                CREATE TABLE users (
                    id UUID PRIMARY KEY,
                    github_id BIGINT NOT NULL,
                    username VARCHAR(100) NOT NULL,
                    display_name VARCHAR(255),
                    avatar_url VARCHAR(500),
                    email VARCHAR(255),
                    role VARCHAR(20) NOT NULL DEFAULT 'user'
                        CHECK (role IN ('admin', 'editor', 'user')),
                    last_login_at TIMESTAMPTZ,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    deleted_at TIMESTAMPTZ
                );

                CREATE UNIQUE INDEX idx_users_github_id_active
                    ON users(github_id)
                    WHERE deleted_at IS NULL;

                CREATE INDEX idx_users_username
                    ON users(username)
                    WHERE deleted_at IS NULL;

                CREATE INDEX idx_users_role
                    ON users(role)
                    WHERE deleted_at IS NULL;

                CREATE TRIGGER update_users_updated_at
                    BEFORE UPDATE ON users
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DROP TRIGGER IF EXISTS update_users_updated_at ON users;
                DROP TABLE IF EXISTS users CASCADE;
                DROP FUNCTION IF EXISTS update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }
}
