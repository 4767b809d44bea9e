//! Migration: Create employees and employee_subjects tables.

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
                CREATE TABLE employees (
                    id UUID PRIMARY KEY,
                    full_name VARCHAR(200) NOT NULL,
                    position VARCHAR(200) NOT NULL,
                    academic_degree VARCHAR(200),
                    academic_title VARCHAR(200),
                    email VARCHAR(255),
                    phone VARCHAR(50),
                    bio TEXT,
                    photo_key VARCHAR(300),
                    sort_order INTEGER NOT NULL DEFAULT 0,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    deleted_at TIMESTAMPTZ
                );

                CREATE INDEX idx_employees_order
                    ON employees(sort_order, full_name)
                    WHERE deleted_at IS NULL;

                CREATE TRIGGER update_employees_updated_at
                    BEFORE UPDATE ON employees
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();

                CREATE TABLE employee_subjects (
                    employee_id UUID NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
                    subject_id UUID NOT NULL REFERENCES subjects(id) ON DELETE CASCADE,
                    PRIMARY KEY (employee_id, subject_id)
                );

                CREATE INDEX idx_employee_subjects_subject_id ON employee_subjects(subject_id);
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
                DROP TABLE IF EXISTS employee_subjects CASCADE;
                DROP TRIGGER IF EXISTS update_employees_updated_at ON employees;
                DROP TABLE IF EXISTS employees CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
