//! Database queries for employees (staff).

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entity::employee::{self, ActiveModel, Entity as Employee};
use crate::entity::employee_subject;
use crate::error::{AppError, AppResult};
use crate::models::EmployeeResponse;

use super::DbPool;

/// Validated, normalized employee fields ready for storage.
#[derive(Debug, Clone)]
pub struct EmployeeFields {
    pub full_name: String,
    pub position: String,
    pub academic_degree: Option<String>,
    pub academic_title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub photo_key: Option<String>,
    pub sort_order: i32,
    pub subject_ids: Vec<Uuid>,
}

impl DbPool {
    /// Staff page order: `sort_order`, then name.
    pub async fn list_employees(&self) -> AppResult<Vec<employee::Model>> {
        let result = Employee::find()
            .filter(employee::Column::DeletedAt.is_null())
            .order_by_asc(employee::Column::SortOrder)
            .order_by_asc(employee::Column::FullName)
            .all(self.connection())
            .await?;
        Ok(result)
    }

    pub async fn get_employee(&self, id: Uuid) -> AppResult<Option<employee::Model>> {
        let result = Employee::find_by_id(id)
            .filter(employee::Column::DeletedAt.is_null())
            .one(self.connection())
            .await?;
        Ok(result)
    }

    pub async fn count_employees(&self) -> AppResult<u64> {
        let count = Employee::find()
            .filter(employee::Column::DeletedAt.is_null())
            .count(self.connection())
            .await?;
        Ok(count)
    }

    /// Attach subjects to a batch of employees, keeping their order.
    pub async fn employee_responses(
        &self,
        employees: Vec<employee::Model>,
    ) -> AppResult<Vec<EmployeeResponse>> {
        let ids: Vec<Uuid> = employees.iter().map(|e| e.id).collect();
        let mut subjects = self.subjects_for_employees(&ids).await?;

        Ok(employees
            .into_iter()
            .map(|e| {
                let list = subjects.remove(&e.id).unwrap_or_default();
                EmployeeResponse::from_parts(e, list)
            })
            .collect())
    }

    pub async fn insert_employee(&self, fields: EmployeeFields) -> AppResult<employee::Model> {
        let now = Utc::now();
        let id = Uuid::now_v7();
        let txn = self.connection().begin().await?;

        let model = ActiveModel {
            id: Set(id),
            full_name: Set(fields.full_name),
            position: Set(fields.position),
            academic_degree: Set(fields.academic_degree),
            academic_title: Set(fields.academic_title),
            email: Set(fields.email),
            phone: Set(fields.phone),
            bio: Set(fields.bio),
            photo_key: Set(fields.photo_key),
            sort_order: Set(fields.sort_order),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };
        let inserted = model.insert(&txn).await?;

        replace_employee_subjects(&txn, id, &fields.subject_ids).await?;

        txn.commit().await?;
        Ok(inserted)
    }

    pub async fn update_employee(
        &self,
        id: Uuid,
        fields: EmployeeFields,
    ) -> AppResult<employee::Model> {
        let existing = self
            .get_employee(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {}", id)))?;

        let txn = self.connection().begin().await?;

        let mut active: ActiveModel = existing.into();
        active.full_name = Set(fields.full_name);
        active.position = Set(fields.position);
        active.academic_degree = Set(fields.academic_degree);
        active.academic_title = Set(fields.academic_title);
        active.email = Set(fields.email);
        active.phone = Set(fields.phone);
        active.bio = Set(fields.bio);
        active.photo_key = Set(fields.photo_key);
        active.sort_order = Set(fields.sort_order);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;

        replace_employee_subjects(&txn, id, &fields.subject_ids).await?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Soft-delete an employee and drop their subject links.
    pub async fn delete_employee(&self, id: Uuid) -> AppResult<bool> {
        let Some(existing) = self.get_employee(id).await? else {
            return Ok(false);
        };

        let txn = self.connection().begin().await?;

        employee_subject::Entity::delete_many()
            .filter(employee_subject::Column::EmployeeId.eq(id))
            .exec(&txn)
            .await?;

        let now = Utc::now();
        let mut active: ActiveModel = existing.into();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(true)
    }
}

async fn replace_employee_subjects<C: ConnectionTrait>(
    conn: &C,
    employee_id: Uuid,
    subject_ids: &[Uuid],
) -> AppResult<()> {
    employee_subject::Entity::delete_many()
        .filter(employee_subject::Column::EmployeeId.eq(employee_id))
        .exec(conn)
        .await?;

    if subject_ids.is_empty() {
        return Ok(());
    }

    let links = subject_ids.iter().map(|subject_id| employee_subject::ActiveModel {
        employee_id: Set(employee_id),
        subject_id: Set(*subject_id),
    });
    employee_subject::Entity::insert_many(links).exec(conn).await?;

    Ok(())
}
