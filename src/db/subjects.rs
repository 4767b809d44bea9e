//! Database queries for subjects.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::entity::subject::{self, ActiveModel, Entity as Subject};
use crate::entity::{employee, employee_subject};
use crate::error::{AppError, AppResult};
use crate::models::{SubjectResponse, SubjectWithTeachers, TeacherRef};

use super::DbPool;

impl DbPool {
    /// Active subjects by name, each with the active employees teaching it.
    pub async fn list_subjects_with_teachers(&self) -> AppResult<Vec<SubjectWithTeachers>> {
        let subjects = Subject::find()
            .filter(subject::Column::DeletedAt.is_null())
            .order_by_asc(subject::Column::Name)
            .all(self.connection())
            .await?;

        let ids: Vec<Uuid> = subjects.iter().map(|s| s.id).collect();
        let mut teachers: HashMap<Uuid, Vec<TeacherRef>> = HashMap::new();

        if !ids.is_empty() {
            let rows = employee_subject::Entity::find()
                .filter(employee_subject::Column::SubjectId.is_in(ids))
                .find_also_related(employee::Entity)
                .all(self.connection())
                .await?;

            for (link, emp) in rows {
                if let Some(emp) = emp.filter(|e| e.deleted_at.is_none()) {
                    teachers.entry(link.subject_id).or_default().push(TeacherRef {
                        id: emp.id,
                        full_name: emp.full_name,
                    });
                }
            }
        }

        Ok(subjects
            .into_iter()
            .map(|s| {
                let mut list = teachers.remove(&s.id).unwrap_or_default();
                list.sort_by(|a, b| a.full_name.cmp(&b.full_name));
                SubjectWithTeachers {
                    subject: s.into(),
                    teachers: list,
                }
            })
            .collect())
    }

    pub async fn get_subject(&self, id: Uuid) -> AppResult<Option<subject::Model>> {
        let result = Subject::find_by_id(id)
            .filter(subject::Column::DeletedAt.is_null())
            .one(self.connection())
            .await?;
        Ok(result)
    }

    /// Whether an active subject other than `exclude` has this name (case-insensitive).
    pub async fn subject_name_taken(&self, name: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        let mut select = Subject::find()
            .filter(subject::Column::DeletedAt.is_null())
            .filter(Expr::cust_with_values(
                "LOWER(subjects.name) = LOWER($1)",
                [name.to_string()],
            ));
        if let Some(id) = exclude {
            select = select.filter(subject::Column::Id.ne(id));
        }
        Ok(select.count(self.connection()).await? > 0)
    }

    /// Number of the given ids that are active subjects.
    pub async fn count_active_subjects(&self, ids: &[Uuid]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let count = Subject::find()
            .filter(subject::Column::Id.is_in(ids.to_vec()))
            .filter(subject::Column::DeletedAt.is_null())
            .count(self.connection())
            .await?;
        Ok(count)
    }

    pub async fn count_subjects(&self) -> AppResult<u64> {
        let count = Subject::find()
            .filter(subject::Column::DeletedAt.is_null())
            .count(self.connection())
            .await?;
        Ok(count)
    }

    pub async fn insert_subject(
        &self,
        name: &str,
        description: Option<String>,
    ) -> AppResult<subject::Model> {
        let now = Utc::now();
        let model = ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name.to_string()),
            description: Set(description),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };
        Ok(model.insert(self.connection()).await?)
    }

    pub async fn update_subject(
        &self,
        id: Uuid,
        name: &str,
        description: Option<String>,
    ) -> AppResult<subject::Model> {
        let existing = self
            .get_subject(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Subject {}", id)))?;

        let mut active: ActiveModel = existing.into();
        active.name = Set(name.to_string());
        active.description = Set(description);
        active.updated_at = Set(Utc::now());
        Ok(active.update(self.connection()).await?)
    }

    /// Soft-delete a subject and detach it from every employee.
    pub async fn delete_subject(&self, id: Uuid) -> AppResult<bool> {
        let Some(existing) = self.get_subject(id).await? else {
            return Ok(false);
        };

        let txn = self.connection().begin().await?;

        employee_subject::Entity::delete_many()
            .filter(employee_subject::Column::SubjectId.eq(id))
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

    /// Active subjects per employee, sorted by name.
    pub async fn subjects_for_employees(
        &self,
        employee_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, Vec<SubjectResponse>>> {
        let mut map: HashMap<Uuid, Vec<SubjectResponse>> = HashMap::new();
        if employee_ids.is_empty() {
            return Ok(map);
        }

        let rows = employee_subject::Entity::find()
            .filter(employee_subject::Column::EmployeeId.is_in(employee_ids.to_vec()))
            .find_also_related(Subject)
            .all(self.connection())
            .await?;

        for (link, subject) in rows {
            if let Some(subject) = subject.filter(|s| s.deleted_at.is_none()) {
                map.entry(link.employee_id).or_default().push(subject.into());
            }
        }

        for subjects in map.values_mut() {
            subjects.sort_by(|a, b| a.name.cmp(&b.name));
        }

        Ok(map)
    }
}
