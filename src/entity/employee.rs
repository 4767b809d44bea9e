//! Employee (staff member) entity.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub full_name: String,
    pub position: String,
    pub academic_degree: Option<String>,
    pub academic_title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,
    pub photo_key: Option<String>,
    /// Display order on the staff page, ascending.
    pub sort_order: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::employee_subject::Entity")]
    EmployeeSubjects,
}

impl Related<super::employee_subject::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmployeeSubjects.def()
    }
}

impl Related<super::subject::Entity> for Entity {
    fn to() -> RelationDef {
        super::employee_subject::Relation::Subject.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::employee_subject::Relation::Employee.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
