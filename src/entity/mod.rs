//! SeaORM entity definitions for PostgreSQL database.

pub mod article;
pub mod article_tag;
pub mod employee;
pub mod employee_subject;
pub mod refresh_token;
pub mod subject;
pub mod tag;
pub mod user;
