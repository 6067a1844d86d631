pub mod accounts;
pub mod config;
pub mod payments;

use sea_orm::{DbErr, SqlErr};

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
