//! Entity records: one struct per table.

use sqlx::Row;
use sqlx::postgres::PgRow;

use taskhub_core::Timestamps;

mod contact;
mod role;
mod user;

pub use contact::Contact;
pub use role::Role;
pub use user::User;

pub(crate) fn timestamps_from_row(row: &PgRow) -> Result<Timestamps, sqlx::Error> {
    Ok(Timestamps {
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get("deleted_at")?,
    })
}
