//! Internal Diesel row structs for `parallel_users`.
//!
//! These never leave the persistence layer.

use diesel::prelude::*;

use super::schema::parallel_users;

/// Row struct for reading from `parallel_users`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = parallel_users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub echelon_id: String,
    pub name: String,
    pub email: String,
    pub wallet_address: String,
}

/// Insertable struct for registering a user. `id` is assigned by the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = parallel_users)]
pub(crate) struct NewUserRow<'a> {
    pub echelon_id: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub wallet_address: &'a str,
}
