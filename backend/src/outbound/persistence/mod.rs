//! Diesel/PostgreSQL adapter for the user directory.
//!
//! Row structs and the table definition stay private to this module.

mod diesel_user_directory;
mod models;
mod pool;
mod schema;

pub use diesel_user_directory::DieselUserDirectory;
pub use pool::{DbPool, PoolConfig, PoolError};
